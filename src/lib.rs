//! Claude Monitor Library
//!
//! Analytics core for Claude Code usage logs: reconstructs 5-hour billing
//! sessions from the append-only JSONL event stream, prices every event
//! against a per-model rate table (including cache-write/cache-read tiers),
//! and rolls priced events into daily, weekly, and monthly reports with
//! cache-savings figures.
//!
//! Nothing is persisted: every query re-derives its answer from the on-disk
//! logs, with a short-TTL result cache in front of the expensive aggregate
//! queries.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Wire and domain types for events, sessions, and reports
//! - [`pricing`] - Static per-model rate table and the no-cache counterfactual
//! - [`discovery`] - Project and log-file discovery under the projects root
//! - [`parser`] - Best-effort JSONL parsing into priced events
//! - [`ingest`] - Event loading with lookback windows and project filters
//! - [`sessions`] - Activity-anchored 5-hour billing-window reconstruction
//! - [`reports`] - Daily/weekly/monthly aggregation
//! - [`cache`] - TTL result cache with a background sweep task
//! - [`plans`] - Subscription plan catalog and usage alerts
//! - [`engine`] - [`MonitorEngine`], the facade collaborators query
//! - [`config`] / [`logging`] / [`display`] - process plumbing around the core
//!
//! ## Usage Example
//!
//! ```no_run
//! use claude_monitor::{MonitorEngine, Plan};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = MonitorEngine::new(None, Plan::pro())?;
//! let stats = engine.current_stats(None).await?;
//! println!("today: ${:.2}", stats.today_cost);
//!
//! let daily = engine.daily_report(7, None).await?;
//! for day in daily {
//!     println!("{}: ${:.2}", day.date, day.total_cost);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod discovery;
pub mod display;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod parser;
pub mod plans;
pub mod pricing;
pub mod reports;
pub mod sessions;

pub use engine::{CurrentStats, MonitorEngine};
pub use models::*;
pub use plans::{compute_alerts, Alert, AlertSeverity, Plan};

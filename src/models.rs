//! Core Data Models
//!
//! Data structures for the usage-analysis pipeline, from raw log records to
//! aggregated reports.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`RawRecord`] - a single JSONL line as written by Claude Code
//! 2. **Events**: [`UsageEvent`] - a validated, priced usage record
//! 3. **Sessions**: [`Session`] - events grouped into 5-hour billing windows
//! 4. **Reports**: [`DailyStats`], [`WeeklyStats`], [`MonthlyStats`] - time-bucketed views
//!
//! All report-facing types serialize with camelCase field names to match the
//! JSON shape consumers of the original log format expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a usage log file. Only the fields the pipeline consumes are
/// modeled; a line that cannot deserialize into this shape is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub timestamp: String,
    pub message: RawMessage,
    #[serde(rename = "costUSD")]
    pub cost_usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    /// Absent in some older records; those are priced as unknown.
    #[serde(default = "unknown_model")]
    pub model: String,
    /// Required: a record without a usage object is not a usage event.
    pub usage: RawUsage,
}

fn unknown_model() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

impl RawUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens
            + self.output_tokens
            + self.cache_creation_input_tokens
            + self.cache_read_input_tokens
    }
}

/// Per-category cost of a computed price, in USD. Components sum to the
/// computed total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub input: f64,
    pub output: f64,
    #[serde(rename = "cacheWrite")]
    pub cache_write: f64,
    #[serde(rename = "cacheRead")]
    pub cache_read: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.input + self.output + self.cache_write + self.cache_read
    }
}

/// Provenance of an event's cost. A supplied cost carries no breakdown, so
/// aggregation can never mistake it for one with a zero cache component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum EventCost {
    /// Priced from token counts against a matching tier.
    Computed { total: f64, breakdown: CostBreakdown },
    /// The log record carried an explicit `costUSD`; used verbatim.
    Supplied { total: f64 },
    /// No pricing tier matched the model; reads as zero cost.
    Unpriced,
}

impl EventCost {
    pub fn total(&self) -> f64 {
        match self {
            EventCost::Computed { total, .. } | EventCost::Supplied { total } => *total,
            EventCost::Unpriced => 0.0,
        }
    }

    pub fn breakdown(&self) -> Option<&CostBreakdown> {
        match self {
            EventCost::Computed { breakdown, .. } => Some(breakdown),
            _ => None,
        }
    }
}

/// One priced request/response exchange. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheWriteTokens")]
    pub cache_write_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    pub cost: EventCost,
    pub project: String,
}

/// A 5-hour billing window reconstructed from the event stream.
///
/// Invariants: `events` are sorted by timestamp, every event timestamp lies
/// in `[start_time, end_time)`, and the totals are exact sums over `events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    pub events: Vec<UsageEvent>,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: String,
    pub events: u64,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheWriteTokens")]
    pub cache_write_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
    #[serde(rename = "tokensByModel")]
    pub tokens_by_model: HashMap<String, u64>,
    #[serde(rename = "costByModel")]
    pub cost_by_model: HashMap<String, f64>,
    #[serde(rename = "cacheCost")]
    pub cache_cost: f64,
    #[serde(rename = "noCacheCost")]
    pub no_cache_cost: f64,
    #[serde(rename = "cacheSavings")]
    pub cache_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    /// Sunday that anchors the week, local time.
    #[serde(rename = "weekStart")]
    pub week_start: String,
    #[serde(rename = "weekEnd")]
    pub week_end: String,
    /// Days within the week that had any activity.
    pub days: u32,
    pub events: u64,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(rename = "dailyAverage")]
    pub daily_average: f64,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheWriteTokens")]
    pub cache_write_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
    #[serde(rename = "tokensByModel")]
    pub tokens_by_model: HashMap<String, u64>,
    #[serde(rename = "costByModel")]
    pub cost_by_model: HashMap<String, f64>,
    #[serde(rename = "cacheCost")]
    pub cache_cost: f64,
    #[serde(rename = "noCacheCost")]
    pub no_cache_cost: f64,
    #[serde(rename = "cacheSavings")]
    pub cache_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    /// Days within the month that had any activity.
    pub days: u32,
    pub events: u64,
    #[serde(rename = "totalTokens")]
    pub total_tokens: u64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(rename = "dailyAverage")]
    pub daily_average: f64,
    #[serde(rename = "weeklyAverage")]
    pub weekly_average: f64,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheWriteTokens")]
    pub cache_write_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
    #[serde(rename = "tokensByModel")]
    pub tokens_by_model: HashMap<String, u64>,
    #[serde(rename = "costByModel")]
    pub cost_by_model: HashMap<String, f64>,
    #[serde(rename = "cacheCost")]
    pub cache_cost: f64,
    #[serde(rename = "noCacheCost")]
    pub no_cache_cost: f64,
    #[serde(rename = "cacheSavings")]
    pub cache_savings: f64,
    /// What the month's metered usage would have cost on the API.
    #[serde(rename = "apiEquivalentCost")]
    pub api_equivalent_cost: f64,
    #[serde(rename = "planCost")]
    pub plan_cost: f64,
    /// `api_equivalent_cost - plan_cost`; negative when the plan costs more
    /// than the metered equivalent.
    pub savings: f64,
}

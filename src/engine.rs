//! Query orchestration.
//!
//! [`MonitorEngine`] is the single entry point collaborators (CLI, web
//! layers) talk to. It owns the ingester, the pricing table, the selected
//! plan, and the result cache, and re-derives every answer from the on-disk
//! log; nothing is persisted between queries.

use crate::cache::{CacheSweeper, ResultCache};
use crate::config::get_config;
use crate::ingest::LogIngester;
use crate::models::{DailyStats, MonthlyStats, Session, WeeklyStats};
use crate::plans::{compute_alerts, Alert, Plan};
use crate::pricing::{self, PricingTable};
use crate::reports::Aggregator;
use crate::sessions;
use anyhow::Result;
use chrono::{Duration, Local, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::RwLock;

/// Lookback for current-session queries: covers the window in progress, the
/// one before it, and every session started on the local calendar day.
const CURRENT_LOOKBACK_HOURS: i64 = 24;

/// Snapshot of the live session state plus today's running totals.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStats {
    #[serde(rename = "currentSession")]
    pub current_session: Option<Session>,
    #[serde(rename = "previousSession")]
    pub previous_session: Option<Session>,
    #[serde(rename = "todayMessageCount")]
    pub today_message_count: u64,
    #[serde(rename = "todayCost")]
    pub today_cost: f64,
    #[serde(rename = "todayTokens")]
    pub today_tokens: u64,
    #[serde(rename = "burnRate")]
    pub burn_rate: u64,
    #[serde(rename = "minutesUntilReset")]
    pub minutes_until_reset: i64,
    #[serde(rename = "sessionsStartedToday")]
    pub sessions_started_today: u64,
    pub alerts: Vec<Alert>,
    pub plan: Plan,
}

/// Cached value for a period report, keyed by kind, span, and project.
#[derive(Debug, Clone)]
pub enum CachedReport {
    Daily(Vec<DailyStats>),
    Weekly(Vec<WeeklyStats>),
    Monthly(Vec<MonthlyStats>),
}

pub struct MonitorEngine {
    ingester: LogIngester,
    pricing: &'static PricingTable,
    plan: RwLock<Plan>,
    cache: ResultCache<CachedReport>,
    cache_ttl: std::time::Duration,
}

impl MonitorEngine {
    /// `root` defaults to the configured projects directory. Fails fast when
    /// the directory is missing; there is nothing to monitor without it.
    pub fn new(root: Option<PathBuf>, plan: Plan) -> Result<Self> {
        let config = get_config();
        let root = root.unwrap_or_else(|| config.paths.projects_root.clone());
        let pricing = pricing::default_table();
        Ok(Self {
            ingester: LogIngester::new(root, pricing)?,
            pricing,
            plan: RwLock::new(plan),
            cache: ResultCache::new(),
            cache_ttl: std::time::Duration::from_secs(config.cache.ttl_secs),
        })
    }

    /// Start the periodic cache sweep. The caller owns the returned handle
    /// and shuts it down with the process.
    pub fn spawn_sweeper(&self, period: std::time::Duration) -> CacheSweeper {
        CacheSweeper::spawn(self.cache.clone(), period)
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.ingester.list_projects()
    }

    /// Live session state. Always recomputed from the freshest data; never
    /// served from the cache.
    pub async fn current_stats(&self, project: Option<&str>) -> Result<CurrentStats> {
        let recent = self
            .ingester
            .load_events(Some(Duration::hours(CURRENT_LOOKBACK_HOURS)), project)?;
        let sessions = sessions::reconstruct_sessions(&recent);
        let today = self.ingester.load_today(project)?;
        let now = Utc::now();

        let today_cost: f64 = today.iter().map(|e| e.cost.total()).sum();
        let today_tokens: u64 = today.iter().map(|e| e.total_tokens).sum();
        let today_local = Local::now().date_naive();
        let sessions_started_today = sessions
            .iter()
            .filter(|s| s.start_time.with_timezone(&Local).date_naive() == today_local)
            .count() as u64;

        let current_session = sessions.first().cloned();
        let previous_session = sessions.get(1).cloned();
        let burn_rate = current_session
            .as_ref()
            .map(sessions::burn_rate)
            .unwrap_or(0);
        let minutes_until_reset = current_session
            .as_ref()
            .map(|s| sessions::minutes_until_reset(s, now))
            .unwrap_or(0);

        let plan = self.current_plan();
        let alerts = compute_alerts(today_cost, &plan);

        Ok(CurrentStats {
            current_session,
            previous_session,
            today_message_count: today.len() as u64,
            today_cost,
            today_tokens,
            burn_rate,
            minutes_until_reset,
            sessions_started_today,
            alerts,
            plan,
        })
    }

    /// Daily buckets over the last `days` days.
    pub async fn daily_report(&self, days: usize, project: Option<&str>) -> Result<Vec<DailyStats>> {
        let key = report_key("daily", days, project, None);
        if let Some(CachedReport::Daily(stats)) = self.cache.get(&key) {
            return Ok(stats);
        }
        let events = self
            .ingester
            .load_events(Some(Duration::hours(24 * days as i64)), project)?;
        let stats = Aggregator::new(self.pricing).daily(&events);
        self.cache
            .set(key, CachedReport::Daily(stats.clone()), self.cache_ttl);
        Ok(stats)
    }

    /// The most recent `weeks` weeks. Scans full history so the oldest
    /// returned week is complete, not clipped by a lookback.
    pub async fn weekly_report(
        &self,
        weeks: usize,
        project: Option<&str>,
    ) -> Result<Vec<WeeklyStats>> {
        let key = report_key("weekly", weeks, project, None);
        if let Some(CachedReport::Weekly(stats)) = self.cache.get(&key) {
            return Ok(stats);
        }
        let events = self.ingester.load_events(None, project)?;
        let stats = Aggregator::new(self.pricing).weekly(&events, weeks);
        self.cache
            .set(key, CachedReport::Weekly(stats.clone()), self.cache_ttl);
        Ok(stats)
    }

    /// The most recent `months` months, with savings measured against the
    /// active plan (part of the cache key, so a plan change is never served
    /// a stale savings figure).
    pub async fn monthly_report(
        &self,
        months: usize,
        project: Option<&str>,
    ) -> Result<Vec<MonthlyStats>> {
        let plan = self.current_plan();
        let key = report_key("monthly", months, project, Some(&plan.name));
        if let Some(CachedReport::Monthly(stats)) = self.cache.get(&key) {
            return Ok(stats);
        }
        let events = self.ingester.load_events(None, project)?;
        let stats = Aggregator::new(self.pricing).monthly(&events, months, &plan);
        self.cache
            .set(key, CachedReport::Monthly(stats.clone()), self.cache_ttl);
        Ok(stats)
    }

    /// Last-writer-wins; an overlapping query sees the old plan or the new
    /// one, never a mix.
    pub fn set_plan(&self, plan: Plan) {
        *self.plan.write().expect("plan lock poisoned") = plan;
    }

    pub fn current_plan(&self) -> Plan {
        self.plan.read().expect("plan lock poisoned").clone()
    }
}

fn report_key(kind: &str, span: usize, project: Option<&str>, plan: Option<&str>) -> String {
    let mut key = format!("{}:{}:{}", kind, span, project.unwrap_or("*"));
    if let Some(plan) = plan {
        key.push(':');
        key.push_str(plan);
    }
    key
}

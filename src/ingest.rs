//! Log ingestion: discovery plus parsing into a sorted event stream.
//!
//! Failure semantics: an invalid root is fatal at construction; an unreadable
//! file is logged and skipped; a malformed line is skipped silently. Empty
//! results are valid and come back as empty vectors.

use crate::discovery::LogDiscovery;
use crate::models::UsageEvent;
use crate::parser::EventParser;
use crate::pricing::PricingTable;
use anyhow::Result;
use chrono::{Duration, Local, Utc};
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct LogIngester {
    discovery: LogDiscovery,
    pricing: &'static PricingTable,
}

impl LogIngester {
    pub fn new(root: PathBuf, pricing: &'static PricingTable) -> Result<Self> {
        Ok(Self {
            discovery: LogDiscovery::new(root)?,
            pricing,
        })
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.discovery.list_projects()
    }

    /// Load events, optionally restricted to a lookback window and/or a
    /// single project. Sorted by timestamp ascending.
    pub fn load_events(
        &self,
        lookback: Option<Duration>,
        project: Option<&str>,
    ) -> Result<Vec<UsageEvent>> {
        let mtime_window = lookback.and_then(|d| d.to_std().ok());
        let files = self.discovery.find_log_files(project, mtime_window)?;
        let cutoff = lookback.map(|d| Utc::now() - d);
        let parser = EventParser::new(self.pricing);

        let mut events = Vec::new();
        for file in &files {
            let project_name = project
                .map(str::to_string)
                .or_else(|| self.discovery.project_for(file))
                .unwrap_or_else(|| "unknown".to_string());
            match parser.parse_file(file, &project_name) {
                Ok(mut parsed) => {
                    if let Some(cutoff) = cutoff {
                        parsed.retain(|event| event.timestamp >= cutoff);
                    }
                    events.extend(parsed);
                }
                Err(error) => {
                    warn!(file = %file.display(), %error, "skipping unreadable log file");
                }
            }
        }

        events.sort_by_key(|event| event.timestamp);
        debug!(
            files = files.len(),
            events = events.len(),
            "loaded usage events"
        );
        Ok(events)
    }

    /// Events since local midnight.
    pub fn load_today(&self, project: Option<&str>) -> Result<Vec<UsageEvent>> {
        let today = Local::now().date_naive();
        let events = self.load_events(Some(Duration::hours(24)), project)?;
        Ok(events
            .into_iter()
            .filter(|event| event.timestamp.with_timezone(&Local).date_naive() == today)
            .collect())
    }
}

/// Default log root, matching where Claude Code writes its project logs.
pub fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
        .join("projects")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::default_table;
    use std::fs;
    use tempfile::TempDir;

    fn line(timestamp: &str, input: u64) -> String {
        format!(
            r#"{{"timestamp":"{}","message":{{"model":"claude-3-5-haiku-20241022","usage":{{"input_tokens":{},"output_tokens":0,"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}}}}"#,
            timestamp, input
        )
    }

    #[test]
    fn test_events_sorted_across_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("alpha")).unwrap();
        fs::write(
            dir.path().join("alpha").join("late.jsonl"),
            format!("{}\n", line("2025-06-15T14:00:00Z", 2)),
        )
        .unwrap();
        fs::write(
            dir.path().join("alpha").join("early.jsonl"),
            format!("{}\n", line("2025-06-15T10:00:00Z", 1)),
        )
        .unwrap();

        let ingester = LogIngester::new(dir.path().to_path_buf(), default_table()).unwrap();
        let events = ingester.load_events(None, None).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].timestamp < events[1].timestamp);
        assert_eq!(events[0].input_tokens, 1);
        assert_eq!(events[0].project, "alpha");
    }

    #[test]
    fn test_lookback_filters_old_events() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("alpha")).unwrap();
        let recent = Utc::now() - Duration::minutes(10);
        let stale = Utc::now() - Duration::hours(48);
        fs::write(
            dir.path().join("alpha").join("mixed.jsonl"),
            format!(
                "{}\n{}\n",
                line(&stale.to_rfc3339(), 1),
                line(&recent.to_rfc3339(), 2)
            ),
        )
        .unwrap();

        let ingester = LogIngester::new(dir.path().to_path_buf(), default_table()).unwrap();
        let events = ingester.load_events(Some(Duration::hours(24)), None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].input_tokens, 2);
    }

    #[test]
    fn test_empty_project_yields_empty_events() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("quiet")).unwrap();

        let ingester = LogIngester::new(dir.path().to_path_buf(), default_table()).unwrap();
        assert_eq!(ingester.list_projects().unwrap(), vec!["quiet"]);
        assert!(ingester.load_events(None, Some("quiet")).unwrap().is_empty());
    }
}

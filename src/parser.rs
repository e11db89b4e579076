//! Line-by-line JSONL parsing into priced usage events.
//!
//! This is a best-effort parser, not a validating one: a line is accepted
//! only if it deserializes into [`RawRecord`] (nested usage object plus a
//! parseable timestamp); everything else is skipped without log noise.

use crate::models::{RawRecord, UsageEvent};
use crate::pricing::PricingTable;
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse a timestamp string into a `DateTime<Utc>`.
/// Handles both Z suffix and timezone info formats.
pub fn parse_timestamp(timestamp_str: &str) -> Result<DateTime<Utc>> {
    let timestamp = if timestamp_str.ends_with('Z') {
        timestamp_str.replace('Z', "+00:00")
    } else {
        timestamp_str.to_string()
    };

    // Try parsing as ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(&timestamp) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try parsing as naive datetime and assume UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }

    anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
}

pub struct EventParser<'a> {
    pricing: &'a PricingTable,
}

impl<'a> EventParser<'a> {
    pub fn new(pricing: &'a PricingTable) -> Self {
        Self { pricing }
    }

    /// Parse one log file into priced events, in file order. An I/O error is
    /// returned to the caller (who skips the file); malformed lines are not.
    pub fn parse_file(&self, path: &Path, project: &str) -> Result<Vec<UsageEvent>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(record) = serde_json::from_str::<RawRecord>(line) else {
                continue;
            };
            if let Some(event) = self.build_event(record, project) {
                events.push(event);
            }
        }

        Ok(events)
    }

    fn build_event(&self, record: RawRecord, project: &str) -> Option<UsageEvent> {
        let timestamp = parse_timestamp(&record.timestamp).ok()?;
        let usage = record.message.usage;
        let cost = self
            .pricing
            .price(&usage, &record.message.model, record.cost_usd);
        Some(UsageEvent {
            timestamp,
            model: record.message.model,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_write_tokens: usage.cache_creation_input_tokens,
            cache_read_tokens: usage.cache_read_input_tokens,
            total_tokens: usage.total(),
            cost,
            project: project.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventCost;
    use crate::pricing::default_table;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_z_suffix() {
        assert!(parse_timestamp("2024-01-01T12:00:00.000Z").is_ok());
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timestamp("2024-01-01T12:00:00.000+00:00").is_ok());
    }

    #[test]
    fn test_parse_naive() {
        assert!(parse_timestamp("2024-01-01T12:00:00.000").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_timestamp("invalid").is_err());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json at all").unwrap();
        writeln!(
            file,
            r#"{{"timestamp":"2025-06-15T10:05:00Z","message":{{"model":"claude-3-5-haiku-20241022","usage":{{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}}}}"#
        )
        .unwrap();
        // No usage object: rejected.
        writeln!(
            file,
            r#"{{"timestamp":"2025-06-15T10:06:00Z","message":{{"model":"claude-3-5-haiku-20241022"}}}}"#
        )
        .unwrap();
        // No timestamp: rejected.
        writeln!(
            file,
            r#"{{"message":{{"model":"claude-3-5-haiku-20241022","usage":{{"input_tokens":1}}}}}}"#
        )
        .unwrap();

        let parser = EventParser::new(default_table());
        let events = parser.parse_file(file.path(), "demo").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].input_tokens, 100);
        assert_eq!(events[0].total_tokens, 150);
        assert_eq!(events[0].project, "demo");
    }

    #[test]
    fn test_token_counts_default_to_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"timestamp":"2025-06-15T10:05:00Z","message":{{"usage":{{"output_tokens":25}}}}}}"#
        )
        .unwrap();

        let parser = EventParser::new(default_table());
        let events = parser.parse_file(file.path(), "demo").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].input_tokens, 0);
        assert_eq!(events[0].output_tokens, 25);
        assert_eq!(events[0].model, "unknown");
        assert_eq!(events[0].cost, EventCost::Unpriced);
    }

    #[test]
    fn test_supplied_cost_is_used_verbatim() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"timestamp":"2025-06-15T10:05:00Z","costUSD":1.25,"message":{{"model":"claude-3-5-haiku-20241022","usage":{{"input_tokens":1000000}}}}}}"#
        )
        .unwrap();

        let parser = EventParser::new(default_table());
        let events = parser.parse_file(file.path(), "demo").unwrap();
        assert_eq!(events[0].cost, EventCost::Supplied { total: 1.25 });
    }
}

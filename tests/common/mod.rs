#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway projects directory shaped like `~/.claude/projects`.
pub struct LogFixture {
    dir: TempDir,
}

impl LogFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn project(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn append_line(&self, project: &str, file: &str, line: &str) {
        let path = self.project(project).join(file);
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        writeln!(handle, "{}", line).unwrap();
    }
}

pub fn usage_line(
    timestamp: DateTime<Utc>,
    model: &str,
    input: u64,
    output: u64,
    cache_write: u64,
    cache_read: u64,
) -> String {
    format!(
        r#"{{"timestamp":"{}","message":{{"model":"{}","usage":{{"input_tokens":{},"output_tokens":{},"cache_creation_input_tokens":{},"cache_read_input_tokens":{}}}}}}}"#,
        timestamp.to_rfc3339(),
        model,
        input,
        output,
        cache_write,
        cache_read
    )
}

pub fn costed_line(timestamp: DateTime<Utc>, model: &str, cost: f64) -> String {
    format!(
        r#"{{"timestamp":"{}","costUSD":{},"message":{{"model":"{}","usage":{{"input_tokens":1,"output_tokens":1,"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}}}}"#,
        timestamp.to_rfc3339(),
        cost,
        model
    )
}

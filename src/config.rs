//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Paths configuration
    pub paths: PathsConfig,

    /// Result cache configuration
    pub cache: CacheConfig,

    /// Report defaults
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub projects_root: PathBuf,
    pub log_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    pub daily_days: usize,
    pub weekly_weeks: usize,
    pub monthly_months: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "error".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            paths: PathsConfig {
                projects_root: crate::ingest::default_root(),
                log_directory: PathBuf::from("logs"),
            },
            cache: CacheConfig {
                ttl_secs: 60,
                sweep_interval_secs: 60,
            },
            reports: ReportsConfig {
                daily_days: 7,
                weekly_weeks: 4,
                monthly_months: 3,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("claude-monitor.toml"),
            PathBuf::from(".claude-monitor.toml"),
            dirs::config_dir()
                .map(|d| d.join("claude-monitor").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Path overrides
        if let Ok(val) = env::var("CLAUDE_HOME") {
            self.paths.projects_root = PathBuf::from(val).join("projects");
        }
        if let Ok(val) = env::var("CLAUDE_MONITOR_PROJECTS_DIR") {
            self.paths.projects_root = PathBuf::from(val);
        }
        if let Ok(val) = env::var("CLAUDE_MONITOR_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        // Cache overrides
        if let Ok(val) = env::var("CLAUDE_MONITOR_CACHE_TTL_SECS") {
            self.cache.ttl_secs = val.parse().context("Invalid CLAUDE_MONITOR_CACHE_TTL_SECS")?;
        }
        if let Ok(val) = env::var("CLAUDE_MONITOR_SWEEP_INTERVAL_SECS") {
            self.cache.sweep_interval_secs = val
                .parse()
                .context("Invalid CLAUDE_MONITOR_SWEEP_INTERVAL_SECS")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(anyhow::anyhow!("Cache TTL must be greater than 0"));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(anyhow::anyhow!("Cache sweep interval must be greater than 0"));
        }
        if self.reports.daily_days == 0
            || self.reports.weekly_weeks == 0
            || self.reports.monthly_months == 0
        {
            return Err(anyhow::anyhow!("Report lookbacks must be greater than 0"));
        }

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}

use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_under;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,

    /// Staff id used by `watch`/`complete` when `--user` is omitted.
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: i64,
    #[serde(default = "default_grace")]
    pub grace_minutes: i64,
    #[serde(default = "default_missed_after")]
    pub missed_after_minutes: i64,
    #[serde(default = "default_post_event_grace")]
    pub post_event_grace_minutes: i64,

    #[serde(default = "default_watchdog_tick")]
    pub watchdog_tick_secs: u64,
    #[serde(default = "default_badge_tick")]
    pub badge_tick_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_sweep_lookback")]
    pub sweep_lookback_days: i64,

    #[serde(default = "default_excluded_event_types")]
    pub excluded_event_types: Vec<String>,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_check_interval() -> i64 {
    30
}
fn default_grace() -> i64 {
    10
}
fn default_missed_after() -> i64 {
    30
}
fn default_post_event_grace() -> i64 {
    120
}
fn default_watchdog_tick() -> u64 {
    60
}
fn default_badge_tick() -> u64 {
    300
}
fn default_sweep_interval() -> u64 {
    60
}
fn default_sweep_lookback() -> i64 {
    7
}
fn default_excluded_event_types() -> Vec<String> {
    vec!["external".to_string()]
}
fn default_busy_timeout() -> u64 {
    5000
}

/// Keys every configuration file is expected to carry.
pub const KNOWN_KEYS: &[&str] = &[
    "database",
    "user",
    "check_interval_minutes",
    "grace_minutes",
    "missed_after_minutes",
    "post_event_grace_minutes",
    "watchdog_tick_secs",
    "badge_tick_secs",
    "sweep_interval_secs",
    "sweep_lookback_days",
    "excluded_event_types",
    "busy_timeout_ms",
];

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    pub fn with_database(database: String) -> Self {
        Self {
            database,
            user: None,
            check_interval_minutes: default_check_interval(),
            grace_minutes: default_grace(),
            missed_after_minutes: default_missed_after(),
            post_event_grace_minutes: default_post_event_grace(),
            watchdog_tick_secs: default_watchdog_tick(),
            badge_tick_secs: default_badge_tick(),
            sweep_interval_secs: default_sweep_interval(),
            sweep_lookback_days: default_sweep_lookback(),
            excluded_event_types: default_excluded_event_types(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }

    /// Return the standard configuration directory depending on the platform.
    /// `RECWATCH_HOME` takes precedence when set.
    pub fn config_dir() -> PathBuf {
        if let Ok(custom) = env::var("RECWATCH_HOME")
            && !custom.is_empty()
        {
            return PathBuf::from(custom);
        }

        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("recwatch")
        } else {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".recwatch")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("recwatch.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("recwatch.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject threshold combinations the check state machine cannot honour.
    pub fn validate(&self) -> AppResult<()> {
        if self.check_interval_minutes <= 0 {
            return Err(AppError::Config(
                "check_interval_minutes must be positive".into(),
            ));
        }
        if self.grace_minutes < 0 || self.grace_minutes > self.missed_after_minutes {
            return Err(AppError::Config(
                "grace_minutes must be between 0 and missed_after_minutes".into(),
            ));
        }
        if self.post_event_grace_minutes < 0 {
            return Err(AppError::Config(
                "post_event_grace_minutes must not be negative".into(),
            ));
        }
        if self.watchdog_tick_secs == 0 || self.badge_tick_secs == 0 {
            return Err(AppError::Config("tick intervals must be positive".into()));
        }
        Ok(())
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => resolve_under(&name, &dir),
            None => Self::database_file(),
        };

        let config = Config::with_database(db_path.to_string_lossy().to_string());

        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_product_thresholds() {
        let cfg = Config::with_database("x.sqlite".into());
        assert_eq!(cfg.check_interval_minutes, 30);
        assert_eq!(cfg.grace_minutes, 10);
        assert_eq!(cfg.missed_after_minutes, 30);
        assert_eq!(cfg.post_event_grace_minutes, 120);
        assert_eq!(cfg.watchdog_tick_secs, 60);
        assert_eq!(cfg.badge_tick_secs, 300);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_yaml_is_filled_with_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/r.sqlite\nuser: alice\n").unwrap();
        assert_eq!(cfg.user.as_deref(), Some("alice"));
        assert_eq!(cfg.check_interval_minutes, 30);
        assert_eq!(cfg.excluded_event_types, vec!["external".to_string()]);
    }

    #[test]
    fn grace_longer_than_missed_window_is_rejected() {
        let mut cfg = Config::with_database("x.sqlite".into());
        cfg.grace_minutes = 45;
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }
}

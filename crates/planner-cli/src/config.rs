use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use planner_core::timezone::validate_timezone;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding lists and tasks
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// IANA timezone recurrences are stepped in
    #[serde(default = "detect_system_timezone")]
    pub default_timezone: String,
    /// Filter used when neither `PLANNER_LOG` nor `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Occurrences shown by `planner next` without `--count`
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_timezone: detect_system_timezone(),
            log_level: default_log_level(),
            preview_count: default_preview_count(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("planner.toml"))
            .merge(Env::prefixed("PLANNER_"))
    }
}

fn default_database_path() -> String {
    "planner.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_preview_count() -> usize {
    5
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

//! Handles settings for the application.
//!
//! Values come from an optional settings file and are overridden by
//! `TALLY_`-prefixed environment variables, `__` separating nested keys
//! (`TALLY_TELEGRAM__TOKEN`, `TALLY_DISPATCHER__WORKERS`, ...).
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use engine::Currency;
use serde::Deserialize;

const DEFAULT_SETTINGS_FILE: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    pub timezone: String,
    pub currency: Currency,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "Europe/Moscow".to_string(),
            currency: Currency::Rub,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite("tally.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Dispatcher {
    pub queue_capacity: usize,
    pub workers: usize,
    pub event_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            workers: 10,
            event_timeout_secs: 5,
            shutdown_timeout_secs: 10,
        }
    }
}

impl Dispatcher {
    pub fn event_timeout(&self) -> Duration {
        Duration::from_secs(self.event_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub dispatcher: Dispatcher,
    pub telegram: Telegram,
}

impl Settings {
    /// Loads the settings from `path`, or from an optional `settings.*` file in
    /// the working directory when no path is given.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                File::with_name(path.unwrap_or(DEFAULT_SETTINGS_FILE)).required(path.is_some()),
            )
            .add_source(
                Environment::with_prefix("TALLY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;
        if self.dispatcher.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "dispatcher.queue_capacity must be positive".to_string(),
            ));
        }
        if self.dispatcher.workers == 0 {
            return Err(ConfigError::Message(
                "dispatcher.workers must be positive".to_string(),
            ));
        }
        if self.dispatcher.event_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "dispatcher.event_timeout_secs must be positive".to_string(),
            ));
        }
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Message("telegram.token is empty".to_string()));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.app
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Message(format!("unknown timezone: {}", self.app.timezone)))
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn load(toml: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(config)
    }

    #[test]
    fn defaults_only_need_a_token() {
        let settings = load("[telegram]\ntoken = \"123:abc\"").unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::Moscow);
        assert_eq!(settings.app.currency, Currency::Rub);
        assert_eq!(settings.database.url(), "sqlite:tally.db?mode=rwc");
        assert_eq!(settings.dispatcher.queue_capacity, 100);
        assert_eq!(settings.dispatcher.workers, 10);
        assert_eq!(settings.dispatcher.event_timeout(), Duration::from_secs(5));
        assert_eq!(settings.dispatcher.shutdown_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn sections_override_defaults() {
        let settings = load(
            r#"
            database = "memory"

            [app]
            level = "debug"
            timezone = "Europe/Rome"
            currency = "EUR"

            [dispatcher]
            workers = 2

            [telegram]
            token = "123:abc"
            "#,
        )
        .unwrap();
        assert_eq!(settings.database.url(), "sqlite::memory:");
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::Rome);
        assert_eq!(settings.app.currency, Currency::Eur);
        assert_eq!(settings.dispatcher.workers, 2);
        assert_eq!(settings.dispatcher.queue_capacity, 100);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load("[telegram]\ntoken = \"\"").is_err());
        assert!(load("[app]\ntimezone = \"Mars/Olympus\"\n[telegram]\ntoken = \"t\"").is_err());
        assert!(load("[dispatcher]\nworkers = 0\n[telegram]\ntoken = \"t\"").is_err());
        assert!(load("[app]\ncurrency = \"USD\"\n[telegram]\ntoken = \"t\"").is_err());
        assert!(load("[app]\nlevel = \"info\"").is_err());
    }
}

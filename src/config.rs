use crate::error::{env_error, AgendaResult, Error};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Default viewer timezone when none is configured
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Default cap on events requested per fetch
pub const DEFAULT_MAX_RESULTS: u32 = 250;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the agenda engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Calendar ID to query
    pub google_calendar_id: String,
    /// IANA timezone the agenda is displayed in
    pub timezone: String,
    /// Cap on events requested per fetch
    pub max_results: Option<u32>,
    /// Defensive timeout applied to each fetch, in seconds
    pub fetch_timeout_secs: u64,
}

/// Optional overrides read from config/agenda.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    timezone: Option<String>,
    max_results: Option<u32>,
    fetch_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AgendaResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").map_err(|_| env_error("GOOGLE_CALENDAR_ID"))?;

        let timezone =
            env::var("AGENDA_TIMEZONE").unwrap_or_else(|_| String::from(DEFAULT_TIMEZONE));

        let max_results = match env::var("AGENDA_MAX_RESULTS") {
            Ok(value) => Some(
                value
                    .parse::<u32>()
                    .map_err(|_| Error::Config("Invalid AGENDA_MAX_RESULTS format".to_string()))?,
            ),
            Err(_) => Some(DEFAULT_MAX_RESULTS),
        };

        let fetch_timeout_secs = match env::var("AGENDA_FETCH_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>().map_err(|_| {
                Error::Config("Invalid AGENDA_FETCH_TIMEOUT_SECS format".to_string())
            })?,
            Err(_) => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        let mut config = Config {
            google_calendar_id,
            timezone,
            max_results,
            fetch_timeout_secs,
        };

        // Apply overrides from file if it exists
        if let Ok(content) = fs::read_to_string("config/agenda.toml") {
            let overrides: ConfigOverrides = toml::from_str(&content)?;
            config.apply(overrides);
        }

        // An unknown timezone fails at load, not at query time
        config
            .timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| Error::InvalidTimezone(config.timezone.clone()))?;

        Ok(config)
    }

    fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if let Some(max_results) = overrides.max_results {
            self.max_results = Some(max_results);
        }
        if let Some(fetch_timeout_secs) = overrides.fetch_timeout_secs {
            self.fetch_timeout_secs = fetch_timeout_secs;
        }
    }
}

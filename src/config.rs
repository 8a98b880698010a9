//! Configuration loader: `.env` file plus process environment.

use crate::constants::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::error::ConfigError;
use chrono::NaiveTime;
use std::path::PathBuf;
use std::time::Duration;

/// Which icon family the asset locator prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconPeriod {
    /// Always the day icons
    #[default]
    Day,
    /// Night icons between 20:00 and 07:00 local time
    Auto,
}

#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub warnings_url: Option<String>,
    pub forecast_base: Option<String>,
    pub city_id: Option<String>,
    pub districts_url: Option<String>,
    pub weather_types_url: Option<String>,
    pub wind_types_url: Option<String>,
    pub area_id: String,
    pub check_interval: Duration,
    pub forecast_time: NaiveTime,
    pub telegram: Option<TelegramCredentials>,
    pub images_dir: PathBuf,
    pub icon_period: IconPeriod,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warnings_url: None,
            forecast_base: None,
            city_id: None,
            districts_url: None,
            weather_types_url: None,
            wind_types_url: None,
            area_id: String::new(),
            check_interval: Duration::from_secs(60 * 60),
            forecast_time: NaiveTime::from_hms_opt(20, 30, 0).unwrap_or_default(),
            telegram: None,
            images_dir: PathBuf::from("images"),
            icon_period: IconPeriod::Day,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config {
            warnings_url: get("IPMA_WARNINGS_URL"),
            forecast_base: get("IPMA_FORECAST_BASE"),
            city_id: get("IPMA_CITY_ID"),
            districts_url: get("DISTRICTS_URL"),
            weather_types_url: get("WEATHER_TYPES_URL"),
            wind_types_url: get("WIND_TYPES_URL"),
            area_id: get("TARGET_AREA_ID").unwrap_or_default(),
            ..Config::default()
        };

        if let Some(raw) = get("CHECK_INTERVAL_MINUTES") {
            let minutes = parse_positive(&raw, "CHECK_INTERVAL_MINUTES")?;
            let secs = minutes.checked_mul(60).ok_or_else(|| ConfigError::Invalid {
                name: "CHECK_INTERVAL_MINUTES",
                expected: "a whole number of minutes that fits in seconds",
                value: raw.clone(),
            })?;
            config.check_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = get("FORECAST_TIME") {
            config.forecast_time =
                NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|_| ConfigError::Invalid {
                    name: "FORECAST_TIME",
                    expected: "a time formatted as HH:MM",
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = get("HTTP_TIMEOUT_SECS") {
            config.fetch_timeout = Duration::from_secs(parse_positive(&raw, "HTTP_TIMEOUT_SECS")?);
        }
        if let Some(dir) = get("IMAGES_DIR") {
            config.images_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("ICON_PERIOD") {
            config.icon_period = match raw.to_ascii_lowercase().as_str() {
                "day" => IconPeriod::Day,
                "auto" => IconPeriod::Auto,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "ICON_PERIOD",
                        expected: "one of: day, auto",
                        value: raw,
                    })
                }
            };
        }

        config.telegram = match (get("BOT_TOKEN"), get("CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramCredentials { token, chat_id }),
            _ => None,
        };

        Ok(config)
    }

    /// Full forecast feed URL, if both the base and the city id are configured.
    pub fn forecast_url(&self) -> Option<String> {
        match (&self.forecast_base, &self.city_id) {
            (Some(base), Some(city)) => Some(format!("{}{}.json", base, city)),
            _ => None,
        }
    }
}

fn parse_positive(raw: &str, name: &'static str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "an integer > 0",
            value: raw.to_string(),
        }),
    }
}

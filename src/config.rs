use serde::Deserialize;

use crate::env::{
    env_non_empty, FORCE_COLOR_ENV, NO_COLOR_ENV, PRETTY_LOG_LEVEL_ENV, PRETTY_LOG_SOURCE_ENV,
    PRETTY_LOG_TIME_FORMAT_ENV,
};
use crate::color::force_color_requested;
use crate::error::ConfigError;
use crate::record::Level;

/// Layout of the timestamp block that opens every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// `[HH:MM:SS]`
    #[default]
    Time,
    /// `[YYYY-MM-DD HH:MM:SS]`
    DateTime,
}

impl std::str::FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(TimeFormat::Time),
            "datetime" | "date-time" | "date_time" => Ok(TimeFormat::DateTime),
            other => Err(other.to_string()),
        }
    }
}

/// Configuration of a [`crate::handler::Handler`], supplied once at
/// construction.
///
/// **Fields**
/// - `level`: minimum level to emit; records below it are dropped without
///   any work.
/// - `add_source`: append a `source: file:line` attribute when the record
///   carries a location.
/// - `no_color`: never write escape sequences.
/// - `force_color`: write escape sequences without probing the stream.
///   Ignored when `no_color` is set.
/// - `time_format`: layout of the record timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HandlerOptions {
    pub level: Level,
    pub add_source: bool,
    pub no_color: bool,
    pub force_color: bool,
    pub time_format: TimeFormat,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            level: Level::Info,
            add_source: false,
            no_color: false,
            force_color: false,
            time_format: TimeFormat::Time,
        }
    }
}

impl HandlerOptions {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn with_force_color(mut self, force_color: bool) -> Self {
        self.force_color = force_color;
        self
    }

    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Build options from the defaults overridden by `PRETTY_LOG_LEVEL`,
    /// `PRETTY_LOG_SOURCE`, `PRETTY_LOG_TIME_FORMAT`, `NO_COLOR` and
    /// `FORCE_COLOR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_non_empty)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = HandlerOptions::default();

        if let Some(level) = lookup(PRETTY_LOG_LEVEL_ENV) {
            options.level = level
                .parse()
                .map_err(|source| ConfigError::InvalidLevel {
                    key: PRETTY_LOG_LEVEL_ENV,
                    source,
                })?;
        }
        if let Some(flag) = lookup(PRETTY_LOG_SOURCE_ENV) {
            options.add_source = parse_flag(PRETTY_LOG_SOURCE_ENV, &flag)?;
        }
        if let Some(format) = lookup(PRETTY_LOG_TIME_FORMAT_ENV) {
            options.time_format = format
                .parse()
                .map_err(|value| ConfigError::InvalidTimeFormat {
                    key: PRETTY_LOG_TIME_FORMAT_ENV,
                    value,
                })?;
        }
        options.no_color = lookup(NO_COLOR_ENV).is_some();
        options.force_color = !options.no_color
            && lookup(FORCE_COLOR_ENV).is_some_and(|v| force_color_requested(&v));

        Ok(options)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

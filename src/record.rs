use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use crate::attr::Attr;
use crate::color;
use crate::error::ParseLevelError;

/// Severity of a record, ordered from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Escape sequence the level is printed with.
    pub fn color(&self) -> &'static str {
        match self {
            Level::Error => color::RED,
            Level::Warn => color::YELLOW,
            Level::Info => color::GREEN,
            Level::Debug => color::MAGENTA,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            _ => Level::Debug,
        }
    }
}

/// Program location a record was produced at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
}

impl From<&Location<'_>> for Source {
    fn from(location: &Location<'_>) -> Self {
        Source {
            file: location.file().to_string(),
            line: location.line(),
            function: None,
        }
    }
}

/// A single log event, consumed once by [`crate::handler::Handler::handle`].
#[derive(Debug, Clone)]
pub struct Record {
    /// Wall-clock time; `None` omits the timestamp block.
    pub time: Option<NaiveDateTime>,
    pub level: Level,
    pub message: String,
    pub attrs: Vec<Attr>,
    pub source: Option<Source>,
}

impl Record {
    /// A record without a timestamp.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Record {
            time: None,
            level,
            message: message.into(),
            attrs: Vec::new(),
            source: None,
        }
    }

    /// A record stamped with the current local time.
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Record {
            time: Some(Local::now().naive_local()),
            ..Record::new(level, message)
        }
    }

    pub fn with_time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

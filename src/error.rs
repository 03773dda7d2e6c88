/// Error returned when a string does not name a [`crate::record::Level`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level {0:?}, expected one of debug, info, warn, error")]
pub struct ParseLevelError(pub String);

/// Error type returned when loading [`crate::config::HandlerOptions`] from
/// the environment.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {source}")]
    InvalidLevel {
        key: &'static str,
        #[source]
        source: ParseLevelError,
    },

    #[error("invalid {key}: unknown time format {value:?}, expected `time` or `datetime`")]
    InvalidTimeFormat { key: &'static str, value: String },

    #[error("invalid {key}: {value:?} is not a boolean")]
    InvalidFlag { key: &'static str, value: String },
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("a global tracing subscriber is already installed")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

//! Environment variable names consulted by this crate.
//!
//! These are purely helpers; [`crate::config::HandlerOptions`] can always
//! be built without touching the environment.

/// Minimum level to emit: `debug`, `info`, `warn` or `error`.
pub const PRETTY_LOG_LEVEL_ENV: &str = "PRETTY_LOG_LEVEL";

/// Append a `source` attribute with the call site when truthy.
pub const PRETTY_LOG_SOURCE_ENV: &str = "PRETTY_LOG_SOURCE";

/// Record timestamp layout: `time` or `datetime`.
pub const PRETTY_LOG_TIME_FORMAT_ENV: &str = "PRETTY_LOG_TIME_FORMAT";

/// Any non-empty value disables colors (<https://no-color.org>).
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Any non-empty value other than `0`, `false`, `no` or `off` forces
/// colors on.
pub const FORCE_COLOR_ENV: &str = "FORCE_COLOR";

/// Terminal type; `dumb` disables colors.
pub const TERM_ENV: &str = "TERM";

/// Read an environment variable, treating unset and empty alike.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

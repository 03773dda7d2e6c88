//! ANSI escape sequences used by the handler and the probe deciding whether
//! a stream may receive them.

use console::Term;

use crate::env::{FORCE_COLOR_ENV, NO_COLOR_ENV, TERM_ENV};

pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const GRAY: &str = "\x1b[90m";

/// Sentinel for "leave this text uncolored".
pub const NO_COLOR: &str = "";

/// Attribute keys, including JSON object keys.
pub const KEY_COLOR: &str = CYAN;

/// Colons, list bullets and JSON structure.
pub const PUNCTUATION_COLOR: &str = GRAY;

/// Record timestamps.
pub const TIME_COLOR: &str = GRAY;

/// Returns whether ANSI colors are safe to write to `term`.
///
/// `NO_COLOR` wins over everything, `FORCE_COLOR` wins over the terminal
/// check, and `TERM=dumb` disables colors even on a terminal. The terminal
/// check is `console`'s: on Windows it switches the console handle into
/// virtual terminal mode and fails when the console refuses.
pub fn is_color_supported(term: &Term) -> bool {
    probe(
        std::env::var(NO_COLOR_ENV).ok().as_deref(),
        std::env::var(FORCE_COLOR_ENV).ok().as_deref(),
        std::env::var(TERM_ENV).ok().as_deref(),
        || term.features().colors_supported(),
    )
}

/// Whether a `FORCE_COLOR` value asks for colors. Empty values and the
/// usual negatives (`0`, `false`, `no`, `off`) do not.
pub fn force_color_requested(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

fn probe(
    no_color: Option<&str>,
    force_color: Option<&str>,
    term: Option<&str>,
    colors_supported: impl FnOnce() -> bool,
) -> bool {
    if no_color.is_some_and(|v| !v.is_empty()) {
        return false;
    }
    if force_color.is_some_and(force_color_requested) {
        return true;
    }
    if term == Some("dumb") {
        return false;
    }
    colors_supported()
}

#[cfg(test)]
mod tests {
    use super::{force_color_requested, probe};

    fn yes() -> bool {
        true
    }

    fn no() -> bool {
        false
    }

    #[test]
    fn no_color_beats_force_color() {
        assert!(!probe(Some("1"), Some("1"), None, yes));
    }

    #[test]
    fn empty_no_color_is_ignored() {
        assert!(probe(Some(""), None, Some("xterm-256color"), yes));
    }

    #[test]
    fn force_color_without_terminal() {
        assert!(probe(None, Some("1"), Some("dumb"), no));
        assert!(probe(None, Some("always"), None, no));
        for off in ["0", "false", "no", "OFF", ""] {
            assert!(!probe(None, Some(off), None, no), "{off:?}");
        }
    }

    #[test]
    fn force_color_values() {
        assert!(force_color_requested("1"));
        assert!(force_color_requested("yes"));
        assert!(!force_color_requested("no"));
        assert!(!force_color_requested(" off "));
    }

    #[test]
    fn dumb_terminal_disables_colors() {
        assert!(!probe(None, None, Some("dumb"), || panic!("terminal not consulted")));
    }

    #[test]
    fn falls_back_to_terminal_check() {
        assert!(probe(None, None, Some("xterm"), yes));
        assert!(!probe(None, None, None, no));
    }
}

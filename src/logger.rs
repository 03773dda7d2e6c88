use std::error::Error;
use std::io;
use std::panic::Location;

use crate::attr::{error_attrs, Attr};
use crate::context;
use crate::handler::Handler;
use crate::record::{Level, Record, Source};

/// Where attributes of the enclosing [`context`] scope go relative to a
/// record's own attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeMerge {
    /// After the record's own attributes.
    #[default]
    Append,
    /// Before the record's own attributes.
    Prepend,
    /// Scope attributes are not consulted.
    Ignore,
}

/// Convenience front end over a [`Handler`].
///
/// Every logging method stamps the record with the current time and the
/// caller's location, merges the current scope attributes, and hands the
/// record to the handler.
#[derive(Clone, Debug)]
pub struct Logger {
    handler: Handler,
    merge: ScopeMerge,
}

impl Logger {
    pub fn new(handler: Handler) -> Self {
        Logger {
            handler,
            merge: ScopeMerge::default(),
        }
    }

    pub fn with_scope_merge(mut self, merge: ScopeMerge) -> Self {
        self.merge = merge;
        self
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// A logger that prints `attrs` on every record.
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Logger {
        Logger {
            handler: self.handler.with_attrs(attrs),
            merge: self.merge,
        }
    }

    /// A logger whose attributes nest under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        Logger {
            handler: self.handler.with_group(name),
            merge: self.merge,
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    #[track_caller]
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> io::Result<()> {
        let location = Location::caller();
        self.emit(level, message.into(), attrs.into_iter().collect(), location)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> io::Result<()> {
        self.log(Level::Debug, message, attrs)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> io::Result<()> {
        self.log(Level::Info, message, attrs)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> io::Result<()> {
        self.log(Level::Warn, message, attrs)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> io::Result<()> {
        self.log(Level::Error, message, attrs)
    }

    /// Log `err` at error level; the error and its source chain become
    /// `error` / `caused_by` attributes ahead of `attrs`.
    #[track_caller]
    pub fn log_error(
        &self,
        err: &(dyn Error + 'static),
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> io::Result<()> {
        let location = Location::caller();
        let mut all = error_attrs(err);
        all.extend(attrs);
        self.emit(Level::Error, message.into(), all, location)
    }

    fn emit(
        &self,
        level: Level,
        message: String,
        mut attrs: Vec<Attr>,
        location: &Location<'_>,
    ) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        match self.merge {
            ScopeMerge::Append => attrs.extend(context::current()),
            ScopeMerge::Prepend => {
                let mut scoped = context::current();
                scoped.append(&mut attrs);
                attrs = scoped;
            }
            ScopeMerge::Ignore => {}
        }
        let record = Record::now(level, message)
            .with_attrs(attrs)
            .with_source(Source::from(location));
        self.handler.handle(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerOptions;
    use crate::sink::MemoryWriter;

    fn logger(options: HandlerOptions) -> (Logger, MemoryWriter) {
        let memory = MemoryWriter::new();
        let handler = Handler::new(memory.clone(), options.with_no_color(true));
        (Logger::new(handler), memory)
    }

    // Drop the `[HH:MM:SS] ` prefix stamped by Record::now.
    fn without_time(text: &str) -> String {
        text.lines()
            .map(|line| match line.strip_prefix('[') {
                Some(rest) => rest.split_once("] ").map_or(line, |(_, tail)| tail),
                None => line,
            })
            .map(|line| format!("{line}\n"))
            .collect()
    }

    #[test]
    fn info_with_attrs() {
        let (log, out) = logger(HandlerOptions::default());
        log.info("Server started", crate::attrs!["port" => 8000]).unwrap();
        assert_eq!(without_time(&out.contents()), "INFO: Server started\n  port: 8000\n");
    }

    #[test]
    fn below_minimum_is_silent() {
        let (log, out) = logger(HandlerOptions::default());
        log.debug("noise", Vec::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn source_is_the_caller() {
        let (log, out) = logger(HandlerOptions::default().with_source(true));
        log.warn("careful", Vec::new()).unwrap();
        let text = out.contents();
        assert!(text.contains("  source: "), "{text}");
        assert!(text.contains("logger.rs:"), "{text}");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn log_error_adds_error_attr() {
        let (log, out) = logger(HandlerOptions::default());
        log.log_error(&DiskFull, "save failed", crate::attrs!["path" => "/tmp/x"])
            .unwrap();
        assert_eq!(
            without_time(&out.contents()),
            "ERROR: save failed\n  error: disk full\n  path: /tmp/x\n"
        );
    }

    #[test]
    fn scope_merge_policies() {
        let (log, out) = logger(HandlerOptions::default());
        context::sync_scope([Attr::new("request_id", "r1")], || {
            log.info("a", crate::attrs!["own" => 1]).unwrap();
            log.clone()
                .with_scope_merge(ScopeMerge::Prepend)
                .info("b", crate::attrs!["own" => 2])
                .unwrap();
            log.clone()
                .with_scope_merge(ScopeMerge::Ignore)
                .info("c", crate::attrs!["own" => 3])
                .unwrap();
        });
        assert_eq!(
            without_time(&out.contents()),
            "INFO: a\n  own: 1\n  request_id: r1\n\
             INFO: b\n  request_id: r1\n  own: 2\n\
             INFO: c\n  own: 3\n"
        );
    }
}

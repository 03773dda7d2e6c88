//! `tracing` events and spans printed through the layer.

use std::sync::atomic::Ordering;

use pretty_log_sink::context;
use pretty_log_sink::init::subscriber;
use pretty_log_sink::layer::PrettyLayer;
use pretty_log_sink::sink::MemoryWriter;
use pretty_log_sink::{Attr, Handler, HandlerOptions, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn handler(level: Level) -> (Handler, MemoryWriter) {
    let out = MemoryWriter::new();
    let options = HandlerOptions::default().with_no_color(true).with_level(level);
    (Handler::new(out.clone(), options), out)
}

// Records from the layer are stamped with the current time; drop the
// `[HH:MM:SS] ` prefix so the rest can be compared exactly.
fn strip_time(text: &str) -> String {
    text.lines()
        .map(|line| match line.strip_prefix('[') {
            Some(rest) => rest.split_once("] ").map_or(line, |(_, tail)| tail),
            None => line,
        })
        .map(|line| format!("{line}\n"))
        .collect()
}

#[test]
fn event_fields_and_message() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        tracing::info!(port = 8000u64, environment = "DEV", "Server started");
        tracing::warn!(ratio = 0.5, ok = false, "formatted {}", 7);
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: Server started\n  port: 8000\n  environment: DEV\n\
         WARN: formatted 7\n  ratio: 0.5\n  ok: false\n"
    );
}

#[test]
fn spans_become_groups() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        let span = tracing::info_span!("request", id = 42u64);
        let _entered = span.enter();
        tracing::info!(user = "bob", "handled");
        tracing::info!("no fields");
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: handled\n  request:\n    user: bob\n    id: 42\n\
         INFO: no fields\n  request:\n    id: 42\n"
    );
}

#[test]
fn empty_span_is_deferred() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        let outer = tracing::info_span!("outer");
        let _outer = outer.enter();
        tracing::info!("bare");
        tracing::info!(k = "v", "with");
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: bare\nINFO: with\n  outer:\n    k: v\n"
    );
}

#[test]
fn recorded_span_fields_are_bound() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        let span = tracing::info_span!("job", status = tracing::field::Empty);
        span.record("status", "done");
        let _entered = span.enter();
        tracing::info!("finished");
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: finished\n  job:\n    status: done\n"
    );
}

#[test]
fn disabled_levels_are_counted_but_not_written() {
    let (handler, out) = handler(Level::Info);
    let layer = PrettyLayer::new(handler);
    let total = layer.total_events.clone();
    let errors = layer.write_errors.clone();
    tracing::subscriber::with_default(Registry::default().with(layer), || {
        tracing::debug!("hidden");
        tracing::trace!("hidden too");
        tracing::error!("shown");
    });
    assert_eq!(total.load(Ordering::Relaxed), 3);
    assert_eq!(errors.load(Ordering::Relaxed), 0);
    assert_eq!(strip_time(&out.contents()), "ERROR: shown\n");
}

#[test]
fn scope_attributes_are_merged() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        context::sync_scope([Attr::new("request_id", "r-1")], || {
            tracing::info!(step = 1u64, "working");
        });
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: working\n  step: 1\n  request_id: r-1\n"
    );
}

#[derive(Debug, thiserror::Error)]
#[error("query failed")]
struct QueryFailed(#[source] std::io::Error);

#[test]
fn error_fields_include_their_chain() {
    let (handler, out) = handler(Level::Info);
    let err = QueryFailed(std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"));
    tracing::subscriber::with_default(subscriber(handler), || {
        tracing::error!(cause = &err as &(dyn std::error::Error + 'static), "lookup");
    });
    assert_eq!(
        strip_time(&out.contents()),
        "ERROR: lookup\n  cause: query failed\n  caused_by: timed out\n"
    );
}

#[test]
fn recorded_fields_reach_existing_child_spans() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        let job = tracing::info_span!("job", status = tracing::field::Empty);
        let _job = job.enter();
        let step = tracing::info_span!("step", n = 1u64);
        let _step = step.enter();

        tracing::info!("before");
        job.record("status", "done");
        tracing::info!("after");
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: before\n  job:\n    step:\n      n: 1\n\
         INFO: after\n  job:\n    step:\n      n: 1\n    status: done\n"
    );
}

#[test]
fn later_records_bind_newest_first() {
    let (handler, out) = handler(Level::Info);
    tracing::subscriber::with_default(subscriber(handler), || {
        let span = tracing::info_span!(
            "job",
            id = 7u64,
            a = tracing::field::Empty,
            b = tracing::field::Empty
        );
        span.record("a", 1u64);
        span.record("b", 2u64);
        let _entered = span.enter();
        tracing::info!("m");
    });
    assert_eq!(
        strip_time(&out.contents()),
        "INFO: m\n  job:\n    b: 2\n    a: 1\n    id: 7\n"
    );
}

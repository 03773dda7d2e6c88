use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::span;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::{LookupSpan, SpanRef};

use crate::attr::{error_attrs, Attr, Value};
use crate::context;
use crate::handler::Handler;
use crate::logger::ScopeMerge;
use crate::record::{Level, Record, Source};

/// `tracing_subscriber` layer that prints events through a [`Handler`].
///
/// Each span becomes a group named after the span, holding the span's
/// fields. The handler derived for a span is cached in its extensions and
/// reused until the span, or one of its ancestors, records new fields.
/// Events are rendered and written synchronously on the calling thread.
pub struct PrettyLayer {
    handler: Handler,
    merge: ScopeMerge,
    next_stamp: AtomicU64,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events whose write to the sink failed.
    pub write_errors: Arc<AtomicU64>,
}

/// Per-span state kept in the span's extensions.
struct SpanState {
    /// Field batches in recording order; each one is a separate bind.
    binds: Vec<Vec<Attr>>,
    cached: Option<CachedHandler>,
}

/// A derived handler together with the stamp of the parent it was derived
/// from. Stamps are unique per derivation, so a rebuilt ancestor
/// invalidates every cache below it.
struct CachedHandler {
    parent_stamp: u64,
    stamp: u64,
    handler: Handler,
}

impl PrettyLayer {
    pub fn new(handler: Handler) -> Self {
        PrettyLayer {
            handler,
            merge: ScopeMerge::default(),
            next_stamp: AtomicU64::new(1),
            total_events: Arc::new(AtomicU64::new(0)),
            write_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Where task-local [`context`] attributes go relative to an event's
    /// own fields.
    pub fn with_scope_merge(mut self, merge: ScopeMerge) -> Self {
        self.merge = merge;
        self
    }

    // Walks from the root span down to `leaf`, reusing each span's cached
    // handler while its parent is unchanged. Stamp 0 is the layer's own
    // handler.
    fn handler_for<S>(&self, leaf: Option<SpanRef<'_, S>>) -> Handler
    where
        S: for<'span> LookupSpan<'span>,
    {
        let mut handler = self.handler.clone();
        let Some(leaf) = leaf else {
            return handler;
        };

        let mut parent_stamp = 0;
        for span in leaf.scope().from_root() {
            let mut extensions = span.extensions_mut();
            let Some(state) = extensions.get_mut::<SpanState>() else {
                continue;
            };

            let hit = state
                .cached
                .as_ref()
                .filter(|cached| cached.parent_stamp == parent_stamp)
                .map(|cached| (cached.stamp, cached.handler.clone()));
            let (stamp, derived) = match hit {
                Some(hit) => hit,
                None => {
                    let derived = state
                        .binds
                        .iter()
                        .fold(handler.with_group(span.name()), |h, fields| {
                            h.with_attrs(fields.iter().cloned())
                        });
                    let stamp = self.next_stamp.fetch_add(1, Ordering::Relaxed);
                    state.cached = Some(CachedHandler {
                        parent_stamp,
                        stamp,
                        handler: derived.clone(),
                    });
                    (stamp, derived)
                }
            };
            handler = derived;
            parent_stamp = stamp;
        }
        handler
    }
}

fn collect_fields(record: impl FnOnce(&mut FieldVisitor<'_>)) -> Vec<Attr> {
    let mut fields = Vec::new();
    let mut message = None;
    record(&mut FieldVisitor { fields: &mut fields, message: &mut message });
    if let Some(message) = message {
        fields.insert(0, Attr::new("message", message));
    }
    fields
}

impl<S> Layer<S> for PrettyLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let fields = collect_fields(|visitor| attrs.record(visitor));
        span.extensions_mut().insert(SpanState {
            binds: vec![fields],
            cached: None,
        });
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let fields = collect_fields(|visitor| values.record(visitor));
        if fields.is_empty() {
            return;
        }

        let mut extensions = span.extensions_mut();
        if let Some(state) = extensions.get_mut::<SpanState>() {
            state.binds.push(fields);
            state.cached = None;
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.handler.enabled(level) {
            return;
        }
        let handler = self.handler_for(ctx.event_span(event));

        let mut fields = Vec::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor { fields: &mut fields, message: &mut message });

        match self.merge {
            ScopeMerge::Append => fields.extend(context::current()),
            ScopeMerge::Prepend => {
                let mut scoped = context::current();
                scoped.append(&mut fields);
                fields = scoped;
            }
            ScopeMerge::Ignore => {}
        }

        let mut record = Record::now(level, message.unwrap_or_default()).with_attrs(fields);
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            record.source = Some(Source {
                file: file.to_string(),
                line,
                function: meta.module_path().map(|s| s.to_string()),
            });
        }

        if let Err(e) = handler.handle(&record) {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
            eprintln!("error writing log record: {}", e);
        }
    }
}

/// Collects `tracing` field values as [`Attr`]s, splitting out the
/// `message` field.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn push(&mut self, field: &Field, value: impl Into<Value>) {
        self.fields.push(Attr::new(field.name(), value));
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let mut attrs = error_attrs(value);
        attrs[0].key = field.name().to_string();
        self.fields.extend(attrs);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, format!("{:?}", value));
        }
    }
}

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use chrono::NaiveDateTime;
use console::Term;

use crate::attr::Attr;
use crate::buffer::{Buffer, BufferPool};
use crate::color::{self, is_color_supported};
use crate::config::{HandlerOptions, TimeFormat};
use crate::record::{Level, Record, Source};
use crate::render::{render_attr, render_attrs, write_datetime, write_key, write_time_of_day};
use crate::sink::Sink;

/// Renders [`Record`]s as indented, optionally colorized text.
///
/// A `Handler` is immutable. [`Handler::with_attrs`] and
/// [`Handler::with_group`] return new handlers that share every buffer they
/// do not extend with their parent, so a handler can be cloned and passed
/// across threads freely; deriving from it never changes what it prints.
///
/// Three pre-rendered segments travel down the lineage:
/// - bound attributes, newest bind first;
/// - headers of groups opened since the last bind, printed only when the
///   record itself has attributes to put under them;
/// - headers of groups that already enclose bound attributes, printed on
///   every record.
#[derive(Clone)]
pub struct Handler {
    sink: Arc<Sink>,
    options: Arc<HandlerOptions>,
    colors: bool,
    indent: usize,
    preformatted_attrs: Arc<[u8]>,
    preformatted_groups: Arc<[u8]>,
    preformatted_groups_with_attrs: Arc<[u8]>,
}

impl Handler {
    /// Create a handler writing to an arbitrary writer.
    ///
    /// Colors are only enabled by `force_color`, since a plain writer
    /// cannot be probed for terminal support.
    pub fn new<W: Write + Send + 'static>(writer: W, options: HandlerOptions) -> Self {
        let colors = resolve_colors(&options, || false);
        Self::build(Sink::new(writer), options, colors)
    }

    /// Create a handler writing to a terminal stream; colors are enabled
    /// when [`is_color_supported`] says so, unless overridden.
    pub fn with_terminal(term: Term, options: HandlerOptions) -> Self {
        let colors = resolve_colors(&options, || is_color_supported(&term));
        Self::build(Sink::new(term), options, colors)
    }

    pub fn stdout(options: HandlerOptions) -> Self {
        Self::with_terminal(Term::stdout(), options)
    }

    pub fn stderr(options: HandlerOptions) -> Self {
        Self::with_terminal(Term::stderr(), options)
    }

    fn build(sink: Sink, options: HandlerOptions, colors: bool) -> Self {
        let empty: Arc<[u8]> = Arc::from(&[][..]);
        Handler {
            sink: Arc::new(sink),
            options: Arc::new(options),
            colors,
            indent: 0,
            preformatted_attrs: Arc::clone(&empty),
            preformatted_groups: Arc::clone(&empty),
            preformatted_groups_with_attrs: empty,
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    /// Nesting depth of attributes on records handled here.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.options.level
    }

    /// Derive a handler that prints `attrs` on every record.
    ///
    /// The attributes are rendered once, here, at the current depth. Any
    /// groups opened since the last bind now enclose attributes and will be
    /// printed on every record as well.
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Handler {
        let mut rendered = BufferPool::large().acquire();
        for attr in attrs {
            render_attr(&mut rendered, &attr, self.indent, self.colors);
        }
        if rendered.is_empty() {
            return self.clone();
        }
        rendered.write_bytes(&self.preformatted_attrs);

        let groups_with_attrs = if self.preformatted_groups.is_empty() {
            Arc::clone(&self.preformatted_groups_with_attrs)
        } else {
            concat(&self.preformatted_groups_with_attrs, &self.preformatted_groups)
        };

        Handler {
            sink: Arc::clone(&self.sink),
            options: Arc::clone(&self.options),
            colors: self.colors,
            indent: self.indent,
            preformatted_attrs: Arc::from(rendered.as_bytes()),
            preformatted_groups: Arc::from(&[][..]),
            preformatted_groups_with_attrs: groups_with_attrs,
        }
    }

    /// Derive a handler whose attributes nest under `name`. An empty name
    /// returns an equivalent handler.
    pub fn with_group(&self, name: &str) -> Handler {
        if name.is_empty() {
            return self.clone();
        }
        let mut header = Buffer::with_capacity(self.preformatted_groups.len() + name.len() + 16);
        header.write_bytes(&self.preformatted_groups);
        write_key(&mut header, name, self.indent, self.colors);
        header.write_byte(b'\n');

        Handler {
            sink: Arc::clone(&self.sink),
            options: Arc::clone(&self.options),
            colors: self.colors,
            indent: self.indent + 1,
            preformatted_attrs: Arc::clone(&self.preformatted_attrs),
            preformatted_groups: Arc::from(header.into_vec()),
            preformatted_groups_with_attrs: Arc::clone(&self.preformatted_groups_with_attrs),
        }
    }

    /// Render `record` and write it to the sink in one locked write.
    ///
    /// **Returns**
    /// - `Ok(())` when the record was written, or skipped because its level
    ///   is below the configured minimum.
    /// - `Err(..)` with the sink's write error, unchanged.
    pub fn handle(&self, record: &Record) -> io::Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }

        let mut buf = BufferPool::large().acquire();
        if let Some(time) = &record.time {
            self.write_timestamp(&mut buf, time);
        }
        buf.write_colored(record.level.color(), record.level.as_str(), self.colors);
        buf.write_str(": ");
        buf.write_str(&record.message);
        buf.write_byte(b'\n');

        buf.write_bytes(&self.preformatted_groups_with_attrs);
        if !record.attrs.is_empty() {
            buf.write_bytes(&self.preformatted_groups);
            render_attrs(&mut buf, &record.attrs, self.indent, self.colors);
        }
        buf.write_bytes(&self.preformatted_attrs);

        if self.options.add_source {
            if let Some(source) = &record.source {
                render_attr(&mut buf, &source_attr(source), 0, self.colors);
            }
        }

        self.sink.write_record(buf.as_bytes())
    }

    fn write_timestamp(&self, buf: &mut Buffer, time: &NaiveDateTime) {
        if self.colors {
            buf.write_str(color::TIME_COLOR);
        }
        buf.write_byte(b'[');
        match self.options.time_format {
            TimeFormat::Time => write_time_of_day(buf, time),
            TimeFormat::DateTime => write_datetime(buf, time),
        }
        buf.write_byte(b']');
        if self.colors {
            buf.write_str(color::RESET);
        }
        buf.write_byte(b' ');
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("options", &self.options)
            .field("colors", &self.colors)
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

fn resolve_colors(options: &HandlerOptions, probe: impl FnOnce() -> bool) -> bool {
    if options.no_color {
        false
    } else if options.force_color {
        true
    } else {
        probe()
    }
}

fn concat(a: &[u8], b: &[u8]) -> Arc<[u8]> {
    let mut joined = Vec::with_capacity(a.len() + b.len());
    joined.extend_from_slice(a);
    joined.extend_from_slice(b);
    Arc::from(joined)
}

fn source_attr(source: &Source) -> Attr {
    let location = match &source.function {
        Some(function) => format!("{}:{} ({})", source.file, source.line, function),
        None => format!("{}:{}", source.file, source.line),
    };
    Attr::new("source", location)
}

//! Rendering of single attributes into their indented text form.
//!
//! [`render_attr`] appends complete lines: it writes its own indentation
//! and ends every attribute with a newline.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::attr::{Attr, ToJson, Value};
use crate::buffer::{Buffer, BufferPool};
use crate::color::{KEY_COLOR, NO_COLOR, PUNCTUATION_COLOR};

/// Render `attr` at nesting `depth`.
///
/// Lazy values are resolved exactly once here. Placeholder attributes and
/// empty groups write nothing; groups with an empty key are inlined at
/// `depth`.
pub fn render_attr(buf: &mut Buffer, attr: &Attr, depth: usize, colors: bool) {
    let value = attr.value.resolve();
    if attr.key.is_empty() && matches!(*value, Value::Empty) {
        return;
    }

    if let Value::Group(children) = &*value {
        if children.is_empty() {
            return;
        }
        if attr.key.is_empty() {
            render_attrs(buf, children, depth, colors);
            return;
        }
        write_key(buf, &attr.key, depth, colors);
        buf.write_byte(b'\n');
        render_attrs(buf, children, depth + 1, colors);
        return;
    }

    write_key(buf, &attr.key, depth, colors);
    write_value(buf, &value, depth, colors);
}

pub fn render_attrs(buf: &mut Buffer, attrs: &[Attr], depth: usize, colors: bool) {
    for attr in attrs {
        render_attr(buf, attr, depth, colors);
    }
}

/// Indentation, key and colon; shared by attributes and group headers.
pub fn write_key(buf: &mut Buffer, key: &str, depth: usize, colors: bool) {
    buf.write_indent(depth);
    buf.write_colored(KEY_COLOR, key, colors);
    buf.write_colored(PUNCTUATION_COLOR, ":", colors);
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn write_datetime(buf: &mut Buffer, time: &NaiveDateTime) {
    let year = time.year();
    if year < 0 {
        buf.write_byte(b'-');
    }
    buf.write_padded(4, year.unsigned_abs() as u64);
    buf.write_byte(b'-');
    buf.write_padded(2, time.month() as u64);
    buf.write_byte(b'-');
    buf.write_padded(2, time.day() as u64);
    buf.write_byte(b' ');
    write_time_of_day(buf, time);
}

/// `HH:MM:SS`
pub fn write_time_of_day(buf: &mut Buffer, time: &NaiveDateTime) {
    buf.write_padded(2, time.hour() as u64);
    buf.write_byte(b':');
    buf.write_padded(2, time.minute() as u64);
    buf.write_byte(b':');
    buf.write_padded(2, time.second() as u64);
}

// Writes everything after `key:` (or a list bullet), trailing newline
// included. Scalars continue on the same line; continuation lines of
// multi-line text sit one level below `depth`.
fn write_value(buf: &mut Buffer, value: &Value, depth: usize, colors: bool) {
    match value {
        Value::Empty => buf.write_str(" null"),
        Value::String(s) => {
            buf.write_byte(b' ');
            buf.write_reindented(s.as_bytes(), depth + 1);
        }
        Value::Int(v) => {
            buf.write_byte(b' ');
            buf.write_int(*v);
        }
        Value::Uint(v) => {
            buf.write_byte(b' ');
            buf.write_uint(*v);
        }
        Value::Float(v) => {
            buf.write_byte(b' ');
            buf.write_display(v);
        }
        Value::Bool(v) => buf.write_str(if *v { " true" } else { " false" }),
        Value::Time(t) => {
            buf.write_byte(b' ');
            write_datetime(buf, t);
        }
        Value::Duration(d) => {
            buf.write_byte(b' ');
            buf.write_debug(d);
        }
        Value::Group(children) => {
            if children.is_empty() {
                buf.write_str(" {}");
            } else {
                buf.write_byte(b'\n');
                render_attrs(buf, children, depth + 1, colors);
            }
            return;
        }
        Value::List(items) => {
            write_list(buf, items, depth, colors);
            return;
        }
        Value::Json(v) => {
            buf.write_byte(b' ');
            write_json_capable(buf, v.as_ref(), depth, colors);
        }
        Value::Any(v) => {
            let mut text = BufferPool::small().acquire();
            text.write_display(v.as_ref());
            buf.write_byte(b' ');
            buf.write_reindented(text.as_bytes(), depth + 1);
        }
        Value::Lazy(_) => {
            write_value(buf, &value.resolve(), depth, colors);
            return;
        }
    }
    buf.write_byte(b'\n');
}

fn write_list(buf: &mut Buffer, items: &[Value], depth: usize, colors: bool) {
    match items {
        [] => buf.write_str(" []\n"),
        // A single element reads like a scalar; nested singletons keep
        // collapsing through write_value.
        [only] => write_value(buf, &only.resolve(), depth, colors),
        _ => {
            buf.write_byte(b'\n');
            for item in items {
                buf.write_indent(depth + 1);
                buf.write_colored(PUNCTUATION_COLOR, "-", colors);
                write_value(buf, &item.resolve(), depth + 1, colors);
            }
        }
    }
}

fn write_json_capable(buf: &mut Buffer, value: &dyn ToJson, depth: usize, colors: bool) {
    match value.to_json() {
        Ok(json) => write_json(buf, &json, depth, colors),
        Err(_) => {
            let mut text = BufferPool::small().acquire();
            text.write_debug(value);
            buf.write_reindented(text.as_bytes(), depth + 1);
        }
    }
}

// Nested members sit one level deeper than their container; the closing
// bracket returns to the container's level.
fn write_json(buf: &mut Buffer, json: &serde_json::Value, depth: usize, colors: bool) {
    use serde_json::Value as Json;

    match json {
        Json::Null => buf.write_str("null"),
        Json::Bool(v) => buf.write_str(if *v { "true" } else { "false" }),
        Json::Number(n) => buf.write_display(n),
        Json::String(s) => write_json_string(buf, s, NO_COLOR, colors),
        Json::Array(items) if items.is_empty() => {
            buf.write_colored(PUNCTUATION_COLOR, "[]", colors)
        }
        Json::Object(map) if map.is_empty() => {
            buf.write_colored(PUNCTUATION_COLOR, "{}", colors)
        }
        Json::Array(items) => {
            buf.write_colored(PUNCTUATION_COLOR, "[", colors);
            buf.write_byte(b'\n');
            for (i, item) in items.iter().enumerate() {
                buf.write_indent(depth + 1);
                write_json(buf, item, depth + 1, colors);
                if i + 1 < items.len() {
                    buf.write_colored(PUNCTUATION_COLOR, ",", colors);
                }
                buf.write_byte(b'\n');
            }
            buf.write_indent(depth);
            buf.write_colored(PUNCTUATION_COLOR, "]", colors);
        }
        Json::Object(map) => {
            buf.write_colored(PUNCTUATION_COLOR, "{", colors);
            buf.write_byte(b'\n');
            for (i, (key, item)) in map.iter().enumerate() {
                buf.write_indent(depth + 1);
                write_json_string(buf, key, KEY_COLOR, colors);
                buf.write_colored(PUNCTUATION_COLOR, ":", colors);
                buf.write_byte(b' ');
                write_json(buf, item, depth + 1, colors);
                if i + 1 < map.len() {
                    buf.write_colored(PUNCTUATION_COLOR, ",", colors);
                }
                buf.write_byte(b'\n');
            }
            buf.write_indent(depth);
            buf.write_colored(PUNCTUATION_COLOR, "}", colors);
        }
    }
}

fn write_json_string(buf: &mut Buffer, s: &str, color: &str, colors: bool) {
    match serde_json::to_string(s) {
        Ok(quoted) => buf.write_colored(color, &quoted, colors),
        Err(_) => {
            buf.write_byte(b'"');
            buf.write_colored(color, s, colors);
            buf.write_byte(b'"');
        }
    }
}

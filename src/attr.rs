use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A key/value pair attached to a log record or nested in a group.
///
/// The default value (empty key, [`Value::Empty`]) is a placeholder and
/// renders as nothing.
#[derive(Clone, Debug, Default)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A named group of attributes. An empty `key` inlines the children
    /// into the surrounding level.
    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Attr {
            key: key.into(),
            value: Value::Group(attrs.into_iter().collect()),
        }
    }

    pub fn list<T: Into<Value>>(key: impl Into<String>, items: impl IntoIterator<Item = T>) -> Self {
        Attr {
            key: key.into(),
            value: Value::List(items.into_iter().map(Into::into).collect()),
        }
    }

    /// A structured value rendered as an indented JSON document.
    pub fn json<T: ToJson + 'static>(key: impl Into<String>, value: T) -> Self {
        Attr {
            key: key.into(),
            value: Value::Json(Arc::new(value)),
        }
    }

    /// Any value rendered through its `Display` implementation.
    pub fn any<T: fmt::Display + Send + Sync + 'static>(key: impl Into<String>, value: T) -> Self {
        Attr {
            key: key.into(),
            value: Value::Any(Arc::new(value)),
        }
    }

    /// A value computed only when the attribute is rendered.
    pub fn lazy<F>(key: impl Into<String>, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Attr {
            key: key.into(),
            value: Value::Lazy(Lazy::new(produce)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && matches!(self.value, Value::Empty)
    }
}

/// Typed attribute value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Empty,
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Wall-clock time, rendered as `YYYY-MM-DD HH:MM:SS`.
    Time(NaiveDateTime),
    Duration(Duration),
    /// Ordered child attributes.
    Group(Vec<Attr>),
    /// Ordered sequence of values; one element collapses onto the key line,
    /// two or more render as a bulleted list.
    List(Vec<Value>),
    Json(Arc<dyn ToJson>),
    Any(Arc<dyn fmt::Display + Send + Sync>),
    Lazy(Lazy),
}

impl Value {
    /// Evaluate deferred values until a concrete one is produced.
    pub fn resolve(&self) -> Cow<'_, Value> {
        match self {
            Value::Lazy(lazy) => {
                let mut value = lazy.eval();
                while let Value::Lazy(inner) = value {
                    value = inner.eval();
                }
                Cow::Owned(value)
            }
            other => Cow::Borrowed(other),
        }
    }

    pub fn json<T: ToJson + 'static>(value: T) -> Self {
        Value::Json(Arc::new(value))
    }

    pub fn any<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        Value::Any(Arc::new(value))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("Empty"),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Group(v) => f.debug_tuple("Group").field(v).finish(),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Value::Any(v) => f.debug_tuple("Any").field(&format_args!("{v}")).finish(),
            Value::Lazy(_) => f.write_str("Lazy"),
        }
    }
}

/// Capability of values that prefer to render as a JSON document.
///
/// Implemented for every `Serialize + Debug` type; when serialization fails
/// the renderer falls back to the `Debug` form.
pub trait ToJson: fmt::Debug + Send + Sync {
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T> ToJson for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Deferred value producer, invoked at render time.
#[derive(Clone)]
pub struct Lazy(Arc<dyn Fn() -> Value + Send + Sync>);

impl Lazy {
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Lazy(Arc::new(produce))
    }

    pub fn eval(&self) -> Value {
        (self.0)()
    }
}

/// `error` attribute for `err`, plus a `caused_by` list when it has sources.
pub fn error_attrs(err: &(dyn std::error::Error + 'static)) -> Vec<Attr> {
    let mut attrs = vec![Attr::new("error", err.to_string())];
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(Value::String(cause.to_string()));
        source = cause.source();
    }
    if !causes.is_empty() {
        attrs.push(Attr::new("caused_by", Value::List(causes)));
    }
    attrs
}

/// Build a `Vec<Attr>` from `key => value` pairs.
///
/// ```
/// use pretty_log_sink::attrs;
///
/// let attrs = attrs!["port" => 8000, "environment" => "DEV"];
/// assert_eq!(attrs.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        ::std::vec::Vec::<$crate::attr::Attr>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::attr::Attr::new($key, $value)),+]
    };
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(v: Cow<'_, str>) -> Self {
        Value::String(v.into_owned())
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::Time(v.naive_local())
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<Lazy> for Value {
    fn from(v: Lazy) -> Self {
        Value::Lazy(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Empty, Into::into)
    }
}

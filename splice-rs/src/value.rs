//! Typed attribute values.
//!
//! Every value handed to the engine is one of a closed set of kinds.  The
//! formatter matches on [`Value`] exhaustively, so a value of an unknown kind
//! cannot reach it.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, FixedOffset, Utc};

use crate::sentinel;

/// Upper bound on chained lazy resolutions before giving up.
pub const MAX_LAZY_DEPTH: usize = 100;

/// A value computed only when a log line actually needs it.
///
/// Any `Fn() -> Value` closure qualifies.
pub trait LazyValue: Send + Sync {
    fn log_value(&self) -> Value;
}

impl<F> LazyValue for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// An arbitrary value rendered through its `Display` (or `Debug`) impl.
pub trait Opaque: fmt::Debug + fmt::Display + Send + Sync {}

impl<T> Opaque for T where T: fmt::Debug + fmt::Display + Send + Sync + ?Sized {}

/// An attribute value.
#[derive(Clone)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Duration(Duration),
    Time(DateTime<FixedOffset>),
    /// Ordered child attributes.
    Group(Vec<Attr>),
    Lazy(Arc<dyn LazyValue>),
    Any(Arc<dyn Opaque>),
}

/// The kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Str,
    Bool,
    Int,
    Uint,
    Float,
    Duration,
    Time,
    Group,
    Lazy,
    Any,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Str => "string",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Duration => "duration",
            Kind::Time => "time",
            Kind::Group => "group",
            Kind::Lazy => "lazy",
            Kind::Any => "any",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Wrap a closure that produces the value on demand.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Value::Lazy(Arc::new(f))
    }

    /// Wrap any displayable value.
    pub fn any<T>(v: T) -> Self
    where
        T: fmt::Debug + fmt::Display + Send + Sync + 'static,
    {
        Value::Any(Arc::new(v))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Str(_) => Kind::Str,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Duration(_) => Kind::Duration,
            Value::Time(_) => Kind::Time,
            Value::Group(_) => Kind::Group,
            Value::Lazy(_) => Kind::Lazy,
            Value::Any(_) => Kind::Any,
        }
    }

    /// Follow lazy values until a concrete one appears.
    ///
    /// Gives up after [`MAX_LAZY_DEPTH`] steps and yields the
    /// [`LAZY_OVERFLOW`](sentinel::LAZY_OVERFLOW) string instead.
    pub fn resolve(self) -> Value {
        let mut v = self;
        for _ in 0..MAX_LAZY_DEPTH {
            match v {
                Value::Lazy(l) => v = l.log_value(),
                other => return other,
            }
        }
        tracing::debug!(depth = MAX_LAZY_DEPTH, "lazy value did not settle");
        Value::Str(sentinel::LAZY_OVERFLOW.to_owned())
    }

    /// Like [`resolve`](Self::resolve), but also resolves every value nested
    /// inside groups.
    pub fn resolve_deep(self) -> Value {
        match self.resolve() {
            Value::Group(attrs) => Value::Group(
                attrs
                    .into_iter()
                    .map(|a| Attr { key: a.key, value: a.value.resolve_deep() })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Child attributes, if this is a group.
    pub fn as_group(&self) -> Option<&[Attr]> {
        match self {
            Value::Group(attrs) => Some(attrs),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Uint(n) => f.debug_tuple("Uint").field(n).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Duration(d) => f.debug_tuple("Duration").field(d).finish(),
            Value::Time(t) => f.debug_tuple("Time").field(t).finish(),
            Value::Group(attrs) => f.debug_tuple("Group").field(attrs).finish(),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
            Value::Any(a) => f.debug_tuple("Any").field(a).finish(),
        }
    }
}

impl PartialEq for Value {
    /// Lazy and opaque values compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            (Value::Lazy(a), Value::Lazy(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Value::Any(a), Value::Any(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(i64::from(n))
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Uint(u64::from(n))
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Uint(n as u64)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Time(t)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t.fixed_offset())
    }
}

impl From<SystemTime> for Value {
    fn from(t: SystemTime) -> Self {
        Value::Time(DateTime::<Utc>::from(t).fixed_offset())
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

// ── Attributes ────────────────────────────────────────────────────────────────

/// A key paired with a [`Value`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::Str(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    pub fn time(key: impl Into<String>, value: impl Into<DateTime<FixedOffset>>) -> Self {
        Self::new(key, Value::Time(value.into()))
    }

    /// A named group of child attributes.
    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(attrs))
    }

    pub fn lazy<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::new(key, Value::lazy(f))
    }

    pub fn any<T>(key: impl Into<String>, value: T) -> Self
    where
        T: fmt::Debug + fmt::Display + Send + Sync + 'static,
    {
        Self::new(key, Value::any(value))
    }

    /// Attributes with an empty key are never exported or matched.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

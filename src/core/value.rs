//! Attribute and value model for structured records
//!
//! This module provides:
//! - `Attr`: a key/value pair attached to a record
//! - `Value`: the typed value union, including groups and lazy values
//! - `LogValuer`: deferred values resolved only when a record is emitted

use super::error::LoggerError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Resolution steps one value may take before it is replaced by a sentinel
pub const RESOLVE_RECURSION_LIMIT: usize = 64;

/// A structured key/value pair
///
/// An empty key is never emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a group attribute holding nested attributes
    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(attrs))
    }

    /// Create an attribute from an arbitrary value, see [`Value::from_any`]
    pub fn any<T>(key: impl Into<String>, value: T) -> Self
    where
        T: Any + fmt::Debug + Send + Sync,
    {
        Self::new(key, Value::from_any(value))
    }

    /// Create an attribute whose value is computed at emission time
    pub fn lazy<L: LogValuer + 'static>(key: impl Into<String>, valuer: L) -> Self {
        Self::new(key, Value::Lazy(Arc::new(valuer)))
    }

    /// Create an attribute carrying an error
    ///
    /// Record handlers expand it into a `{msg, trace}` group using their
    /// error extractor.
    pub fn error<E>(key: impl Into<String>, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::new(key, Value::Any(Arc::new(ErrorValue(Box::new(err)))))
    }

    /// Create an attribute from any serializable value
    pub fn serialized<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        Self::new(key, Value::from_serialize(value))
    }
}

/// A value whose log representation is computed on demand
///
/// `log_value` may return another lazy value. Resolution follows the chain
/// up to [`RESOLVE_RECURSION_LIMIT`] steps.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;

    /// Name reported when resolution overflows
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// Opaque payload of [`Value::Any`]
pub trait AnyValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T> AnyValue for T
where
    T: Any + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Payload of attributes built with [`Attr::error`]
#[derive(Debug)]
pub struct ErrorValue(Box<dyn Error + Send + Sync>);

impl ErrorValue {
    pub fn get(&self) -> &(dyn Error + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Value type for structured attributes
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Float64(f64),
    String(String),
    Time(DateTime<Utc>),
    Duration(Duration),
    Group(Vec<Attr>),
    Any(Arc<dyn AnyValue>),
    Lazy(Arc<dyn LogValuer>),
}

impl Value {
    /// Convert an arbitrary value, mapping known primitives to their typed
    /// variant and wrapping everything else opaquely
    pub fn from_any<T>(value: T) -> Value
    where
        T: Any + fmt::Debug + Send + Sync,
    {
        let any = &value as &dyn Any;

        macro_rules! downcast_copy {
            ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Value::$variant(*v as $target);
                    }
                )*
            };
        }

        downcast_copy!(
            bool => Bool as bool,
            i8 => Int64 as i64,
            i16 => Int64 as i64,
            i32 => Int64 as i64,
            i64 => Int64 as i64,
            isize => Int64 as i64,
            u8 => Uint64 as u64,
            u16 => Uint64 as u64,
            u32 => Uint64 as u64,
            u64 => Uint64 as u64,
            usize => Uint64 as u64,
            f32 => Float64 as f64,
            f64 => Float64 as f64,
        );

        if let Some(s) = any.downcast_ref::<String>() {
            return Value::String(s.clone());
        }
        if let Some(s) = any.downcast_ref::<&'static str>() {
            return Value::String((*s).to_string());
        }
        if let Some(t) = any.downcast_ref::<DateTime<Utc>>() {
            return Value::Time(*t);
        }
        if let Some(d) = any.downcast_ref::<Duration>() {
            return Value::Duration(*d);
        }
        if let Some(v) = any.downcast_ref::<Value>() {
            return v.clone();
        }

        Value::Any(Arc::new(value))
    }

    /// Store a serializable value as an embedded JSON document
    ///
    /// Serialization failures are kept as the value so the record still
    /// carries a description of what went wrong.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Value {
        match serde_json::to_value(value) {
            Ok(json) => Value::Any(Arc::new(json)),
            Err(err) => Value::Any(Arc::new(LoggerError::from(err))),
        }
    }

    fn resolve_overflow(type_name: &str) -> Value {
        Value::Any(Arc::new(LoggerError::resolve_overflow(type_name)))
    }

    /// Resolve lazy values and group members
    ///
    /// One budget of [`RESOLVE_RECURSION_LIMIT`] steps covers the whole
    /// traversal: every lazy step and every group entered costs one. Once it
    /// is spent, whatever is still unresolved becomes a
    /// [`LoggerError::ResolveOverflow`] sentinel.
    pub fn resolve(self) -> Value {
        let mut budget = RESOLVE_RECURSION_LIMIT;
        self.resolve_within(&mut budget)
    }

    fn resolve_within(self, budget: &mut usize) -> Value {
        let mut origin: Option<&'static str> = None;
        let mut value = self;
        loop {
            match value {
                Value::Lazy(valuer) => {
                    let name = *origin.get_or_insert_with(|| valuer.type_name());
                    if *budget == 0 {
                        return Value::resolve_overflow(name);
                    }
                    *budget -= 1;
                    value = valuer.log_value();
                }
                Value::Group(attrs) => {
                    if *budget == 0 {
                        return Value::resolve_overflow(origin.unwrap_or("group"));
                    }
                    *budget -= 1;
                    return Value::Group(
                        attrs
                            .into_iter()
                            .map(|attr| Attr {
                                key: attr.key,
                                value: attr.value.resolve_within(budget),
                            })
                            .collect(),
                    );
                }
                other => return other,
            }
        }
    }

    /// Whether this value is the sentinel produced by a resolution overflow
    pub fn is_resolve_overflow(&self) -> bool {
        matches!(
            self.downcast_ref::<LoggerError>(),
            Some(LoggerError::ResolveOverflow { .. })
        )
    }

    /// Borrow the payload of an opaque value as a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Any(v) => (**v).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[Attr]> {
        match self {
            Value::Group(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Short name of the value kind
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int64(_) => "int64",
            Value::Uint64(_) => "uint64",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::Group(_) => "group",
            Value::Any(_) => "any",
            Value::Lazy(_) => "lazy",
        }
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int64(i) => write!(f, "Int64({})", i),
            Value::Uint64(u) => write!(f, "Uint64({})", u),
            Value::Float64(fl) => write!(f, "Float64({})", fl),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Time(t) => write!(f, "Time({})", format_time(t)),
            Value::Duration(d) => write!(f, "Duration({:?})", d),
            Value::Group(attrs) => f.debug_tuple("Group").field(attrs).finish(),
            Value::Any(v) => write!(f, "Any({:?})", v),
            Value::Lazy(l) => write!(f, "Lazy({})", l.type_name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Uint64(u) => write!(f, "{}", u),
            Value::Float64(fl) => write!(f, "{}", fl),
            Value::String(s) => f.write_str(s),
            Value::Time(t) => f.write_str(&format_time(t)),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Group(attrs) => {
                f.write_str("{")?;
                for (idx, attr) in attrs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("}")
            }
            Value::Any(v) => {
                let payload = (**v).as_any();
                if let Some(json) = payload.downcast_ref::<serde_json::Value>() {
                    write!(f, "{}", json)
                } else if let Some(err) = payload.downcast_ref::<LoggerError>() {
                    write!(f, "{}", err)
                } else if let Some(err) = payload.downcast_ref::<ErrorValue>() {
                    write!(f, "{}", err)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Value::Lazy(_) => write!(f, "{}", self.clone().resolve()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            (Value::Any(a), Value::Any(b)) => Arc::ptr_eq(a, b),
            (Value::Lazy(a), Value::Lazy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Uint64(u) => serializer.serialize_u64(*u),
            Value::Float64(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Time(t) => serializer.serialize_str(&format_time(t)),
            Value::Duration(d) => {
                serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            }
            Value::Group(attrs) => {
                let mut map = serializer.serialize_map(Some(attrs.len()))?;
                for attr in attrs {
                    map.serialize_entry(&attr.key, &attr.value)?;
                }
                map.end()
            }
            Value::Any(v) => {
                let payload = (**v).as_any();
                if let Some(json) = payload.downcast_ref::<serde_json::Value>() {
                    json.serialize(serializer)
                } else if let Some(err) = payload.downcast_ref::<LoggerError>() {
                    serializer.collect_str(err)
                } else if let Some(err) = payload.downcast_ref::<ErrorValue>() {
                    serializer.collect_str(err)
                } else {
                    serializer.collect_str(&format_args!("{:?}", v))
                }
            }
            Value::Lazy(_) => self.clone().resolve().serialize(serializer),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from_value!(
    i8 => Int64 as i64,
    i16 => Int64 as i64,
    i32 => Int64 as i64,
    i64 => Int64 as i64,
    isize => Int64 as i64,
    u8 => Uint64 as u64,
    u16 => Uint64 as u64,
    u32 => Uint64 as u64,
    u64 => Uint64 as u64,
    usize => Uint64 as u64,
    f32 => Float64 as f64,
    f64 => Float64 as f64,
);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

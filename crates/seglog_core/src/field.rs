//! Structured key/value fields.

use crate::error::{LogError, LogResult};
use serde::ser::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A field value.
///
/// The common scalar types convert with `From`. Anything else that is
/// `Debug` can be attached through [`Value::any`] and renders in its
/// `Debug` form.
#[derive(Clone, Debug)]
pub enum Value {
    /// A string.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// Any other value, rendered with `Debug`.
    Any(Arc<dyn fmt::Debug + Send + Sync>),
}

impl Value {
    /// Wraps an arbitrary `Debug` value.
    pub fn any<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Value::Any(Arc::new(value))
    }

    /// The string content, if this is a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Any(v) => write!(f, "{v:?}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Uint(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Any(v) => serializer.collect_str(&format_args!("{v:?}")),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(v: Cow<'_, str>) -> Self {
        Value::Str(v.into_owned())
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

macro_rules! impl_from_int {
    ($variant:ident($wide:ty): $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(<$wide>::from(v))
                }
            }
        )+
    };
}

impl_from_int!(Int(i64): i8, i16, i32, i64);
impl_from_int!(Uint(u64): u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

/// One key/value pair attached to a logger.
///
/// Keys need not be unique. Duplicates are kept and render in insertion
/// order.
#[derive(Clone, Debug)]
pub struct Field {
    /// The key.
    pub key: String,
    /// The value.
    pub value: Value,
}

impl Field {
    /// Creates a field.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Pairs up a flat `key, value, key, value, ...` list into fields.
///
/// # Errors
///
/// Returns [`LogError::InvalidKeyValues`] if the list has an odd length or
/// an item in key position is not a string.
pub fn from_key_values(key_values: impl IntoIterator<Item = Value>) -> LogResult<Vec<Field>> {
    let items: Vec<Value> = key_values.into_iter().collect();
    if items.len() % 2 != 0 {
        return Err(LogError::InvalidKeyValues(format!(
            "expected key/value pairs, got {} items",
            items.len()
        )));
    }

    let mut fields = Vec::with_capacity(items.len() / 2);
    let mut items = items.into_iter().enumerate();
    while let (Some((index, key)), Some((_, value))) = (items.next(), items.next()) {
        match key {
            Value::Str(key) => fields.push(Field { key, value }),
            other => {
                return Err(LogError::InvalidKeyValues(format!(
                    "item {index} is not a string key: {other}"
                )))
            }
        }
    }
    Ok(fields)
}

/// Builds a flat key/value list for [`crate::Logger::with`].
///
/// ```rust
/// use seglog_core::{kv, Value};
///
/// let items: Vec<Value> = kv!["user", "tom", "count", 3];
/// assert_eq!(items.len(), 4);
/// ```
#[macro_export]
macro_rules! kv {
    ($($item:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($item)),*]
    };
}

/// Builds a field list for [`crate::Logger::with_fields`].
///
/// ```rust
/// use seglog_core::fields;
///
/// let fields = fields! { "user" => "tom", "count" => 3 };
/// assert_eq!(fields[1].to_string(), "count=3");
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {
        ::std::vec![$($crate::Field::new($key, $value)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn scalar_values_render_plainly() {
        assert_eq!(Value::from("tom").to_string(), "tom");
        assert_eq!(Value::from(-3i8).to_string(), "-3");
        assert_eq!(Value::from(7usize).to_string(), "7");
        assert_eq!(Value::from(1.5f32).to_string(), "1.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from('x').to_string(), "x");
    }

    #[test]
    fn any_value_renders_debug() {
        let value = Value::any(Duration::from_millis(1500));
        assert_eq!(value.to_string(), "1.5s");
        assert_eq!(Value::any(vec![1, 2]).to_string(), "[1, 2]");
    }

    #[test]
    fn from_key_values_pairs_items() {
        let fields = from_key_values(crate::kv!["user", "tom", "count", 3]).unwrap();
        let rendered: Vec<String> = fields.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["user=tom", "count=3"]);
    }

    #[test]
    fn from_key_values_rejects_odd_length() {
        let err = from_key_values(crate::kv!["user", "tom", "count"]).unwrap_err();
        assert!(matches!(err, LogError::InvalidKeyValues(msg) if msg.contains("3 items")));
    }

    #[test]
    fn from_key_values_rejects_non_string_key() {
        let err = from_key_values(crate::kv!["a", 1, 2, "b"]).unwrap_err();
        assert!(matches!(err, LogError::InvalidKeyValues(msg) if msg.contains("item 2")));
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let fields = crate::fields! { "k" => 1, "k" => 2 };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].to_string(), "k=1");
        assert_eq!(fields[1].to_string(), "k=2");
    }

    #[test]
    fn values_serialize_natively() {
        let json = serde_json::to_string(&crate::kv!["s", 1u8, -2, 0.5, false]).unwrap();
        assert_eq!(json, r#"["s",1,-2,0.5,false]"#);
        let any = serde_json::to_string(&Value::any(Some(3))).unwrap();
        assert_eq!(any, r#""Some(3)""#);
    }
}

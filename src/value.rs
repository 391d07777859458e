//! Dynamic value representation for parsed LACON documents.
//!
//! A parse always produces a [`Value::Object`] at the root. Inside it, values
//! are booleans, numbers, strings (already escape-decoded), arrays and nested
//! objects. There is no null: the source format has no way to spell one.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use lacon::{parse_str, Value};
//!
//! let doc = parse_str("name \"Alice\"\nage 30\nadmin true").unwrap();
//! let obj = doc.as_object().unwrap();
//!
//! assert_eq!(obj.get("name").and_then(Value::as_str), Some("Alice"));
//! assert_eq!(obj.get("age").and_then(Value::as_i64), Some(30));
//! assert_eq!(obj.get("admin").and_then(Value::as_bool), Some(true));
//! ```

use crate::Map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed representation of any LACON value.
///
/// # Examples
///
/// ```rust
/// use lacon::{Number, Value};
///
/// let num = Value::Number(Number::Integer(42));
/// let text = Value::String("hello".to_string());
///
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

/// A numeric value: an integer, or a float with a fractional part.
///
/// Numbers written with a decimal point whose value is integral (such as
/// `2.0`) are stored as integers, matching how they render in JSON.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Parses the numeric literal grammar of the format: an optional `-`,
    /// digits, and an optional fractional part.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::Number;
    ///
    /// assert_eq!(Number::parse("42"), Some(Number::Integer(42)));
    /// assert_eq!(Number::parse("-1.5"), Some(Number::Float(-1.5)));
    /// assert_eq!(Number::parse("2.0"), Some(Number::Integer(2)));
    /// assert_eq!(Number::parse("1e5"), None);
    /// assert_eq!(Number::parse("1."), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Number> {
        let digits = text.strip_prefix('-').unwrap_or(text);
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits, None),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
            return None;
        }

        if frac_part.is_none() {
            if let Ok(i) = text.parse::<i64>() {
                return Some(Number::Integer(i));
            }
        }
        let f = text.parse::<f64>().ok()?;
        Some(Number::from_f64(f))
    }

    /// Builds a number from a float, folding integral values into integers.
    #[must_use]
    pub fn from_f64(f: f64) -> Number {
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Number::Integer(f as i64)
        } else {
            Number::Float(f)
        }
    }

    /// Returns `true` if this is an integer value.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    /// Returns `true` if this is a floating-point value.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it has no fractional part.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    /// Converts this number to an `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl Value {
    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is a number.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if the value is an object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integral number, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// If the value is a number, returns it as `f64`. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is an object, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Mutable counterpart of [`Value::as_object`].
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Follows a path of object keys from this value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::parse_str;
    ///
    /// let doc = parse_str("server > http > port 8080").unwrap();
    /// assert_eq!(doc.pointer(&["server", "http", "port"]).and_then(|v| v.as_i64()), Some(8080));
    /// ```
    #[must_use]
    pub fn pointer(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(self, |current, key| current.as_object()?.get(key))
    }

    /// Renders the value as plain text, the way it reads when concatenated
    /// into a string: strings as-is, numbers and booleans in their literal
    /// form, arrays comma-joined and objects as compact JSON.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(arr) => arr.iter().map(Value::to_text).collect::<Vec<_>>().join(","),
            Value::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any LACON value (null is not representable)")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                if value <= i64::MAX as u64 {
                    Ok(Value::Number(Number::Integer(value as i64)))
                } else {
                    Ok(Value::Number(Number::Float(value as f64)))
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from_f64(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = Map::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::custom(format!("expected integer, found {:?}", value)))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::custom(format!("expected number, found {:?}", value)))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom(format!(
                "expected bool, found {:?}",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {:?}",
                value
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::from_f64(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_parse_grammar() {
        assert_eq!(Number::parse("0"), Some(Number::Integer(0)));
        assert_eq!(Number::parse("-17"), Some(Number::Integer(-17)));
        assert_eq!(Number::parse("3.25"), Some(Number::Float(3.25)));
        assert_eq!(Number::parse("10.00"), Some(Number::Integer(10)));
        assert_eq!(Number::parse(""), None);
        assert_eq!(Number::parse("-"), None);
        assert_eq!(Number::parse(".5"), None);
        assert_eq!(Number::parse("1.2.3"), None);
        assert_eq!(Number::parse("0x10"), None);
        assert_eq!(Number::parse("+1"), None);
    }

    #[test]
    fn test_number_parse_overflow_becomes_float() {
        let n = Number::parse("99999999999999999999").unwrap();
        assert!(n.is_float());
    }

    #[test]
    fn test_tryfrom_conversions() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert_eq!(f64::try_from(Value::from(42)).unwrap(), 42.0);
        assert!(bool::try_from(Value::from(true)).unwrap());
        assert_eq!(String::try_from(Value::from("x")).unwrap(), "x");
        assert!(i64::try_from(Value::from("x")).is_err());
        assert!(String::try_from(Value::from(1)).is_err());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::from(1).to_text(), "1");
        assert_eq!(Value::from(1.5).to_text(), "1.5");
        assert_eq!(Value::from(false).to_text(), "false");
        assert_eq!(
            Value::Array(vec![Value::from(1), Value::from("a")]).to_text(),
            "1,a"
        );
    }

    #[test]
    fn test_serialize_keeps_key_order() {
        let mut map = Map::new();
        map.insert("z".to_string(), Value::from(1));
        map.insert("a".to_string(), Value::from(2));
        let json = serde_json::to_string(&Value::Object(map)).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_deserialize_from_json() {
        let value: Value = serde_json::from_str(r#"{"a":[1,2.5,"x",true]}"#).unwrap();
        assert_eq!(
            value.pointer(&["a"]).and_then(Value::as_array).map(Vec::len),
            Some(4)
        );
        assert!(serde_json::from_str::<Value>("null").is_err());
    }
}

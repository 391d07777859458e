//! Writing values back out as LACON source.
//!
//! Two pieces live here:
//!
//! - [`ValueSerializer`] turns any `T: Serialize` into a [`Value`] tree.
//! - [`write_document`] renders an object tree as source text that parses
//!   back to the same tree.
//!
//! Strings are always quoted and escaped, arrays and objects nested inside
//! arrays are written inline, and objects become `key {` ... `}` blocks in
//! pretty mode or inline `{k=v ...}` values in compact mode.
//!
//! ```rust
//! use lacon::{lacon, parse_str, to_string};
//!
//! let value = lacon!({
//!     "name": "demo",
//!     "server": { "port": 8080, "hosts": ["a", "b"] }
//! });
//!
//! let text = to_string(&value).unwrap();
//! assert_eq!(text, "name \"demo\"\nserver {\n  port 8080\n  hosts [\"a\", \"b\"]\n}");
//! assert_eq!(parse_str(&text).unwrap(), value);
//! ```
//!
//! `null` has no source form: `None` and unit values are rejected with
//! [`Error::UnsupportedValue`]. Use `#[serde(skip_serializing_if = "Option::is_none")]`
//! on optional fields.

use crate::escape::escape;
use crate::vars::is_name_char;
use crate::{Error, Map, Number, Options, Result, Value};
use serde::{ser, Serialize};

/// Serializer producing a [`Value`] tree.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: Map,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

/// Wraps `value` as `{ variant: value }`, the externally tagged enum form.
fn tagged(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = Map::with_capacity(1);
            map.insert(name.to_string(), value);
            Value::Object(map)
        }
        None => value,
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v as i64)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v as i64)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v as i64)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v as i64)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v as i64)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v as i64)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        if v <= i64::MAX as u64 {
            Ok(Value::Number(Number::Integer(v as i64)))
        } else {
            Ok(Value::Number(Number::Float(v as f64)))
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        if v.is_finite() {
            Ok(Value::Number(Number::from_f64(v)))
        } else {
            Err(Error::unsupported_value("non-finite numbers"))
        }
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let vec = v
            .iter()
            .map(|&b| Value::Number(Number::Integer(b as i64)))
            .collect();
        Ok(Value::Array(vec))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(Error::unsupported_value("None"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(Error::unsupported_value("()"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(Error::unsupported_value(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(Some(variant), to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        Ok(tagged(self.variant, Value::Array(self.vec)))
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Map::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Result<Value> {
        Ok(tagged(self.variant, Value::Object(self.map)))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            Value::Number(n) => {
                self.current_key = Some(n.to_string());
                Ok(())
            }
            _ => Err(Error::custom("Map keys must be strings")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

/// Converts any serializable value into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use lacon::{lacon, to_value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_value(&Point { x: 1, y: 2 }).unwrap(), lacon!({ "x": 1, "y": 2 }));
/// assert!(to_value(&None::<i32>).is_err());
/// ```
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Renders an object tree as LACON source.
///
/// Fails with [`Error::UnsupportedValue`] when `value` is not an object and
/// with [`Error::UnsupportedKey`] when a key is not a plain key token.
pub fn write_document(value: &Value, options: &Options) -> Result<String> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::unsupported_value("documents must be objects"))?;
    let mut lines = Vec::new();
    write_entries(&mut lines, map, options, 0)?;
    Ok(lines.join("\n"))
}

fn check_key(key: &str) -> Result<&str> {
    if !key.is_empty() && key.chars().all(is_name_char) {
        Ok(key)
    } else {
        Err(Error::unsupported_key(key))
    }
}

fn write_entries(lines: &mut Vec<String>, map: &Map, options: &Options, level: usize) -> Result<()> {
    let pad = options.indent_str().repeat(level);
    for (key, value) in map {
        let key = check_key(key)?;
        match value {
            Value::Object(obj) if options.pretty && !obj.is_empty() => {
                lines.push(format!("{}{} {{", pad, key));
                write_entries(lines, obj, options, level + 1)?;
                lines.push(format!("{}}}", pad));
            }
            _ => {
                let mut out = String::new();
                write_inline(&mut out, value)?;
                lines.push(format!("{}{} {}", pad, key, out));
            }
        }
    }
    Ok(())
}

fn write_inline(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(Number::Float(f)) if !f.is_finite() => {
            return Err(Error::unsupported_value("non-finite numbers"));
        }
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape(s));
            out.push('"');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(check_key(key)?);
                out.push('=');
                write_inline(out, item)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lacon, parse_str};

    #[test]
    fn test_compact_writes_objects_inline() {
        let value = lacon!({ "a": { "b": 1, "c": { "d": [true, "x"] } } });
        let text = write_document(&value, &Options::compact()).unwrap();
        assert_eq!(text, "a {b=1 c={d=[true, \"x\"]}}");
        assert_eq!(parse_str(&text).unwrap(), value);
    }

    #[test]
    fn test_empty_containers() {
        let value = lacon!({ "o": {}, "a": [], "s": "" });
        let text = write_document(&value, &Options::new()).unwrap();
        assert_eq!(text, "o {}\na []\ns \"\"");
        assert_eq!(parse_str(&text).unwrap(), value);
    }

    #[test]
    fn test_special_text_survives() {
        let value = lacon!({ "s": "$HOME @f({}, 1) <emit: 0 to +2>x \"q\" // not a comment \\" });
        let text = write_document(&value, &Options::new()).unwrap();
        assert_eq!(parse_str(&text).unwrap(), value);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let value = lacon!({ "has space": 1 });
        assert!(matches!(
            write_document(&value, &Options::new()),
            Err(Error::UnsupportedKey(_))
        ));
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(matches!(
            write_document(&lacon!([1, 2]), &Options::new()),
            Err(Error::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_enum_variants_tagged() {
        #[derive(Serialize)]
        enum E {
            Unit,
            New(i32),
            Tuple(i32, i32),
            Struct { a: i32 },
        }
        assert_eq!(to_value(&E::Unit).unwrap(), lacon!("Unit"));
        assert_eq!(to_value(&E::New(1)).unwrap(), lacon!({ "New": 1 }));
        assert_eq!(to_value(&E::Tuple(1, 2)).unwrap(), lacon!({ "Tuple": [1, 2] }));
        assert_eq!(to_value(&E::Struct { a: 1 }).unwrap(), lacon!({ "Struct": { "a": 1 } }));
    }

    #[test]
    fn test_indent_option() {
        let value = lacon!({ "a": { "b": 1 } });
        let text = write_document(&value, &Options::new().with_indent(4)).unwrap();
        assert_eq!(text, "a {\n    b 1\n}");
    }
}

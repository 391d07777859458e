//! Typed extraction from parsed documents.
//!
//! Parsing always produces a [`Value`] tree first; this module feeds that
//! tree to any `T: Deserialize`.
//!
//! ```rust
//! use lacon::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server { host: String, port: u16, tags: Vec<String> }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config { server: Server, debug: bool }
//!
//! let text = "debug\nserver\n  host localhost\n  port 8080\n  tags [a, b]";
//! let config: Config = from_str(text).unwrap();
//! assert_eq!(config.server.port, 8080);
//! assert!(config.debug);
//! ```
//!
//! Scalars are matched leniently where the source format cannot tell the
//! difference: a `String` field accepts a number or boolean (`version 2`),
//! and `Option` fields are `Some` whenever the key is present.

use crate::{Error, Map, Number, Result, Value};
use serde::de::{self, DeserializeOwned};
use serde::forward_to_deserialize_any;

/// Deserializes a `T` out of a [`Value`].
///
/// # Examples
///
/// ```rust
/// use lacon::{from_value, lacon};
/// use std::collections::HashMap;
///
/// let value = lacon!({ "a": 1, "b": 2 });
/// let map: HashMap<String, i32> = from_value(value).unwrap();
/// assert_eq!(map["b"], 2);
/// ```
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: Map) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Bool(true)) => Ok(()),
            _ => Err(Error::custom("Expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj)),
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}

pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Number(n) => visitor.visit_string(n.to_string()),
            Value::Bool(b) => visitor.visit_string(b.to_string()),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Object(obj) if obj.len() == 1 => {
                let (variant, value) = obj
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::custom("Expected enum variant"))?;
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                })
            }
            _ => Err(Error::custom("Expected enum")),
        }
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_value("unit values have no LACON form"))
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf seq tuple tuple_struct map struct identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lacon;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    enum Mode {
        Fast,
        Limited(u32),
        Window { w: u32, h: u32 },
    }

    #[test]
    fn test_enum_forms() {
        assert_eq!(from_value::<Mode>(lacon!("Fast")).unwrap(), Mode::Fast);
        assert_eq!(
            from_value::<Mode>(lacon!({ "Limited": 5 })).unwrap(),
            Mode::Limited(5)
        );
        assert_eq!(
            from_value::<Mode>(lacon!({ "Window": { "w": 2, "h": 3 } })).unwrap(),
            Mode::Window { w: 2, h: 3 }
        );
        assert!(from_value::<Mode>(lacon!(1)).is_err());
    }

    #[test]
    fn test_lenient_strings() {
        let v: Vec<String> = from_value(lacon!([1, true, "x"])).unwrap();
        assert_eq!(v, vec!["1", "true", "x"]);
    }

    #[test]
    fn test_option_and_defaults() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Opt {
            a: Option<i32>,
            b: Option<i32>,
        }
        let o: Opt = from_value(lacon!({ "a": 1 })).unwrap();
        assert_eq!(o, Opt { a: Some(1), b: None });
    }

    #[test]
    fn test_type_mismatch_errors() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Port {
            port: u16,
        }
        assert!(from_value::<Port>(lacon!({ "port": "http" })).is_err());
        assert!(from_value::<Port>(lacon!({ "port": 70000 })).is_err());
    }
}

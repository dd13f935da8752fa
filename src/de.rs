//! Deserialization of a merged [`Value`] tree into caller structures.
//!
//! This is the structure-population half of the coercion layer: `unmarshal`
//! resolves every known key through the precedence chain into one tree, and
//! this deserializer turns that tree into any `serde::Deserialize` target.
//! Scalars coerce on the way through (string to int/bool/float, any scalar
//! to string, string to sequence via the CSV rule), mirroring the typed
//! accessors. Tree keys are already normalized, and `serde` field names are
//! lower-case by convention, so field matching is case-insensitive by
//! construction.

use core::fmt;

use serde::de::{
    self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};

use crate::coerce;
use crate::value::Value;

/// Error produced while decoding a [`Value`] tree into a target structure.
#[derive(Debug)]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DecodeError {}

impl de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DecodeError::new(msg.to_string())
    }
}

/// Deserialize a value tree into `T`.
pub(crate) fn from_value<T>(value: Value) -> Result<T, DecodeError>
where
    T: de::DeserializeOwned,
{
    T::deserialize(value)
}

impl Value {
    fn mismatch(&self, expected: &str) -> DecodeError {
        DecodeError::new(format!(
            "invalid type: expected {expected}, found {} '{self}'",
            self.kind()
        ))
    }
}

macro_rules! deserialize_integer {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, DecodeError>
            where
                V: Visitor<'de>,
            {
                let n = coerce::to_i64(&self).ok_or_else(|| self.mismatch("an integer"))?;
                visitor.visit_i64(n)
            }
        )*
    };
}

macro_rules! deserialize_float {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, DecodeError>
            where
                V: Visitor<'de>,
            {
                let x = coerce::to_f64(&self).ok_or_else(|| self.mismatch("a float"))?;
                visitor.visit_f64(x)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Value {
    type Error = DecodeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(n) => visitor.visit_i64(n),
            Value::Float(x) => visitor.visit_f64(x),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer {
                iter: items.into_iter(),
            }),
            Value::Table(table) => visitor.visit_map(MapDeserializer {
                iter: table.into_iter(),
                value: None,
            }),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        let b = coerce::to_bool(&self).ok_or_else(|| self.mismatch("a boolean"))?;
        visitor.visit_bool(b)
    }

    deserialize_integer! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
    }

    deserialize_float! {
        deserialize_f32 deserialize_f64
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        let s = coerce::to_string(&self).ok_or_else(|| self.mismatch("a character"))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(self.mismatch("a single character")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        let s = coerce::to_string(&self).ok_or_else(|| self.mismatch("a string"))?;
        visitor.visit_string(s)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        // Absent keys never reach the deserializer, so a present value is
        // always Some.
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Array(items) => visitor.visit_seq(SeqDeserializer {
                iter: items.into_iter(),
            }),
            Value::String(s) => {
                let items: Vec<Value> = coerce::parse_csv_line(&s)
                    .into_iter()
                    .map(Value::String)
                    .collect();
                visitor.visit_seq(SeqDeserializer {
                    iter: items.into_iter(),
                })
            }
            other => Err(other.mismatch("a sequence")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Table(table) => visitor.visit_map(MapDeserializer {
                iter: table.into_iter(),
                value: None,
            }),
            other => Err(other.mismatch("a table")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Table(table) if table.len() == 1 => {
                if let Some((variant, value)) = table.into_iter().next() {
                    visitor.visit_enum(EnumDeserializer {
                        variant,
                        value: Some(value),
                    })
                } else {
                    Err(DecodeError::new("empty table cannot be an enum"))
                }
            }
            other => Err(other.mismatch("an enum (string or single-entry table)")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = DecodeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, DecodeError>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = DecodeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, DecodeError>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, DecodeError>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| DecodeError::new("value requested before key"))?;
        seed.deserialize(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = DecodeError;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantDeserializer), DecodeError>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), DecodeError> {
        match self.value {
            None => Ok(()),
            Some(value) => Err(value.mismatch("a unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, DecodeError>
    where
        T: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .ok_or_else(|| DecodeError::new("newtype variant is missing its value"))?;
        seed.deserialize(value)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        let value = self
            .value
            .ok_or_else(|| DecodeError::new("tuple variant is missing its value"))?;
        de::Deserializer::deserialize_seq(value, visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError>
    where
        V: Visitor<'de>,
    {
        let value = self
            .value
            .ok_or_else(|| DecodeError::new("struct variant is missing its value"))?;
        de::Deserializer::deserialize_map(value, visitor)
    }
}

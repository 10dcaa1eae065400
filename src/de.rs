//! Serde-based conversion from [`crate::types::BoltType`] into user-defined structs.
//!
//! This complements the `TryFrom<BoltType>` conversions in `convert.rs`: those are for
//! scalar/collection values fetched one field at a time via [`crate::row::Row::get`], while
//! this module lets a whole row (or a whole node/map) be deserialized into a `#[derive(Deserialize)]`
//! struct in one call via [`crate::row::Row::to`].

use crate::types::{BoltMap, BoltType};
use serde::de::{
    self,
    value::{MapDeserializer, SeqDeserializer},
    Deserialize, IntoDeserializer, Visitor,
};
use std::fmt;

/// Error produced while deserializing a [`BoltType`] into a Rust value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeError {
    #[error("invalid type: found {found}, expected {expected}")]
    InvalidType { found: &'static str, expected: String },

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown field `{field}`, expected one of {expected:?}")]
    UnknownField {
        field: String,
        expected: &'static [&'static str],
    },

    #[error("duplicate field `{0}`")]
    DuplicateField(&'static str),

    #[error("unknown variant `{variant}`, expected one of {expected:?}")]
    UnknownVariant {
        variant: String,
        expected: &'static [&'static str],
    },

    #[error("{0}")]
    Custom(String),
}

impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeError::Custom(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        DeError::MissingField(field)
    }

    fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
        DeError::UnknownField {
            field: field.to_owned(),
            expected,
        }
    }

    fn duplicate_field(field: &'static str) -> Self {
        DeError::DuplicateField(field)
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        DeError::UnknownVariant {
            variant: variant.to_owned(),
            expected,
        }
    }
}

fn kind_name(value: &BoltType) -> &'static str {
    match value {
        BoltType::String(_) => "string",
        BoltType::Boolean(_) => "boolean",
        BoltType::Map(_) => "map",
        BoltType::Null(_) => "null",
        BoltType::Integer(_) => "integer",
        BoltType::Float(_) => "float",
        BoltType::List(_) => "list",
        BoltType::Node(_) => "node",
        BoltType::Relation(_) => "relationship",
        BoltType::UnboundedRelation(_) => "unbounded relationship",
        BoltType::Point2D(_) => "point2d",
        BoltType::Point3D(_) => "point3d",
        BoltType::Bytes(_) => "bytes",
        BoltType::Path(_) => "path",
        BoltType::Duration(_) => "duration",
        BoltType::Date(_) => "date",
        BoltType::Time(_) => "time",
        BoltType::LocalTime(_) => "local time",
        BoltType::DateTime(_) => "date-time",
        BoltType::LocalDateTime(_) => "local date-time",
        BoltType::DateTimeZoneId(_) => "date-time with zone id",
    }
}

/// Deserializer over a borrowed [`BoltType`]. Obtained via [`BoltType::to`] or
/// [`BoltMap::to`], never constructed directly by callers.
pub struct BoltTypeDeserializer<'de>(&'de BoltType);

impl<'de> de::Deserializer<'de> for BoltTypeDeserializer<'de> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.0 {
            BoltType::Null(_) => visitor.visit_unit(),
            BoltType::Boolean(b) => visitor.visit_bool(b.value),
            BoltType::Integer(i) => visitor.visit_i64(i.value),
            BoltType::Float(f) => visitor.visit_f64(f.value),
            BoltType::String(s) => visitor.visit_str(&s.value),
            BoltType::Bytes(b) => visitor.visit_bytes(&b.value),
            BoltType::List(l) => visitor.visit_seq(SeqDeserializer::new(
                l.value.iter().map(BoltTypeDeserializer),
            )),
            BoltType::Map(m) => visitor.visit_map(map_deserializer(m)),
            other => Err(DeError::InvalidType {
                found: kind_name(other),
                expected: "a primitive, list or map".to_owned(),
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.0 {
            BoltType::Null(_) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        match self.0 {
            BoltType::Map(m) => visitor.visit_map(map_deserializer(m)),
            BoltType::Node(n) => visitor.visit_map(MapDeserializer::new(
                n.properties
                    .value
                    .iter()
                    .map(|(k, v)| (k.value.as_str(), BoltTypeDeserializer(v))),
            )),
            BoltType::Relation(r) => visitor.visit_map(MapDeserializer::new(
                r.properties
                    .value
                    .iter()
                    .map(|(k, v)| (k.value.as_str(), BoltTypeDeserializer(v))),
            )),
            BoltType::UnboundedRelation(r) => visitor.visit_map(MapDeserializer::new(
                r.properties
                    .value
                    .iter()
                    .map(|(k, v)| (k.value.as_str(), BoltTypeDeserializer(v))),
            )),
            other => Err(DeError::InvalidType {
                found: kind_name(other),
                expected: "a map-like structure".to_owned(),
            }),
        }
    }

    fn is_human_readable(&self) -> bool {
        false
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

fn map_deserializer(
    m: &BoltMap,
) -> MapDeserializer<'_, impl Iterator<Item = (&str, BoltTypeDeserializer<'_>)>, DeError> {
    MapDeserializer::new(
        m.value
            .iter()
            .map(|(k, v)| (k.value.as_str(), BoltTypeDeserializer(v))),
    )
}

impl<'de> IntoDeserializer<'de, DeError> for &'de BoltType {
    type Deserializer = BoltTypeDeserializer<'de>;

    fn into_deserializer(self) -> Self::Deserializer {
        BoltTypeDeserializer(self)
    }
}

impl BoltType {
    /// Deserializes this value into `T` using `serde`.
    pub fn to<'de, T: Deserialize<'de>>(&'de self) -> Result<T, DeError> {
        T::deserialize(BoltTypeDeserializer(self))
    }
}

impl BoltMap {
    /// Deserializes this map's entries into `T` using `serde`, treating each key as a field name.
    pub fn to<'de, T: Deserialize<'de>>(&'de self) -> Result<T, DeError> {
        T::deserialize(map_deserializer(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoltFloat, BoltInteger, BoltString};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: i64,
    }

    #[test]
    fn deserializes_struct_from_map() {
        let mut map = BoltMap::default();
        map.put(BoltString::new("name"), BoltType::String(BoltString::new("Alice")));
        map.put(BoltString::new("age"), BoltType::Integer(BoltInteger::new(30)));

        let person: Person = map.to().unwrap();
        assert_eq!(
            person,
            Person {
                name: "Alice".to_owned(),
                age: 30,
            }
        );
    }

    #[test]
    fn deserializes_scalar() {
        let value = BoltType::Float(BoltFloat::new(1.5));
        let f: f64 = value.to().unwrap();
        assert_eq!(f, 1.5);
    }

    #[test]
    fn missing_field_is_an_error() {
        let map = BoltMap::default();
        let result: Result<Person, _> = map.to();
        assert!(result.is_err());
    }
}

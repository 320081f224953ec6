//! The in-memory representation of a decoded object graph.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::packed::Packed;

/// One node of an object graph.
///
/// `Hash` entries are kept as an ordered pair list rather than a map so that
/// the wire order survives a round trip. Use [`Value::hash_from_pairs`] when
/// building a hash from possibly-duplicated keys.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value
    Nil,
    /// A boolean
    Bool(bool),
    /// A signed integer
    Integer(i64),
    /// A double-precision float
    Float(f64),
    /// An uninterpreted byte string
    Bytes(Vec<u8>),
    /// A UTF-8 string
    String(String),
    /// An interned name
    Symbol(String),
    /// An ordered sequence
    Array(Vec<Value>),
    /// An ordered key/value mapping
    Hash(Vec<(Value, Value)>),
    /// A class-tagged object
    Object {
        /// The class name the object was tagged with
        class: String,
        /// The object's payload, shaped by its class
        payload: Payload,
    },
}

/// Payload of a class-tagged object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A fixed-layout packed record from the closed catalog
    Packed(Packed),
    /// An ordered attribute map, valid for any class name
    Attributes(Vec<(String, Value)>),
}

impl Value {
    /// Build a hash from wire pairs, deduplicating keys.
    ///
    /// The first occurrence of a key keeps its position, the last occurrence
    /// keeps its value.
    pub fn hash_from_pairs(pairs: Vec<(Value, Value)>) -> Value {
        let mut map: IndexMap<Value, Value> = IndexMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            map.insert(key, value);
        }
        Value::Hash(map.into_iter().collect())
    }

    /// Shorthand for an attribute-map object.
    pub fn object(class: impl Into<String>, attributes: Vec<(String, Value)>) -> Value {
        Value::Object {
            class: class.into(),
            payload: Payload::Attributes(attributes),
        }
    }

    /// Shorthand for a packed object, using the catalog class name.
    pub fn packed(packed: Packed) -> Value {
        Value::Object {
            class: packed.class_name().to_owned(),
            payload: Payload::Packed(packed),
        }
    }

    /// The value of an attribute, if this is an attribute-map object.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object {
                payload: Payload::Attributes(attributes),
                ..
            } => attributes
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Whether this value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The contained integer, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The contained string, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The contained byte string, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The contained array elements, if any.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

// Floats compare and hash by bit pattern so that `Value` can be used as an
// `IndexMap` key. Wire data never depends on `NaN == NaN` semantics.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (
                Value::Object {
                    class: ca,
                    payload: pa,
                },
                Value::Object {
                    class: cb,
                    payload: pb,
                },
            ) => ca == cb && pa == pb,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            Value::Symbol(s) => s.hash(state),
            Value::Array(elements) => elements.hash(state),
            Value::Hash(pairs) => pairs.hash(state),
            Value::Object { class, payload } => {
                class.hash(state);
                // Attribute names are enough to distinguish objects here.
                match payload {
                    Payload::Packed(packed) => packed.class_name().hash(state),
                    Payload::Attributes(attributes) => {
                        for (name, _) in attributes {
                            name.hash(state);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Value;

    #[test]
    fn hash_from_pairs_deduplicates_keys() {
        let hash = Value::hash_from_pairs(vec![
            (Value::Integer(1), Value::String("a".into())),
            (Value::Integer(2), Value::String("b".into())),
            (Value::Integer(1), Value::String("c".into())),
        ]);

        assert_eq!(
            hash,
            Value::Hash(vec![
                (Value::Integer(1), Value::String("c".into())),
                (Value::Integer(2), Value::String("b".into())),
            ])
        );
    }

    #[test]
    fn attribute_lookup() {
        let object = Value::object(
            "RPG::Actor",
            vec![
                ("id".into(), Value::Integer(1)),
                ("name".into(), Value::String("Ralph".into())),
            ],
        );

        assert_eq!(object.attribute("id"), Some(&Value::Integer(1)));
        assert_eq!(object.attribute("nickname"), None);
    }
}

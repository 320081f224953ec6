//! Types for writing object-graph streams

use std::io::Write;

use bon::Builder;
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::instrument;

use crate::error::Result;
use crate::read::VERSION;
use crate::value::{Payload, Value};

/// Options for how the object graph should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct WriterOptions {
    /// Emit object attributes sorted lexically by name.
    ///
    /// Sorting keeps re-encodes of unchanged data byte-identical regardless
    /// of how the in-memory attribute list was built. Turn this off to
    /// preserve the stored attribute order instead.
    #[builder(default = true)]
    pub sort_attributes: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions::builder().build()
    }
}

/// Write a complete object graph to `writer`.
///
/// ```
/// use rgss_marshal::{write_value, Value, WriterOptions};
///
/// let mut out = Vec::new();
/// write_value(&mut out, &Value::Nil, WriterOptions::default()).unwrap();
/// assert_eq!(out, [0x04, 0x08, b'0']);
/// ```
#[instrument(skip(writer, value), err)]
pub fn write_value<W: Write>(writer: &mut W, value: &Value, options: WriterOptions) -> Result<()> {
    writer.write_all(&VERSION)?;
    write_node(writer, value, options)
}

/// Encode a complete object graph into a byte vector.
pub fn to_bytes(value: &Value, options: WriterOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_value(&mut out, value, options)?;
    Ok(out)
}

fn write_node<W: Write>(writer: &mut W, value: &Value, options: WriterOptions) -> Result<()> {
    match value {
        Value::Nil => writer.write_u8(b'0')?,
        Value::Bool(true) => writer.write_u8(b'T')?,
        Value::Bool(false) => writer.write_u8(b'F')?,
        Value::Integer(i) => {
            writer.write_u8(b'i')?;
            writer.write_i64::<LittleEndian>(*i)?;
        }
        Value::Float(f) => {
            writer.write_u8(b'f')?;
            writer.write_f64::<LittleEndian>(*f)?;
        }
        Value::String(s) => {
            writer.write_u8(b'"')?;
            write_sized(writer, s.as_bytes())?;
        }
        Value::Bytes(b) => {
            writer.write_u8(b'b')?;
            write_sized(writer, b)?;
        }
        Value::Symbol(s) => {
            writer.write_u8(b':')?;
            write_sized(writer, s.as_bytes())?;
        }
        Value::Array(elements) => {
            writer.write_u8(b'[')?;
            writer.write_u32::<LittleEndian>(elements.len() as u32)?;
            for element in elements {
                write_node(writer, element, options)?;
            }
        }
        Value::Hash(pairs) => {
            writer.write_u8(b'{')?;
            writer.write_u32::<LittleEndian>(pairs.len() as u32)?;
            for (key, val) in pairs {
                write_node(writer, key, options)?;
                write_node(writer, val, options)?;
            }
        }
        Value::Object { class, payload } => match payload {
            Payload::Packed(packed) => {
                writer.write_u8(b'u')?;
                write_sized(writer, class.as_bytes())?;
                write_sized(writer, &packed.to_payload()?)?;
            }
            Payload::Attributes(attributes) => {
                writer.write_u8(b'o')?;
                write_sized(writer, class.as_bytes())?;
                writer.write_u32::<LittleEndian>(attributes.len() as u32)?;

                if options.sort_attributes {
                    let mut ordered: Vec<&(String, Value)> = attributes.iter().collect();
                    ordered.sort_by(|a, b| a.0.cmp(&b.0));
                    for (name, val) in ordered {
                        write_sized(writer, name.as_bytes())?;
                        write_node(writer, val, options)?;
                    }
                } else {
                    for (name, val) in attributes {
                        write_sized(writer, name.as_bytes())?;
                        write_node(writer, val, options)?;
                    }
                }
            }
        },
    }
    Ok(())
}

fn write_sized<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_u32::<LittleEndian>(bytes.len() as u32)?;
    writer.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{to_bytes, WriterOptions};
    use crate::error::Result;
    use crate::packed::{Packed, Table};
    use crate::read::from_bytes;
    use crate::value::Value;

    #[traced_test]
    #[test]
    fn write_scalars() -> Result<()> {
        let options = WriterOptions::default();
        assert_eq!(to_bytes(&Value::Nil, options)?, [0x04, 0x08, b'0']);
        assert_eq!(to_bytes(&Value::Bool(true), options)?, [0x04, 0x08, b'T']);

        #[rustfmt::skip]
        let expected = vec![
            0x04, 0x08,
            b'i', 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(to_bytes(&Value::Integer(42), options)?, expected);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn attributes_are_sorted_by_default() -> Result<()> {
        let object = Value::object(
            "A",
            vec![
                ("name".into(), Value::Nil),
                ("id".into(), Value::Nil),
            ],
        );

        #[rustfmt::skip]
        let expected = vec![
            0x04, 0x08,
            b'o',
            0x01, 0x00, 0x00, 0x00, b'A',
            0x02, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, b'i', b'd',
            b'0',
            0x04, 0x00, 0x00, 0x00, b'n', b'a', b'm', b'e',
            b'0',
        ];
        assert_eq!(to_bytes(&object, WriterOptions::default())?, expected);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn stored_order_is_kept_when_sorting_is_off() -> Result<()> {
        let object = Value::object(
            "A",
            vec![
                ("name".into(), Value::Nil),
                ("id".into(), Value::Nil),
            ],
        );

        let options = WriterOptions::builder().sort_attributes(false).build();
        let bytes = to_bytes(&object, options)?;
        let decoded = from_bytes(&bytes)?;
        assert_eq!(decoded, object);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn graph_roundtrip() -> Result<()> {
        let table = Table::from_parts(2, 2, 2, 1, vec![1, 2, 3, 4])?;
        let value = Value::Array(vec![
            Value::Nil,
            // Attributes already lexically sorted; the default writer sorts
            // on encode and the reader keeps stored order.
            Value::object(
                "RPG::Actor",
                vec![
                    ("id".into(), Value::Integer(1)),
                    (
                        "lookup".into(),
                        Value::Hash(vec![(Value::Symbol("hp".into()), Value::Integer(520))]),
                    ),
                    ("name".into(), Value::String("Ralph".into())),
                    ("weights".into(), Value::Array(vec![Value::Float(0.5)])),
                ],
            ),
            Value::packed(Packed::Table(table)),
            Value::Bytes(vec![0x00, 0xFF, 0x10]),
        ]);

        let bytes = to_bytes(&value, WriterOptions::default())?;
        assert_eq!(from_bytes(&bytes)?, value);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn reencode_is_byte_identical() -> Result<()> {
        let value = Value::object(
            "RPG::Item",
            vec![
                ("price".into(), Value::Integer(100)),
                ("id".into(), Value::Integer(3)),
            ],
        );

        let first = to_bytes(&value, WriterOptions::default())?;
        let reread = from_bytes(&first)?;
        let second = to_bytes(&reread, WriterOptions::default())?;
        assert_eq!(first, second);
        Ok(())
    }
}

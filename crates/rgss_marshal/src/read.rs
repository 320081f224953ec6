//! Types for reading object-graph streams

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::trace;

use crate::catalog;
use crate::error::{Error, Result};
use crate::packed::Packed;
use crate::value::{Payload, Value};

/// Version header every data file starts with.
pub(crate) const VERSION: [u8; 2] = [0x04, 0x08];

/// Read a complete object graph from `reader`.
///
/// ```
/// use rgss_marshal::{read_value, Value};
///
/// let bytes = [0x04, 0x08, b'i', 7, 0, 0, 0, 0, 0, 0, 0];
/// let value = read_value(&mut bytes.as_slice()).unwrap();
/// assert_eq!(value, Value::Integer(7));
/// ```
pub fn read_value<R: Read>(reader: &mut R) -> Result<Value> {
    let mut reader = ValueReader::new(reader);
    reader.read_header()?;
    reader.read_value()
}

/// Decode a complete object graph from a byte slice.
pub fn from_bytes(bytes: &[u8]) -> Result<Value> {
    read_value(&mut &bytes[..])
}

/// A tag-stream decoder that tracks its byte offset for error reporting.
struct ValueReader<'a, R: Read> {
    inner: &'a mut R,
    offset: u64,
}

impl<'a, R: Read> ValueReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        ValueReader { inner, offset: 0 }
    }

    fn read_header(&mut self) -> Result<()> {
        let mut header = [0u8; 2];
        self.read_exact(&mut header)?;
        if header != VERSION {
            return Err(Error::decode(
                0,
                format!("unsupported version header {header:02x?}"),
            ));
        }
        Ok(())
    }

    fn read_value(&mut self) -> Result<Value> {
        let tag_offset = self.offset;
        let tag = self.read_u8()?;
        trace!(offset = tag_offset, tag = %(tag as char), "value");

        match tag {
            b'0' => Ok(Value::Nil),
            b'T' => Ok(Value::Bool(true)),
            b'F' => Ok(Value::Bool(false)),
            b'i' => Ok(Value::Integer(self.read_i64()?)),
            b'f' => Ok(Value::Float(self.read_f64()?)),
            b'"' => Ok(Value::String(self.read_string()?)),
            b'b' => {
                let len = self.read_u32()? as usize;
                Ok(Value::Bytes(self.read_bytes(len)?))
            }
            b':' => Ok(Value::Symbol(self.read_string()?)),
            b'[' => {
                let count = self.read_u32()? as usize;
                let mut elements = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    elements.push(self.read_value()?);
                }
                Ok(Value::Array(elements))
            }
            b'{' => {
                let count = self.read_u32()? as usize;
                let mut pairs = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    pairs.push((key, value));
                }
                Ok(Value::hash_from_pairs(pairs))
            }
            b'u' => self.read_packed_object(tag_offset),
            b'o' => self.read_attribute_object(),
            other => Err(Error::decode(
                tag_offset,
                format!("unknown value tag 0x{other:02x}"),
            )),
        }
    }

    fn read_packed_object(&mut self, tag_offset: u64) -> Result<Value> {
        let class = self.read_string()?;
        let Some(kind) = catalog::packed_kind(&class) else {
            return Err(Error::UnknownPackedClass(class, tag_offset));
        };

        let len = self.read_u32()? as usize;
        let payload = self.read_bytes(len)?;
        let packed = Packed::from_payload(kind, &payload)?;

        Ok(Value::Object {
            class,
            payload: Payload::Packed(packed),
        })
    }

    fn read_attribute_object(&mut self) -> Result<Value> {
        let class = self.read_string()?;
        let count = self.read_u32()? as usize;

        let mut attributes = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let name = self.read_string()?;
            let value = self.read_value()?;
            attributes.push((name, value));
        }

        Ok(Value::Object {
            class,
            payload: Payload::Attributes(attributes),
        })
    }

    fn read_string(&mut self) -> Result<String> {
        let start = self.offset;
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|_| Error::decode(start, "string is not valid UTF-8"))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<()> {
        let start = self.offset;
        self.inner
            .read_exact(buffer)
            .map_err(|_| Error::decode(start, format!("unexpected end of stream, wanted {} bytes", buffer.len())))?;
        self.offset += buffer.len() as u64;
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        let start = self.offset;
        let value = self
            .inner
            .read_u8()
            .map_err(|_| Error::decode(start, "unexpected end of stream"))?;
        self.offset += 1;
        Ok(value)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buffer = [0u8; 4];
        self.read_exact(&mut buffer)?;
        Ok(u32::from_le_bytes(buffer))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let start = self.offset;
        let value = self
            .inner
            .read_i64::<LittleEndian>()
            .map_err(|_| Error::decode(start, "unexpected end of stream"))?;
        self.offset += 8;
        Ok(value)
    }

    fn read_f64(&mut self) -> Result<f64> {
        let start = self.offset;
        let value = self
            .inner
            .read_f64::<LittleEndian>()
            .map_err(|_| Error::decode(start, "unexpected end of stream"))?;
        self.offset += 8;
        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::from_bytes;
    use crate::error::{Error, Result};
    use crate::value::Value;

    #[traced_test]
    #[test]
    fn read_scalars() -> Result<()> {
        assert_eq!(from_bytes(&[0x04, 0x08, b'0'])?, Value::Nil);
        assert_eq!(from_bytes(&[0x04, 0x08, b'T'])?, Value::Bool(true));
        assert_eq!(from_bytes(&[0x04, 0x08, b'F'])?, Value::Bool(false));

        #[rustfmt::skip]
        let int = [
            0x04, 0x08,
            b'i', 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(from_bytes(&int)?, Value::Integer(42));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_string_and_symbol() -> Result<()> {
        #[rustfmt::skip]
        let string = [
            0x04, 0x08,
            b'"', 0x05, 0x00, 0x00, 0x00, b'R', b'a', b'l', b'p', b'h',
        ];
        assert_eq!(from_bytes(&string)?, Value::String("Ralph".into()));

        #[rustfmt::skip]
        let symbol = [
            0x04, 0x08,
            b':', 0x02, 0x00, 0x00, 0x00, b'i', b'd',
        ];
        assert_eq!(from_bytes(&symbol)?, Value::Symbol("id".into()));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_nested_array() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x08,
            b'[', 0x02, 0x00, 0x00, 0x00,
                b'0',
                b'[', 0x01, 0x00, 0x00, 0x00,
                    b'T',
        ];

        assert_eq!(
            from_bytes(&input)?,
            Value::Array(vec![Value::Nil, Value::Array(vec![Value::Bool(true)])])
        );
        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_hash_with_duplicate_keys() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x08,
            b'{', 0x02, 0x00, 0x00, 0x00,
                b'i', 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                b'T',
                b'i', 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                b'F',
        ];

        assert_eq!(
            from_bytes(&input)?,
            Value::Hash(vec![(Value::Integer(1), Value::Bool(false))])
        );
        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_attribute_object() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x08,
            b'o',
            0x08, 0x00, 0x00, 0x00, b'R', b'P', b'G', b':', b':', b'M', b'a', b'p',
            0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, b'i', b'd',
            b'i', 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        assert_eq!(
            from_bytes(&input)?,
            Value::object("RPG::Map", vec![("id".into(), Value::Integer(5))])
        );
        Ok(())
    }

    #[traced_test]
    #[test]
    fn unknown_attribute_class_still_decodes() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x08,
            b'o',
            0x07, 0x00, 0x00, 0x00, b'M', b'y', b':', b':', b'M', b'o', b'd',
            0x00, 0x00, 0x00, 0x00,
        ];
        let value = from_bytes(&input)?;
        assert_eq!(value, Value::object("My::Mod", Vec::new()));
        Ok(())
    }

    #[traced_test]
    #[test]
    fn unknown_packed_class_is_an_error() {
        #[rustfmt::skip]
        let input = [
            0x04, 0x08,
            b'u',
            0x04, 0x00, 0x00, 0x00, b'B', b'l', b'o', b'b',
            0x00, 0x00, 0x00, 0x00,
        ];

        let result = from_bytes(&input);
        assert!(matches!(result, Err(Error::UnknownPackedClass(class, 2)) if class == "Blob"));
    }

    #[traced_test]
    #[test]
    fn bad_version_header() {
        let result = from_bytes(&[0x05, 0x08, b'0']);
        assert!(matches!(result, Err(Error::Decode { offset: 0, .. })));
    }

    #[traced_test]
    #[test]
    fn truncated_stream_reports_offset() {
        #[rustfmt::skip]
        let input = [
            0x04, 0x08,
            b'"', 0x05, 0x00, 0x00, 0x00, b'R', b'a',
        ];
        let result = from_bytes(&input);
        assert!(matches!(result, Err(Error::Decode { offset: 7, .. })));
    }

    #[traced_test]
    #[test]
    fn unknown_tag_reports_offset() {
        let result = from_bytes(&[0x04, 0x08, b'Z']);
        assert!(matches!(result, Err(Error::Decode { offset: 2, .. })));
    }
}

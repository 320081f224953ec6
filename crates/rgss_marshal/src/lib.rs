//! This library handles reading from and creating the binary object-graph
//! data files used by RGSS game projects.
//!
//! # Object-Graph Format Documentation
//!
//! An RGSS data file stores a single object graph: a tree of tagged values
//! (scalars, collections, and class-tagged objects). The format is
//! self-describing; every value starts with a one-byte tag that determines
//! how the bytes that follow are interpreted. All multi-byte integers are
//! little-endian.
//!
//! ## File Structure
//!
//! A data file starts with a two-byte version header, followed by exactly
//! one value.
//!
//! | Offset (bytes) | Field         | Description                          |
//! |----------------|---------------|--------------------------------------|
//! | 0x0000         | Version major | 1 byte: fixed value `0x04`           |
//! | 0x0001         | Version minor | 1 byte: fixed value `0x08`           |
//! | 0x0002         | Root value    | One tagged value (see below)         |
//!
//! ## Value Tags
//!
//! | Tag   | Payload                                                        |
//! |-------|----------------------------------------------------------------|
//! | `0`   | none: nil                                                      |
//! | `T`   | none: boolean true                                             |
//! | `F`   | none: boolean false                                            |
//! | `i`   | i64: integer                                                   |
//! | `f`   | f64: float                                                     |
//! | `"`   | u32 length + UTF-8 bytes: string                               |
//! | `b`   | u32 length + raw bytes: byte string                            |
//! | `:`   | u32 length + UTF-8 bytes: symbol                               |
//! | `[`   | u32 count + that many values: array                            |
//! | `{`   | u32 count + that many key/value pairs: hash                    |
//! | `u`   | class name, u32 payload length, payload: packed object         |
//! | `o`   | class name, u32 attribute count, attribute pairs: object       |
//!
//! A class name is a u32 length followed by UTF-8 bytes. An attribute pair
//! is a name (u32 length + UTF-8 bytes) followed by a value.
//!
//! ## Objects
//!
//! The set of packed (`u`) classes is closed: `Table`, `Color`, `Tone` and
//! `Rect`, each with a fixed byte layout described in [`packed`]. A `u`
//! object whose class is not in the catalog fails to decode. An `o` object
//! carries an ordered attribute map and decodes for *any* class name, which
//! keeps the format forward compatible with record kinds this library has
//! not special-cased.
//!
//! Attribute order inside an `o` object is preserved on read. On write the
//! attributes are emitted in a stable order (lexically sorted names unless
//! [`write::WriterOptions`] says otherwise) so that re-encoding unchanged
//! data produces byte-identical files.
//!
//! ## Hash Keys
//!
//! Hash keys need not be unique at the wire level. The reader deduplicates
//! them: the first occurrence keeps its position, the last occurrence keeps
//! its value.

pub mod catalog;
pub mod error;
pub mod packed;
pub mod read;
pub mod value;
pub mod write;

pub use packed::{Color, Packed, Rect, Table, Tone};
pub use read::{from_bytes, read_value};
pub use value::{Payload, Value};
pub use write::{to_bytes, write_value, WriterOptions};

//! Fixed-layout packed records from the closed catalog.
//!
//! A packed record is stored inside a `u` object as a fixed-offset byte
//! layout with no per-field framing. All fields are little-endian.

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

use crate::catalog::PackedKind;
use crate::error::{Error, Result};

/// A dense three-dimensional grid of 16-bit values.
///
/// Binary layout: five u32 fields (`dim`, `x`, `y`, `z`, element count)
/// followed by that many u16 elements. The element count is redundant with
/// the geometry and both are validated on decode.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Number of dimensions actually in use (1 to 3)
    pub dim: u32,
    /// Extent along the first axis
    pub x: u32,
    /// Extent along the second axis
    pub y: u32,
    /// Extent along the third axis
    pub z: u32,

    #[br(temp)]
    #[bw(calc = data.len() as u32)]
    size: u32,

    /// Elements in x-major order
    #[br(count = size)]
    pub data: Vec<u16>,
}

impl Table {
    /// Build a table from its geometry and elements, validating that the
    /// element count matches `x * y * z`.
    pub fn from_parts(dim: u32, x: u32, y: u32, z: u32, data: Vec<u16>) -> Result<Table> {
        let expected = (x as usize) * (y as usize) * (z as usize);
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                class: "Table",
                expected,
                found: data.len(),
            });
        }
        Ok(Table { dim, x, y, z, data })
    }

    /// The textual rendering of the element data: one string per run, each
    /// a space-joined sequence of 4-digit lowercase hex values.
    ///
    /// The run length is `x` when `x >= 2`, otherwise `y` when `y >= 2`,
    /// otherwise `z`. An empty table renders as no runs at all.
    pub fn hex_rows(&self) -> Vec<String> {
        if self.data.is_empty() {
            return Vec::new();
        }

        let stride = if self.x >= 2 {
            self.x
        } else if self.y >= 2 {
            self.y
        } else {
            self.z
        } as usize;

        self.data
            .chunks(stride.max(1))
            .map(|run| {
                run.iter()
                    .map(|value| format!("{value:04x}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

/// An RGBA color; four f64 fields.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

/// A duotone color adjustment; four f64 fields.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
pub struct Tone {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub gray: f64,
}

/// A rectangle; four i32 fields.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A decoded packed record of one of the catalog kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Packed {
    Table(Table),
    Color(Color),
    Tone(Tone),
    Rect(Rect),
}

impl Packed {
    /// The catalog class name this record is tagged with on the wire.
    pub fn class_name(&self) -> &'static str {
        match self {
            Packed::Table(_) => "Table",
            Packed::Color(_) => "Color",
            Packed::Tone(_) => "Tone",
            Packed::Rect(_) => "Rect",
        }
    }

    /// Decode a packed payload for the given catalog kind.
    pub fn from_payload(kind: PackedKind, payload: &[u8]) -> Result<Packed> {
        match kind {
            PackedKind::Table => {
                if payload.len() < 20 || (payload.len() - 20) % 2 != 0 {
                    return Err(Error::SizeMismatch {
                        class: "Table",
                        expected: 0,
                        found: payload.len(),
                    });
                }
                // The declared count must account for every payload byte
                // before the elements are read.
                let declared =
                    u32::from_le_bytes([payload[16], payload[17], payload[18], payload[19]])
                        as usize;
                let stored = (payload.len() - 20) / 2;
                if declared != stored {
                    return Err(Error::SizeMismatch {
                        class: "Table",
                        expected: declared,
                        found: stored,
                    });
                }
                let table = Table::read(&mut Cursor::new(payload))?;
                let expected = (table.x as usize) * (table.y as usize) * (table.z as usize);
                if table.data.len() != expected {
                    return Err(Error::SizeMismatch {
                        class: "Table",
                        expected,
                        found: table.data.len(),
                    });
                }
                Ok(Packed::Table(table))
            }
            PackedKind::Color => {
                Self::check_len("Color", payload, 32)?;
                Ok(Packed::Color(Color::read(&mut Cursor::new(payload))?))
            }
            PackedKind::Tone => {
                Self::check_len("Tone", payload, 32)?;
                Ok(Packed::Tone(Tone::read(&mut Cursor::new(payload))?))
            }
            PackedKind::Rect => {
                Self::check_len("Rect", payload, 16)?;
                Ok(Packed::Rect(Rect::read(&mut Cursor::new(payload))?))
            }
        }
    }

    /// Encode this record into its fixed byte layout.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        match self {
            Packed::Table(table) => table.write(&mut cursor)?,
            Packed::Color(color) => color.write(&mut cursor)?,
            Packed::Tone(tone) => tone.write(&mut cursor)?,
            Packed::Rect(rect) => rect.write(&mut cursor)?,
        }
        Ok(cursor.into_inner())
    }

    fn check_len(class: &'static str, payload: &[u8], expected: usize) -> Result<()> {
        if payload.len() != expected {
            return Err(Error::SizeMismatch {
                class,
                expected,
                found: payload.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Packed, Table};
    use crate::catalog::PackedKind;
    use crate::error::{Error, Result};

    #[test]
    fn table_roundtrip() -> Result<()> {
        let table = Table::from_parts(2, 2, 2, 1, vec![1, 2, 3, 4])?;
        let payload = Packed::Table(table.clone()).to_payload()?;

        #[rustfmt::skip]
        let expected = vec![
            0x02, 0x00, 0x00, 0x00,  // dim
            0x02, 0x00, 0x00, 0x00,  // x
            0x02, 0x00, 0x00, 0x00,  // y
            0x01, 0x00, 0x00, 0x00,  // z
            0x04, 0x00, 0x00, 0x00,  // size
            0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00,
        ];
        assert_eq!(payload, expected);

        assert_eq!(
            Packed::from_payload(PackedKind::Table, &payload)?,
            Packed::Table(table)
        );
        Ok(())
    }

    #[test]
    fn table_geometry_mismatch() {
        #[rustfmt::skip]
        let payload = vec![
            0x02, 0x00, 0x00, 0x00,  // dim
            0x02, 0x00, 0x00, 0x00,  // x
            0x02, 0x00, 0x00, 0x00,  // y
            0x01, 0x00, 0x00, 0x00,  // z
            0x03, 0x00, 0x00, 0x00,  // size, disagrees with x*y*z
            0x01, 0x00, 0x02, 0x00, 0x03, 0x00,
        ];

        let result = Packed::from_payload(PackedKind::Table, &payload);
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn table_truncated_elements() {
        // size claims four elements but only three are present
        #[rustfmt::skip]
        let payload = vec![
            0x02, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x02, 0x00, 0x03, 0x00,
        ];

        let result = Packed::from_payload(PackedKind::Table, &payload);
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn table_from_parts_rejects_wrong_count() {
        let result = Table::from_parts(2, 2, 2, 1, vec![1, 2, 3]);
        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                class: "Table",
                expected: 4,
                found: 3,
            })
        ));
    }

    #[test]
    fn hex_rows_stride_follows_first_wide_axis() -> Result<()> {
        let table = Table::from_parts(2, 2, 2, 1, vec![1, 2, 3, 0x1f4])?;
        assert_eq!(table.hex_rows(), vec!["0001 0002", "0003 01f4"]);

        let narrow = Table::from_parts(1, 1, 1, 3, vec![7, 8, 9])?;
        assert_eq!(narrow.hex_rows(), vec!["0007 0008 0009"]);

        let empty = Table::from_parts(3, 0, 4, 4, Vec::new())?;
        assert_eq!(empty.hex_rows(), Vec::<String>::new());
        Ok(())
    }

    #[test]
    fn color_roundtrip() -> Result<()> {
        let color = super::Color {
            red: 255.0,
            green: 128.0,
            blue: 0.0,
            alpha: 255.0,
        };
        let payload = Packed::Color(color.clone()).to_payload()?;
        assert_eq!(payload.len(), 32);
        assert_eq!(
            Packed::from_payload(PackedKind::Color, &payload)?,
            Packed::Color(color)
        );
        Ok(())
    }

    #[test]
    fn rect_roundtrip() -> Result<()> {
        let rect = super::Rect {
            x: -4,
            y: 12,
            width: 640,
            height: 480,
        };
        let payload = Packed::Rect(rect.clone()).to_payload()?;
        assert_eq!(payload.len(), 16);
        assert_eq!(
            Packed::from_payload(PackedKind::Rect, &payload)?,
            Packed::Rect(rect)
        );
        Ok(())
    }

    #[test]
    fn short_color_payload_is_rejected() {
        let result = Packed::from_payload(PackedKind::Color, &[0u8; 24]);
        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                class: "Color",
                expected: 32,
                found: 24,
            })
        ));
    }
}

//! The closed catalog of class-tagged record kinds.
//!
//! The catalog decides how a `u` object's payload is decoded. It is fixed at
//! compile time; `o` objects with unlisted class names still decode as
//! generic attribute maps.

/// A packed record kind, selecting a fixed byte layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedKind {
    /// Dense 3-D grid of u16 values
    Table,
    /// Four-f64 RGBA color
    Color,
    /// Four-f64 duotone pair
    Tone,
    /// Four-i32 rectangle
    Rect,
}

/// Look up the packed kind for a wire class name, if the class is packed.
pub fn packed_kind(class: &str) -> Option<PackedKind> {
    match class {
        "Table" => Some(PackedKind::Table),
        "Color" => Some(PackedKind::Color),
        "Tone" => Some(PackedKind::Tone),
        "Rect" => Some(PackedKind::Rect),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::{packed_kind, PackedKind};

    #[test]
    fn catalog_is_closed() {
        assert_eq!(packed_kind("Table"), Some(PackedKind::Table));
        assert_eq!(packed_kind("Color"), Some(PackedKind::Color));
        assert_eq!(packed_kind("Tone"), Some(PackedKind::Tone));
        assert_eq!(packed_kind("Rect"), Some(PackedKind::Rect));
        assert_eq!(packed_kind("RPG::Actor"), None);
        assert_eq!(packed_kind("table"), None);
    }
}

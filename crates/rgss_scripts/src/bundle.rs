//! The bundle payload: an ordered list of script entries inside one
//! object-graph file.

use rgss_marshal::Value;

use crate::error::{Error, Result};

/// A bundle with fewer entries than this is taken to be a loader stub
/// rather than a real script collection.
pub const LOADER_THRESHOLD: usize = 10;

/// One row of a script bundle.
///
/// The title doubles as structural metadata: `[[ name ]]` opens a folder, a
/// run of `=` returns to the root, and an empty title with an empty body is
/// a layout spacer. Entries are only ever rebuilt, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// The entry's stored ordinal
    pub ordinal: i64,
    /// Script title, or a structural marker
    pub title: String,
    /// zlib-compressed script body
    pub body: Vec<u8>,
}

impl ScriptEntry {
    pub fn new(ordinal: i64, title: impl Into<String>, body: Vec<u8>) -> ScriptEntry {
        ScriptEntry {
            ordinal,
            title: title.into(),
            body,
        }
    }

    /// Whether this title opens a folder, and if so the folder's name.
    pub fn folder_name(&self) -> Option<&str> {
        let inner = self.title.trim().strip_prefix("[[")?.strip_suffix("]]")?;
        Some(inner.trim())
    }

    /// Whether this title returns the layout to the root directory.
    pub fn is_divider(&self) -> bool {
        self.title.starts_with("=====")
    }
}

/// Whether a decoded bundle is a loader stub left behind by a previous
/// extraction.
pub fn is_loader(entries: &[ScriptEntry]) -> bool {
    entries.len() < LOADER_THRESHOLD
}

/// Build the object-graph payload for a bundle.
pub fn bundle_to_value(entries: &[ScriptEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                Value::Array(vec![
                    Value::Integer(entry.ordinal),
                    Value::String(entry.title.clone()),
                    Value::Bytes(entry.body.clone()),
                ])
            })
            .collect(),
    )
}

/// Read a bundle back out of an object-graph payload.
pub fn bundle_from_value(value: &Value) -> Result<Vec<ScriptEntry>> {
    let rows = value
        .as_array()
        .ok_or_else(|| Error::malformed("payload is not a sequence"))?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let fields = row
                .as_array()
                .filter(|fields| fields.len() == 3)
                .ok_or_else(|| {
                    Error::malformed(format!("entry {index} is not an (ordinal, title, body) triple"))
                })?;

            let ordinal = fields[0]
                .as_integer()
                .ok_or_else(|| Error::malformed(format!("entry {index} has a non-integer ordinal")))?;
            let title = fields[1]
                .as_str()
                .ok_or_else(|| Error::malformed(format!("entry {index} has a non-string title")))?;
            let body = fields[2]
                .as_bytes()
                .ok_or_else(|| Error::malformed(format!("entry {index} has a non-bytes body")))?;

            Ok(ScriptEntry::new(ordinal, title, body.to_vec()))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rgss_marshal::Value;

    use super::{bundle_from_value, bundle_to_value, is_loader, ScriptEntry};
    use crate::error::{Error, Result};

    #[test]
    fn value_conversion_roundtrips() -> Result<()> {
        let entries = vec![
            ScriptEntry::new(1, "Game_Map", vec![0x78, 0x01]),
            ScriptEntry::new(2, "[[ addons ]]", vec![0x78, 0x02]),
        ];

        assert_eq!(bundle_from_value(&bundle_to_value(&entries))?, entries);
        Ok(())
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let payload = Value::Array(vec![Value::Array(vec![
            Value::Integer(1),
            Value::String("x".into()),
        ])]);
        assert!(matches!(
            bundle_from_value(&payload),
            Err(Error::MalformedBundle { .. })
        ));

        assert!(matches!(
            bundle_from_value(&Value::Nil),
            Err(Error::MalformedBundle { .. })
        ));
    }

    #[test]
    fn structural_titles() {
        let folder = ScriptEntry::new(1, "[[ addons ]]", vec![]);
        assert_eq!(folder.folder_name(), Some("addons"));

        let nameless = ScriptEntry::new(1, "[[  ]]", vec![]);
        assert_eq!(nameless.folder_name(), Some(""));

        let divider = ScriptEntry::new(1, "==================", vec![]);
        assert!(divider.is_divider());
        assert_eq!(divider.folder_name(), None);

        let plain = ScriptEntry::new(1, "Game_Map", vec![]);
        assert!(!plain.is_divider());
        assert_eq!(plain.folder_name(), None);
    }

    #[test]
    fn small_bundles_are_loader_stubs() {
        let stub = vec![ScriptEntry::new(62054200, "Main", vec![])];
        assert!(is_loader(&stub));

        let full: Vec<ScriptEntry> = (0..12)
            .map(|i| ScriptEntry::new(i, format!("{i}"), vec![]))
            .collect();
        assert!(!is_loader(&full));
    }
}

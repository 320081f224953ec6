//! Per-record-kind attribute transforms applied at the text boundary.
//!
//! A transform pair re-shapes one attribute of one record kind between its
//! binary form and its textual form. The registry is a closed table keyed by
//! class name; lookup happens once per record, not per attribute.

use rgss_marshal::Value;

/// Sentinel written in place of the stored `version_id`. Keeping the field
/// inert stops version churn from showing up in diffs.
pub const VERSION_SENTINEL: i64 = 12_345_678;

/// Event-command code whose first parameter is a continued text line.
const TEXT_LINE_CODE: i64 = 401;

/// Largest index accepted in a sparse name mapping on decode. Name tables
/// never get near this; a larger key is a typo, not a request to allocate.
const MAX_NAME_INDEX: i64 = 100_000;

/// Read-only view of a record's attributes, for transforms that need a
/// sibling attribute.
pub type AttrView<'a> = &'a [(String, Value)];

/// A transform pair for one `(record kind, attribute)` slot.
pub struct Transform {
    /// The attribute this transform applies to
    pub attribute: &'static str,
    /// Applied when rendering to text
    pub encode: fn(Value, AttrView) -> Value,
    /// Applied when reading back from text. The input may be hand-edited,
    /// so this side can reject it.
    pub decode: fn(Value, AttrView) -> core::result::Result<Value, String>,
}

/// The transforms registered for a record kind.
pub fn transforms_for(class: &str) -> &'static [Transform] {
    match class {
        "RPG::System" => &[
            Transform {
                attribute: "variables",
                encode: encode_sparse_names,
                decode: decode_sparse_names,
            },
            Transform {
                attribute: "switches",
                encode: encode_sparse_names,
                decode: decode_sparse_names,
            },
            Transform {
                attribute: "version_id",
                encode: |_, _| Value::Integer(VERSION_SENTINEL),
                decode: keep,
            },
        ],
        "RPG::EventCommand" => &[Transform {
            attribute: "parameters",
            encode: trim_text_line,
            decode: keep,
        }],
        _ => &[],
    }
}

/// Run every registered encode transform over a record's attributes.
pub fn apply_encode(class: &str, attributes: &[(String, Value)]) -> Vec<(String, Value)> {
    let transforms = transforms_for(class);
    if transforms.is_empty() {
        return attributes.to_vec();
    }

    attributes
        .iter()
        .map(|(name, value)| {
            let transformed = match transforms.iter().find(|t| t.attribute == name) {
                Some(transform) => (transform.encode)(value.clone(), attributes),
                None => value.clone(),
            };
            (name.clone(), transformed)
        })
        .collect()
}

/// Run every registered decode transform over a record's attributes.
pub fn apply_decode(
    class: &str,
    attributes: &[(String, Value)],
) -> core::result::Result<Vec<(String, Value)>, String> {
    let transforms = transforms_for(class);
    if transforms.is_empty() {
        return Ok(attributes.to_vec());
    }

    attributes
        .iter()
        .map(|(name, value)| {
            let transformed = match transforms.iter().find(|t| t.attribute == name) {
                Some(transform) => (transform.decode)(value.clone(), attributes)?,
                None => value.clone(),
            };
            Ok((name.clone(), transformed))
        })
        .collect()
}

fn keep(value: Value, _: AttrView) -> core::result::Result<Value, String> {
    Ok(value)
}

/// Re-express a positional name array as an index-keyed mapping, dropping
/// nil and blank entries. The final index is always kept so the array
/// length survives the round trip.
fn encode_sparse_names(value: Value, _: AttrView) -> Value {
    let Value::Array(elements) = value else {
        return value;
    };

    let last_index = elements.len().wrapping_sub(1);
    let mut pairs: Vec<(Value, Value)> = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let reduced = reduce(element);
        if !reduced.is_nil() {
            pairs.push((Value::Integer(index as i64), reduced));
        }
    }

    if !elements.is_empty() && !pairs.iter().any(|(key, _)| key.as_integer() == Some(last_index as i64)) {
        pairs.push((Value::Integer(last_index as i64), Value::Nil));
    }

    Value::Hash(pairs)
}

/// Scatter an index-keyed mapping back into a positional array, nil-filling
/// the gaps up to the maximum index seen. Keys must be integers in
/// `0..=MAX_NAME_INDEX`; anything else rejects the document.
fn decode_sparse_names(value: Value, _: AttrView) -> core::result::Result<Value, String> {
    let Value::Hash(pairs) = value else {
        return Ok(value);
    };

    let mut indices = Vec::with_capacity(pairs.len());
    for (key, _) in &pairs {
        let index = key
            .as_integer()
            .filter(|index| (0..=MAX_NAME_INDEX).contains(index))
            .ok_or_else(|| format!("{key:?} is not a usable name table index"))?;
        indices.push(index as usize);
    }

    let Some(&max_index) = indices.iter().max() else {
        return Ok(Value::Array(Vec::new()));
    };

    let mut elements = vec![Value::Nil; max_index + 1];
    for ((_, entry), index) in pairs.into_iter().zip(indices) {
        elements[index] = entry;
    }
    Ok(Value::Array(elements))
}

fn reduce(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let stripped = s.trim();
            if stripped.is_empty() {
                Value::Nil
            } else {
                Value::String(stripped.to_owned())
            }
        }
        other => other.clone(),
    }
}

/// For text-line commands, trailing whitespace on the first parameter is
/// editor noise; trim it on the way out.
fn trim_text_line(value: Value, attributes: AttrView) -> Value {
    let code = attributes
        .iter()
        .find(|(name, _)| name == "code")
        .and_then(|(_, v)| v.as_integer());
    if code != Some(TEXT_LINE_CODE) {
        return value;
    }

    let Value::Array(mut parameters) = value else {
        return value;
    };
    if let Some(Value::String(first)) = parameters.first_mut() {
        let trimmed = first.trim_end().to_owned();
        *first = trimmed;
    }
    Value::Array(parameters)
}

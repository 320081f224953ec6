//! Rendering object graphs as textual tree documents

use rgss_marshal::{Packed, Payload, Value};

use crate::style;
use crate::transform;

const INDENT: usize = 2;

/// Render a complete object graph as a textual tree document.
///
/// Record attributes are passed through their encode transforms and emitted
/// in lexical order, so re-rendering unchanged data is byte-identical.
pub fn write_document(root: &Value) -> String {
    let mut out = String::new();
    match root {
        Value::Array(elements) if !elements.is_empty() => {
            for element in elements {
                emit_sequence_item(&mut out, element, 0);
            }
        }
        other => emit_value(&mut out, other, 0),
    }
    out
}

/// Emit a value at `indent` with no prefix (top level or a nested block).
fn emit_value(out: &mut String, value: &Value, indent: usize) {
    if let Some(inline) = inline_repr(value) {
        push_line(out, indent, &inline);
        return;
    }
    match value {
        Value::Array(elements) => {
            for element in elements {
                emit_sequence_item(out, element, indent);
            }
        }
        Value::Hash(pairs) => emit_mapping(out, pairs, indent),
        Value::Object { .. } => {
            let (tag, body) = record_parts(value);
            push_line(out, indent, &tag);
            emit_record_body(out, &body, indent + INDENT, is_grid(value));
        }
        // Scalars always have an inline form.
        _ => unreachable!("scalars are inline"),
    }
}

fn emit_sequence_item(out: &mut String, element: &Value, indent: usize) {
    if let Some(inline) = inline_repr(element) {
        push_line(out, indent, &format!("- {inline}"));
        return;
    }
    match element {
        Value::Object { .. } => {
            let (tag, body) = record_parts(element);
            push_line(out, indent, &format!("- {tag}"));
            emit_record_body(out, &body, indent + INDENT, is_grid(element));
        }
        nested => {
            push_line(out, indent, "-");
            emit_value(out, nested, indent + INDENT);
        }
    }
}

fn emit_mapping(out: &mut String, pairs: &[(Value, Value)], indent: usize) {
    for (key, value) in pairs {
        let key_repr = flow(key);
        emit_entry(out, &key_repr, value, indent);
    }
}

fn emit_record_body(out: &mut String, body: &[(String, Value)], indent: usize, grid: bool) {
    for (name, value) in body {
        match value {
            // Grid element rows always render one per line.
            Value::Array(rows) if grid && !rows.is_empty() => {
                push_line(out, indent, &format!("{}:", attr_prefix(name)));
                for row in rows {
                    emit_sequence_item(out, row, indent + INDENT);
                }
            }
            _ => emit_entry(out, &attr_prefix(name), value, indent),
        }
    }
}

fn is_grid(value: &Value) -> bool {
    matches!(
        value,
        Value::Object {
            payload: Payload::Packed(Packed::Table(_)),
            ..
        }
    )
}

/// Attribute names that are not bare identifiers are quoted so the reader
/// can round-trip them.
fn attr_prefix(name: &str) -> String {
    let mut chars = name.chars();
    let bare = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        name.to_owned()
    } else {
        quote(name)
    }
}

/// Emit one `prefix: value` entry, nesting the value when it has no inline
/// form.
fn emit_entry(out: &mut String, prefix: &str, value: &Value, indent: usize) {
    if let Some(inline) = inline_repr(value) {
        push_line(out, indent, &format!("{prefix}: {inline}"));
        return;
    }
    match value {
        Value::Object { .. } => {
            let (tag, body) = record_parts(value);
            push_line(out, indent, &format!("{prefix}: {tag}"));
            emit_record_body(out, &body, indent + INDENT, is_grid(value));
        }
        nested => {
            push_line(out, indent, &format!("{prefix}:"));
            emit_value(out, nested, indent + INDENT);
        }
    }
}

fn push_line(out: &mut String, indent: usize, text: &str) {
    for _ in 0..indent {
        out.push(' ');
    }
    out.push_str(text);
    out.push('\n');
}

/// The inline rendering of a value, when it has one.
///
/// Scalars, empty collections, hashes with non-scalar keys, and records of
/// compact kinds render inline; everything else is block.
fn inline_repr(value: &Value) -> Option<String> {
    match value {
        Value::Array(elements) => {
            if elements.is_empty() || elements.iter().all(is_scalar) {
                Some(flow(value))
            } else {
                None
            }
        }
        Value::Hash(pairs) => {
            if pairs.is_empty() || pairs.iter().any(|(key, _)| !is_scalar(key)) {
                Some(flow(value))
            } else {
                None
            }
        }
        Value::Object { class, payload } => match payload {
            Payload::Packed(Packed::Table(_)) => None,
            Payload::Packed(Packed::Rect(_)) => None,
            Payload::Packed(_) => Some(flow(value)),
            Payload::Attributes(attributes) => {
                if style::is_flow(class, attributes) {
                    Some(flow(value))
                } else {
                    None
                }
            }
        },
        scalar => Some(flow(scalar)),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(
        value,
        Value::Array(_) | Value::Hash(_) | Value::Object { .. }
    )
}

/// The flow (single-line) rendering of any value.
fn flow(value: &Value) -> String {
    match value {
        Value::Nil => "~".to_owned(),
        Value::Bool(true) => "true".to_owned(),
        Value::Bool(false) => "false".to_owned(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::String(s) => quote(s),
        Value::Symbol(s) => format_symbol(s),
        Value::Bytes(b) => {
            let mut out = String::with_capacity(2 + b.len() * 2);
            out.push_str("0x");
            for byte in b {
                out.push_str(&format!("{byte:02x}"));
            }
            out
        }
        Value::Array(elements) => {
            let inner: Vec<String> = elements.iter().map(flow).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Hash(pairs) => {
            let inner: Vec<String> = pairs
                .iter()
                .map(|(key, value)| format!("{}: {}", flow(key), flow(value)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        Value::Object { .. } => {
            let (tag, body) = record_parts(value);
            let inner: Vec<String> = body
                .iter()
                .map(|(name, value)| format!("{}: {}", attr_prefix(name), flow(value)))
                .collect();
            format!("{tag} {{{}}}", inner.join(", "))
        }
    }
}

/// A record's tag line and its attribute list ready for rendering: packed
/// records expand into their fixed field order, attribute records pass
/// through their encode transforms and sort lexically.
fn record_parts(value: &Value) -> (String, Vec<(String, Value)>) {
    let Value::Object { class, payload } = value else {
        unreachable!("record_parts is only called on objects");
    };

    let tag = format!("!{class}");
    let body = match payload {
        Payload::Packed(packed) => packed_fields(packed),
        Payload::Attributes(attributes) => {
            let mut transformed = transform::apply_encode(class, attributes);
            transformed.sort_by(|a, b| a.0.cmp(&b.0));
            transformed
        }
    };
    (tag, body)
}

fn packed_fields(packed: &Packed) -> Vec<(String, Value)> {
    match packed {
        Packed::Table(table) => vec![
            ("dim".to_owned(), Value::Integer(table.dim as i64)),
            ("x".to_owned(), Value::Integer(table.x as i64)),
            ("y".to_owned(), Value::Integer(table.y as i64)),
            ("z".to_owned(), Value::Integer(table.z as i64)),
            (
                "data".to_owned(),
                Value::Array(table.hex_rows().into_iter().map(Value::String).collect()),
            ),
        ],
        Packed::Color(color) => vec![
            ("red".to_owned(), Value::Float(color.red)),
            ("green".to_owned(), Value::Float(color.green)),
            ("blue".to_owned(), Value::Float(color.blue)),
            ("alpha".to_owned(), Value::Float(color.alpha)),
        ],
        Packed::Tone(tone) => vec![
            ("red".to_owned(), Value::Float(tone.red)),
            ("green".to_owned(), Value::Float(tone.green)),
            ("blue".to_owned(), Value::Float(tone.blue)),
            ("gray".to_owned(), Value::Float(tone.gray)),
        ],
        Packed::Rect(rect) => vec![
            ("x".to_owned(), Value::Integer(rect.x as i64)),
            ("y".to_owned(), Value::Integer(rect.y as i64)),
            ("width".to_owned(), Value::Integer(rect.width as i64)),
            ("height".to_owned(), Value::Integer(rect.height as i64)),
        ],
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_owned();
    }
    if f.is_infinite() {
        return if f < 0.0 { "-inf" } else { "inf" }.to_owned();
    }
    let rendered = format!("{f}");
    if rendered.contains('.') || rendered.contains('e') || rendered.contains('E') {
        rendered
    } else {
        format!("{rendered}.0")
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn format_symbol(s: &str) -> String {
    let bare = !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        format!(":{s}")
    } else {
        format!(":{}", quote(s))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use rgss_marshal::error::Result;
    use rgss_marshal::{Color, Packed, Table, Value};

    use super::write_document;

    #[test]
    fn scalars_render_inline() {
        assert_str_eq!(write_document(&Value::Nil), "~\n");
        assert_str_eq!(write_document(&Value::Integer(-3)), "-3\n");
        assert_str_eq!(write_document(&Value::Float(2.0)), "2.0\n");
        assert_str_eq!(
            write_document(&Value::String("a\"b".into())),
            "\"a\\\"b\"\n"
        );
        assert_str_eq!(write_document(&Value::Symbol("id".into())), ":id\n");
        assert_str_eq!(
            write_document(&Value::Bytes(vec![0x00, 0xff])),
            "0x00ff\n"
        );
    }

    #[test]
    fn top_level_sequence_of_records() {
        let document = Value::Array(vec![
            Value::Nil,
            Value::object(
                "RPG::Actor",
                vec![
                    ("name".into(), Value::String("Ralph".into())),
                    ("id".into(), Value::Integer(1)),
                ],
            ),
        ]);

        assert_str_eq!(
            write_document(&document),
            "- ~\n\
             - !RPG::Actor\n  id: 1\n  name: \"Ralph\"\n"
        );
    }

    #[test]
    fn compact_records_render_flow() {
        let document = Value::Array(vec![Value::object(
            "RPG::Actor",
            vec![(
                "bgm".into(),
                Value::object(
                    "RPG::BGM",
                    vec![
                        ("name".into(), Value::String("Theme1".into())),
                        ("volume".into(), Value::Integer(100)),
                    ],
                ),
            )],
        )]);

        assert_str_eq!(
            write_document(&document),
            "- !RPG::Actor\n  bgm: !RPG::BGM {name: \"Theme1\", volume: 100}\n"
        );
    }

    #[test]
    fn table_renders_hex_rows() -> Result<()> {
        let table = Table::from_parts(2, 2, 2, 1, vec![1, 2, 3, 500])?;
        let document = Value::packed(Packed::Table(table));

        assert_str_eq!(
            write_document(&document),
            "!Table\n  dim: 2\n  x: 2\n  y: 2\n  z: 1\n  data:\n    - \"0001 0002\"\n    - \"0003 01f4\"\n"
        );
        Ok(())
    }

    #[test]
    fn empty_table_renders_empty_data() -> Result<()> {
        let table = Table::from_parts(1, 0, 0, 0, Vec::new())?;
        let document = Value::packed(Packed::Table(table));

        assert_str_eq!(
            write_document(&document),
            "!Table\n  dim: 1\n  x: 0\n  y: 0\n  z: 0\n  data: []\n"
        );
        Ok(())
    }

    #[test]
    fn color_renders_flow() {
        let document = Value::packed(Packed::Color(Color {
            red: 255.0,
            green: 0.0,
            blue: 128.5,
            alpha: 255.0,
        }));

        assert_str_eq!(
            write_document(&document),
            "!Color {red: 255.0, green: 0.0, blue: 128.5, alpha: 255.0}\n"
        );
    }

    #[test]
    fn integer_keyed_mapping_renders_block() {
        let document = Value::object(
            "RPG::System",
            vec![(
                "variables".into(),
                Value::Array(vec![Value::Nil, Value::String("Gold".into())]),
            )],
        );

        assert_str_eq!(
            write_document(&document),
            "!RPG::System\n  variables:\n    1: \"Gold\"\n"
        );
    }

    #[test]
    fn non_identifier_attribute_names_are_quoted() {
        let document = Value::object(
            "RPG::Actor",
            vec![("display name".into(), Value::Integer(1))],
        );

        assert_str_eq!(
            write_document(&document),
            "!RPG::Actor\n  \"display name\": 1\n"
        );
    }

    #[test]
    fn nested_sequences_use_a_bare_dash() {
        let document = Value::Array(vec![Value::Array(vec![Value::Array(vec![
            Value::Integer(1),
        ])])]);

        assert_str_eq!(write_document(&document), "-\n  - [1]\n");
    }
}

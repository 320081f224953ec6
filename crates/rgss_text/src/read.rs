//! Reading textual tree documents back into object graphs

use rgss_marshal::catalog::{packed_kind, PackedKind};
use rgss_marshal::{Color, Packed, Payload, Rect, Table, Tone, Value};
use tracing::instrument;
use winnow::ascii::space0;
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated, separated_pair};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::error::{Error, Result};
use crate::{identity, transform};

/// Parse a complete textual tree document into an object graph.
///
/// Structure comes from indentation; any consistent indent deeper than the
/// parent is accepted. When the document root is a sequence, identity slots
/// are validated and repaired afterwards (see [`identity`]).
#[instrument(skip(source), err)]
pub fn parse_document(source: &str) -> Result<Value> {
    let lines = tokenize(source)?;
    if lines.is_empty() {
        return Err(Error::parse(1, "empty document"));
    }

    let mut parser = BlockParser { lines, cursor: 0 };
    let mut root = parser.parse_block(None)?;
    if let Some(line) = parser.peek() {
        return Err(Error::parse(
            line.number,
            "unexpected content after the document root",
        ));
    }

    if let Value::Array(elements) = &mut root {
        identity::normalize_identities(elements)?;
    }
    Ok(root)
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

/// Split a document into significant lines, dropping blanks and full-line
/// comments and rejecting tab indentation.
fn tokenize(source: &str) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        let text = trimmed.trim_start_matches(' ');
        if text.starts_with('\t') {
            return Err(Error::parse(number, "tab indentation is not allowed"));
        }
        if text.starts_with('#') {
            continue;
        }
        lines.push(Line {
            number,
            indent: trimmed.len() - text.len(),
            text,
        });
    }
    Ok(lines)
}

struct BlockParser<'a> {
    lines: Vec<Line<'a>>,
    cursor: usize,
}

impl<'a> BlockParser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Line<'a>> {
        let line = self.peek();
        if line.is_some() {
            self.cursor += 1;
        }
        line
    }

    /// Parse one value whose first line is the current line. The block's
    /// indent is that line's indent, which must be deeper than the parent.
    fn parse_block(&mut self, parent_indent: Option<usize>) -> Result<Value> {
        let Some(line) = self.peek() else {
            return Err(Error::parse(
                self.lines.last().map(|l| l.number).unwrap_or(1),
                "expected an indented block",
            ));
        };
        let block_indent = line.indent;
        if let Some(parent) = parent_indent {
            if block_indent <= parent {
                return Err(Error::parse(line.number, "expected an indented block"));
            }
        }

        if line.text == "-" || line.text.starts_with("- ") {
            return self.parse_sequence(block_indent);
        }

        if let Some(tag) = line.text.strip_prefix('!') {
            if line.text.contains('{') {
                self.advance();
                return self.parse_flow_line(line.text, line.number);
            }
            self.advance();
            let class = parse_record_tag(tag, line.number)?;
            let attributes = self.parse_attr_block(block_indent)?;
            return finish_record(class, attributes)
                .map_err(|reason| Error::parse(line.number, reason));
        }

        // A lone flow value and a `key: value` entry both start with a flow
        // scalar; what follows it decides which this block is.
        let mut probe = line.text;
        match flow_value.parse_next(&mut probe) {
            Ok(_) if probe.starts_with(':') => self.parse_mapping(block_indent),
            _ => {
                self.advance();
                self.parse_flow_line(line.text, line.number)
            }
        }
    }

    fn parse_sequence(&mut self, block_indent: usize) -> Result<Value> {
        let mut elements = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < block_indent {
                break;
            }
            if line.indent > block_indent {
                return Err(Error::parse(line.number, "unexpected indentation"));
            }
            if line.text != "-" && !line.text.starts_with("- ") {
                return Err(Error::parse(line.number, "expected a sequence item"));
            }
            self.advance();

            if line.text == "-" {
                elements.push(self.parse_block(Some(block_indent))?);
            } else {
                let rest = line.text[2..].trim_start();
                elements.push(self.parse_entry_value(rest, line.number, block_indent)?);
            }
        }
        Ok(Value::Array(elements))
    }

    fn parse_mapping(&mut self, block_indent: usize) -> Result<Value> {
        let mut pairs = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < block_indent {
                break;
            }
            if line.indent > block_indent {
                return Err(Error::parse(line.number, "unexpected indentation"));
            }
            self.advance();

            let mut input = line.text;
            let key = flow_value
                .parse_next(&mut input)
                .map_err(|_| Error::parse(line.number, "expected a mapping key"))?;
            let Some(rest) = input.strip_prefix(':') else {
                return Err(Error::parse(line.number, "expected ':' after mapping key"));
            };
            let value = self.parse_entry_tail(rest, line.number, block_indent)?;
            pairs.push((key, value));
        }
        Ok(Value::hash_from_pairs(pairs))
    }

    /// Parse the attribute lines of a block-style record. The attributes sit
    /// in their own block deeper than the record's prefix line; a record may
    /// also have none at all.
    fn parse_attr_block(&mut self, parent_indent: usize) -> Result<Vec<(String, Value)>> {
        let Some(first) = self.peek() else {
            return Ok(Vec::new());
        };
        if first.indent <= parent_indent {
            return Ok(Vec::new());
        }
        let block_indent = first.indent;

        let mut attributes = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < block_indent {
                break;
            }
            if line.indent > block_indent {
                return Err(Error::parse(line.number, "unexpected indentation"));
            }
            self.advance();

            let mut input = line.text;
            let name = attr_name
                .parse_next(&mut input)
                .map_err(|_| Error::parse(line.number, "expected an attribute name"))?;
            let Some(rest) = input.strip_prefix(':') else {
                return Err(Error::parse(
                    line.number,
                    "expected ':' after attribute name",
                ));
            };
            let value = self.parse_entry_tail(rest, line.number, block_indent)?;
            attributes.push((name, value));
        }
        Ok(attributes)
    }

    /// Parse what follows a `key:` or `name:` prefix: an inline value on the
    /// same line, or nothing, meaning a nested block.
    fn parse_entry_tail(&mut self, rest: &str, number: usize, prefix_indent: usize) -> Result<Value> {
        let rest = rest.trim_start();
        if rest.is_empty() {
            self.parse_block(Some(prefix_indent))
        } else {
            self.parse_entry_value(rest, number, prefix_indent)
        }
    }

    /// Parse an inline value: a record tag continued by a nested attribute
    /// block, or a complete flow value.
    fn parse_entry_value(&mut self, rest: &str, number: usize, prefix_indent: usize) -> Result<Value> {
        if let Some(tag) = rest.strip_prefix('!') {
            if !rest.contains('{') {
                let class = parse_record_tag(tag, number)?;
                let attributes = self.parse_attr_block(prefix_indent)?;
                return finish_record(class, attributes)
                    .map_err(|reason| Error::parse(number, reason));
            }
        }
        self.parse_flow_line(rest, number)
    }

    fn parse_flow_line(&self, text: &str, number: usize) -> Result<Value> {
        let value = flow_value
            .parse(text)
            .map_err(|e| Error::parse(number, format!("invalid value at column {}", e.offset() + 1)))?;
        finalize_tree(value).map_err(|reason| Error::parse(number, reason))
    }
}

fn parse_record_tag<'a>(tag: &'a str, number: usize) -> Result<&'a str> {
    let mut input = tag;
    let class = class_name
        .parse_next(&mut input)
        .map_err(|_| Error::parse(number, "expected a class name after '!'"))?;
    if !input.trim().is_empty() {
        return Err(Error::parse(number, "unexpected text after record tag"));
    }
    Ok(class)
}

/// Turn a parsed record into its final value: packed catalog classes get
/// their fixed-layout struct built from the attribute list, everything else
/// keeps its attributes, run through the class's decode transforms.
fn finish_record(
    class: &str,
    attributes: Vec<(String, Value)>,
) -> core::result::Result<Value, String> {
    match packed_kind(class) {
        Some(kind) => packed_from_attrs(kind, &attributes),
        None => {
            let attributes = transform::apply_decode(class, &attributes)?;
            Ok(Value::object(class, attributes))
        }
    }
}

/// Re-run [`finish_record`] over every record in a flow-parsed value. The
/// flow grammar produces plain attribute objects; packed construction and
/// decode transforms happen here, innermost first.
fn finalize_tree(value: Value) -> core::result::Result<Value, String> {
    Ok(match value {
        Value::Array(elements) => Value::Array(
            elements
                .into_iter()
                .map(finalize_tree)
                .collect::<core::result::Result<_, _>>()?,
        ),
        Value::Hash(pairs) => Value::Hash(
            pairs
                .into_iter()
                .map(|(key, value)| Ok((finalize_tree(key)?, finalize_tree(value)?)))
                .collect::<core::result::Result<_, String>>()?,
        ),
        Value::Object {
            class,
            payload: Payload::Attributes(attributes),
        } => {
            let attributes = attributes
                .into_iter()
                .map(|(name, value)| Ok((name, finalize_tree(value)?)))
                .collect::<core::result::Result<Vec<_>, String>>()?;
            finish_record(&class, attributes)?
        }
        other => other,
    })
}

fn packed_from_attrs(
    kind: PackedKind,
    attributes: &[(String, Value)],
) -> core::result::Result<Value, String> {
    let get = |name: &str| {
        attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value)
    };

    let packed = match kind {
        PackedKind::Table => {
            let dim = u32_attr(get("dim"), "dim")?;
            let x = u32_attr(get("x"), "x")?;
            let y = u32_attr(get("y"), "y")?;
            let z = u32_attr(get("z"), "z")?;
            let rows = get("data")
                .and_then(Value::as_array)
                .ok_or("Table needs a data sequence")?;

            let mut data = Vec::new();
            for row in rows {
                let row = row.as_str().ok_or("Table data rows must be strings")?;
                for token in row.split_whitespace() {
                    let element = u16::from_str_radix(token, 16)
                        .map_err(|_| format!("bad hex element {token:?} in Table data"))?;
                    data.push(element);
                }
            }
            let table = Table::from_parts(dim, x, y, z, data).map_err(|e| e.to_string())?;
            Packed::Table(table)
        }
        PackedKind::Color => Packed::Color(Color {
            red: f64_attr(get("red"), "red")?,
            green: f64_attr(get("green"), "green")?,
            blue: f64_attr(get("blue"), "blue")?,
            alpha: f64_attr(get("alpha"), "alpha")?,
        }),
        PackedKind::Tone => Packed::Tone(Tone {
            red: f64_attr(get("red"), "red")?,
            green: f64_attr(get("green"), "green")?,
            blue: f64_attr(get("blue"), "blue")?,
            gray: f64_attr(get("gray"), "gray")?,
        }),
        PackedKind::Rect => Packed::Rect(Rect {
            x: i32_attr(get("x"), "x")?,
            y: i32_attr(get("y"), "y")?,
            width: i32_attr(get("width"), "width")?,
            height: i32_attr(get("height"), "height")?,
        }),
    };
    Ok(Value::packed(packed))
}

fn u32_attr(value: Option<&Value>, name: &str) -> core::result::Result<u32, String> {
    value
        .and_then(Value::as_integer)
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| format!("attribute {name:?} must be a non-negative integer"))
}

fn i32_attr(value: Option<&Value>, name: &str) -> core::result::Result<i32, String> {
    value
        .and_then(Value::as_integer)
        .and_then(|i| i32::try_from(i).ok())
        .ok_or_else(|| format!("attribute {name:?} must be an integer"))
}

fn f64_attr(value: Option<&Value>, name: &str) -> core::result::Result<f64, String> {
    match value {
        Some(Value::Float(f)) => Ok(*f),
        Some(Value::Integer(i)) => Ok(*i as f64),
        _ => Err(format!("attribute {name:?} must be a number")),
    }
}

// ---------------------------------------------------------------------------
// The flow-value grammar.

fn flow_value(input: &mut &str) -> PResult<Value> {
    delimited(space0, flow_value_bare, space0).parse_next(input)
}

fn flow_value_bare(input: &mut &str) -> PResult<Value> {
    alt((
        "~".value(Value::Nil),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        bytes_literal,
        number,
        string_literal.map(Value::String),
        symbol,
        flow_sequence,
        flow_mapping,
        flow_record,
    ))
    .parse_next(input)
}

fn number(input: &mut &str) -> PResult<Value> {
    alt((
        "-inf".value(Value::Float(f64::NEG_INFINITY)),
        "inf".value(Value::Float(f64::INFINITY)),
        "nan".value(Value::Float(f64::NAN)),
        numeric,
    ))
    .parse_next(input)
}

fn numeric(input: &mut &str) -> PResult<Value> {
    let text = (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
        opt((
            one_of(['e', 'E']),
            opt(one_of(['+', '-'])),
            take_while(1.., |c: char| c.is_ascii_digit()),
        )),
    )
        .recognize()
        .parse_next(input)?;

    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ErrMode::Cut(ContextError::new()))
    } else {
        text.parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ErrMode::Cut(ContextError::new()))
    }
}

fn bytes_literal(input: &mut &str) -> PResult<Value> {
    let digits = preceded("0x", take_while(0.., |c: char| c.is_ascii_hexdigit()))
        .verify(|s: &str| s.len() % 2 == 0)
        .parse_next(input)?;

    let bytes = digits
        .as_bytes()
        .chunks(2)
        .map(|pair| (hex_nibble(pair[0]) << 4) | hex_nibble(pair[1]))
        .collect();
    Ok(Value::Bytes(bytes))
}

fn hex_nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

fn string_literal(input: &mut &str) -> PResult<String> {
    delimited('"', string_body, '"').parse_next(input)
}

fn string_body(input: &mut &str) -> PResult<String> {
    let mut out = String::new();
    loop {
        let Some(c) = input.chars().next() else {
            return Err(ErrMode::Cut(ContextError::new()));
        };
        match c {
            '"' => return Ok(out),
            '\\' => {
                *input = &input[1..];
                let Some(escape) = input.chars().next() else {
                    return Err(ErrMode::Cut(ContextError::new()));
                };
                *input = &input[escape.len_utf8()..];
                match escape {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    'u' => out.push(unicode_escape(input)?),
                    _ => return Err(ErrMode::Cut(ContextError::new())),
                }
            }
            c => {
                *input = &input[c.len_utf8()..];
                out.push(c);
            }
        }
    }
}

fn unicode_escape(input: &mut &str) -> PResult<char> {
    let hex = delimited(
        '{',
        take_while(1..=6, |c: char| c.is_ascii_hexdigit()),
        '}',
    )
    .parse_next(input)?;
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| ErrMode::Cut(ContextError::new()))
}

fn symbol(input: &mut &str) -> PResult<Value> {
    preceded(':', alt((string_literal, ident.map(str::to_owned))))
        .map(Value::Symbol)
        .parse_next(input)
}

/// An attribute name: a bare identifier, or a quoted string for names the
/// writer could not emit bare.
fn attr_name(input: &mut &str) -> PResult<String> {
    alt((ident.map(str::to_owned), string_literal)).parse_next(input)
}

fn ident<'s>(input: &mut &'s str) -> PResult<&'s str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .recognize()
        .parse_next(input)
}

fn class_name<'s>(input: &mut &'s str) -> PResult<&'s str> {
    (ident, repeat::<_, _, (), _, _>(0.., ("::", ident)))
        .recognize()
        .parse_next(input)
}

fn flow_sequence(input: &mut &str) -> PResult<Value> {
    delimited(
        '[',
        separated(0.., flow_value, ','),
        (space0, ']'),
    )
    .map(Value::Array)
    .parse_next(input)
}

fn flow_mapping(input: &mut &str) -> PResult<Value> {
    delimited(
        '{',
        separated(0.., flow_pair, ','),
        (space0, '}'),
    )
    .map(Value::hash_from_pairs)
    .parse_next(input)
}

fn flow_pair(input: &mut &str) -> PResult<(Value, Value)> {
    separated_pair(flow_value, ':', flow_value).parse_next(input)
}

fn flow_record(input: &mut &str) -> PResult<Value> {
    (
        preceded('!', class_name),
        preceded(
            space0,
            delimited('{', separated(0.., attr_pair, ','), (space0, '}')),
        ),
    )
        .map(|(class, attributes): (&str, Vec<_>)| Value::object(class, attributes))
        .parse_next(input)
}

fn attr_pair(input: &mut &str) -> PResult<(String, Value)> {
    separated_pair(preceded(space0, attr_name), ':', flow_value).parse_next(input)
}

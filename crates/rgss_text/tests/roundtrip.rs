//! Document-level round trips between the binary and textual forms.

use pretty_assertions::assert_str_eq;
use rgss_marshal::{from_bytes, to_bytes, Color, Packed, Table, Value, WriterOptions};
use rgss_text::{parse_document, write_document};

/// A small but representative catalog file: a leading nil slot, records with
/// packed fields, compact audio records and an event page. Attributes are
/// listed in lexical order, matching what both writers emit.
fn actor_catalog() -> Value {
    Value::Array(vec![
        Value::Nil,
        Value::object(
            "RPG::Actor",
            vec![
                (
                    "bgm".into(),
                    Value::object(
                        "RPG::BGM",
                        vec![
                            ("name".into(), Value::String("Theme1".into())),
                            ("pitch".into(), Value::Integer(100)),
                            ("volume".into(), Value::Integer(100)),
                        ],
                    ),
                ),
                (
                    "color".into(),
                    Value::packed(Packed::Color(Color {
                        red: 255.0,
                        green: 128.0,
                        blue: 0.0,
                        alpha: 255.0,
                    })),
                ),
                ("id".into(), Value::Integer(1)),
                ("name".into(), Value::String("Ralph".into())),
            ],
        ),
        Value::object(
            "RPG::Actor",
            vec![
                (
                    "grid".into(),
                    Value::packed(Packed::Table(
                        Table::from_parts(2, 3, 2, 1, vec![1, 2, 3, 4, 5, 0x1f4]).unwrap(),
                    )),
                ),
                ("id".into(), Value::Integer(2)),
                (
                    "list".into(),
                    Value::Array(vec![Value::object(
                        "RPG::EventCommand",
                        vec![
                            ("code".into(), Value::Integer(101)),
                            ("indent".into(), Value::Integer(0)),
                            (
                                "parameters".into(),
                                Value::Array(vec![Value::String("face".into())]),
                            ),
                        ],
                    )]),
                ),
                ("name".into(), Value::String("Ulrika".into())),
            ],
        ),
    ])
}

#[test]
fn text_roundtrip_preserves_the_graph() {
    let original = actor_catalog();
    let document = write_document(&original);
    let parsed = parse_document(&document).unwrap();

    assert_eq!(parsed, original);
}

#[test]
fn rewriting_a_parsed_document_is_byte_identical() {
    let document = write_document(&actor_catalog());
    let parsed = parse_document(&document).unwrap();

    assert_str_eq!(write_document(&parsed), document);
}

#[test]
fn binary_to_text_to_binary_roundtrip() {
    let original = actor_catalog();
    let binary = to_bytes(&original, WriterOptions::default()).unwrap();

    let decoded = from_bytes(&binary).unwrap();
    let document = write_document(&decoded);
    let reparsed = parse_document(&document).unwrap();

    assert_eq!(
        to_bytes(&reparsed, WriterOptions::default()).unwrap(),
        binary
    );
}

#[test]
fn event_commands_render_compact_except_move_lists() {
    let page = Value::Array(vec![
        Value::object(
            "RPG::EventCommand",
            vec![
                ("code".into(), Value::Integer(101)),
                ("parameters".into(), Value::Array(vec![])),
            ],
        ),
        Value::object(
            "RPG::EventCommand",
            vec![
                ("code".into(), Value::Integer(209)),
                ("parameters".into(), Value::Array(vec![])),
            ],
        ),
    ]);

    let document = write_document(&page);
    assert_str_eq!(
        document,
        "- !RPG::EventCommand {code: 101, parameters: []}\n\
         - !RPG::EventCommand\n  code: 209\n  parameters: []\n"
    );

    // Reading back a top-level sequence assigns identity slots to the
    // elements; everything else survives unchanged.
    let parsed = parse_document(&document).unwrap();
    let Value::Array(commands) = &parsed else {
        panic!("expected a sequence");
    };
    assert_eq!(commands[0].attribute("code"), Some(&Value::Integer(101)));
    assert_eq!(commands[1].attribute("code"), Some(&Value::Integer(209)));
    for command in commands {
        assert_eq!(command.attribute("parameters"), Some(&Value::Array(vec![])));
        assert!(command.attribute("id").is_some());
    }
}

#[test]
fn system_variables_survive_the_sparse_rendering() {
    let system = Value::object(
        "RPG::System",
        vec![
            (
                "variables".into(),
                Value::Array(vec![
                    Value::Nil,
                    Value::String("Gold".into()),
                    Value::Nil,
                    Value::Nil,
                ]),
            ),
            ("version_id".into(), Value::Integer(12_345_678)),
        ],
    );

    let document = write_document(&system);
    assert_str_eq!(
        document,
        "!RPG::System\n  variables:\n    1: \"Gold\"\n    3: ~\n  version_id: 12345678\n"
    );

    assert_eq!(parse_document(&document).unwrap(), system);
}

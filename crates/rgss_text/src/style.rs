//! Rendering-style decisions for class-tagged records.
//!
//! Compact record kinds render their whole body in flow style. The choice is
//! presentation only; the reader accepts either style for any record.

use rgss_marshal::Value;

/// Event-command code for a move-route list. Move lists are long and edited
/// often, so they stay in block style while every other command is compact.
pub const MOVE_LIST_CODE: i64 = 209;

/// Record kinds that always render compact.
const FLOW_CLASSES: &[&str] = &[
    "Color",
    "Tone",
    "RPG::BGM",
    "RPG::BGS",
    "RPG::SE",
    "RPG::MoveCommand",
];

/// Whether a record of `class` with the given attributes renders flow.
pub fn is_flow(class: &str, attributes: &[(String, Value)]) -> bool {
    if FLOW_CLASSES.contains(&class) {
        return true;
    }

    if class == "RPG::EventCommand" {
        let code = attributes
            .iter()
            .find(|(name, _)| name == "code")
            .and_then(|(_, value)| value.as_integer());
        return code != Some(MOVE_LIST_CODE);
    }

    false
}

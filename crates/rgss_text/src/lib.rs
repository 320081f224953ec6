//! This library renders RGSS object graphs as a textual tree that can be
//! diffed, hand-edited and merged, and reads such documents back.
//!
//! # Textual Tree Format Documentation
//!
//! A document is UTF-8 text holding exactly one value. Structure is given by
//! indentation (two spaces per level when writing; any consistent deeper
//! indent is accepted when reading). Blank lines and lines whose first
//! non-space character is `#` are ignored.
//!
//! ## Scalars
//!
//! | Form              | Value                                             |
//! |-------------------|---------------------------------------------------|
//! | `~`               | nil                                               |
//! | `true` / `false`  | boolean                                           |
//! | `42`, `-7`        | integer                                           |
//! | `1.5`, `2e10`     | float (also `inf`, `-inf`, `nan`)                 |
//! | `"text"`          | string, backslash escapes                         |
//! | `:name`, `:"a b"` | symbol                                            |
//! | `0x00ff10`        | byte string (`0x` alone is empty)                 |
//!
//! ## Collections
//!
//! Flow style: `[1, 2]`, `{0: "a", 5: "b"}`, `!Color {red: 255.0, ...}`.
//! Block style:
//!
//! ```text
//! - !RPG::Actor
//!   id: 1
//!   name: "Ralph"
//!   equips: [31, 0, 0, 0, 0]
//! ```
//!
//! A class-tagged record is written `!Class` followed by its attributes.
//! Record kinds flagged *compact* in [`style`] render flow; everything else
//! renders block. The reader accepts either style for any record; the
//! distinction only exists to keep diffs small.
//!
//! ## Identity slots
//!
//! When the document's top level is a sequence, every element carrying an
//! `id` attribute takes part in identity validation on read: a repeated id
//! is a fatal error, and elements with a missing or nil id are assigned
//! `max(seen) + 1` in encounter order. See [`identity`].
//!
//! ## Attribute transforms
//!
//! A few record kinds re-shape specific attributes between the binary and
//! textual forms (for example `RPG::System.variables` becomes a sparse
//! index-keyed mapping). See [`transform`].

pub mod error;
pub mod identity;
pub mod read;
pub mod style;
pub mod transform;
pub mod write;

pub use read::parse_document;
pub use write::write_document;

//! This library packs RGSS script bundles out of a directory of source
//! files and unpacks them back into one.
//!
//! # Script Bundle Format Documentation
//!
//! A script bundle is one binary object-graph file whose payload is a
//! sequence of `(ordinal, title, compressed-body)` triples. Bodies are
//! zlib-compressed script source; even an empty body is stored as a short
//! compressed placeholder.
//!
//! Titles carry the bundle's structure:
//!
//! | Title            | Meaning                                             |
//! |------------------|-----------------------------------------------------|
//! | `[[ name ]]`     | open folder `name`                                  |
//! | `=====` prefix   | return to the root directory                        |
//! | empty, empty body| layout spacer                                       |
//! | anything else    | a script, materialized as `NNN_title.rb`            |
//!
//! Unpacking numbers files and folders in arrival order with three-digit
//! prefixes, giving the last file the `999` sentinel instead. Packing reads
//! the prefixes back off and rebuilds the markers from the directory shape,
//! so the prefixes themselves are not stable across a full cycle. Folder
//! nesting deeper than two marker levels is flattened on pack and cannot be
//! faithfully reconstructed.
//!
//! After a bundle has been unpacked, the bundle file itself is usually
//! replaced by the [`loader`] stub, a single entry that loads the unpacked
//! sources at runtime. A bundle with fewer than ten entries is assumed to
//! be such a stub.

pub mod bundle;
pub mod compress;
pub mod error;
pub mod loader;
pub mod title;
pub mod tree;

pub use bundle::{bundle_from_value, bundle_to_value, is_loader, ScriptEntry};
pub use compress::{deflate, inflate};
pub use loader::loader_bundle;
pub use tree::{flatten_tree, reconstruct_tree};

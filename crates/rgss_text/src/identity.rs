//! Identity-slot validation and assignment for top-level sequences.
//!
//! Catalog files (actors, items, maps, ...) are sequences whose elements
//! carry an integer `id` attribute. After hand-editing, ids may collide or
//! be missing; this module validates the former and repairs the latter.

use std::collections::HashMap;

use rgss_marshal::{Payload, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Validate and assign `id` attributes across one top-level sequence.
///
/// Two passes, mirroring the staleness of hand-edited documents:
///
/// 1. scan every non-nil element for an integer `id`; a repeated id is the
///    fatal [`Error::DuplicateIdentity`]; track `max(seen) + 1`;
/// 2. assign that counter, incrementing, to every attribute-map element
///    whose id is missing or nil, materializing the attribute so a later
///    binary encode carries it.
///
/// The counter is threaded explicitly; nothing outlives this call.
pub fn normalize_identities(elements: &mut [Value]) -> Result<()> {
    let mut seen: HashMap<i64, usize> = HashMap::new();
    let mut next_id: i64 = 0;

    for (index, element) in elements.iter().enumerate() {
        if element.is_nil() {
            continue;
        }
        if let Some(&Value::Integer(id)) = element.attribute("id") {
            if let Some(&first_index) = seen.get(&id) {
                return Err(Error::DuplicateIdentity {
                    id,
                    first_index,
                    second_index: index,
                });
            }
            seen.insert(id, index);
            if id >= next_id {
                next_id = id + 1;
            }
        }
    }

    for element in elements.iter_mut() {
        let Value::Object {
            payload: Payload::Attributes(attributes),
            ..
        } = element
        else {
            continue;
        };

        match attributes.iter_mut().find(|(name, _)| name == "id") {
            Some((_, value @ Value::Nil)) => {
                debug!(id = next_id, "assigning id to element with nil id");
                *value = Value::Integer(next_id);
                next_id += 1;
            }
            Some(_) => {}
            None => {
                debug!(id = next_id, "assigning id to element without one");
                attributes.push(("id".to_owned(), Value::Integer(next_id)));
                next_id += 1;
            }
        }
    }

    Ok(())
}

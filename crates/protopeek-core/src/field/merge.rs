//! Merging of same-tag occurrences into repeated forms.
//!
//! The decoder hands each freshly parsed field to its parent one at a time.
//! When a tag is already present the new occurrence is folded into the
//! existing child:
//!
//! 1. same-kind scalars and binaries concatenate their value lists;
//! 2. a group or packed child is promoted to a REPEAT wrapper holding the
//!    old and new occurrences in order;
//! 3. a REPEAT child absorbs further occurrences;
//! 4. anything else is dropped, or rejected in strict mode.
//!
//! The order in which distinct tags first appeared is always preserved.

use crate::error::{Error, Result};
use crate::field::{Node, Payload};

/// Insert `child` into `parent`, folding duplicate tags.
///
/// With `strict` set, a kind mismatch under an existing tag surfaces
/// [`Error::KindConflict`] instead of dropping the newcomer. Parents
/// without a child list (scalar and binary nodes) ignore the call.
pub(crate) fn merge_child(parent: &mut Node, child: Node, strict: bool) -> Result<()> {
    let Some(children) = parent.children_mut() else {
        return Ok(());
    };

    let Some(index) = children.iter().position(|c| c.tag == child.tag) else {
        children.push(child);
        return Ok(());
    };
    let slot = &mut children[index];

    match (&mut slot.payload, child.payload) {
        (Payload::Varint(existing), Payload::Varint(new))
        | (Payload::I32(existing), Payload::I32(new))
        | (Payload::I64(existing), Payload::I64(new)) => existing.extend(new),

        (Payload::Binary(existing), Payload::Binary(new)) => existing.extend(new),

        (Payload::Group(_) | Payload::Packed { .. }, incoming) => {
            let tag = slot.tag;
            let first = std::mem::take(slot);
            let second = Node {
                tag,
                payload: incoming,
            };
            *slot = Node {
                tag,
                payload: Payload::Repeat(vec![first, second]),
            };
        }

        (Payload::Repeat(items), incoming) => {
            let tag = slot.tag;
            items.push(Node {
                tag,
                payload: incoming,
            });
        }

        (_, incoming) => {
            if strict {
                return Err(Error::KindConflict {
                    tag: slot.tag,
                    existing: slot.kind(),
                    incoming: incoming.kind(),
                });
            }
            // historical behavior: the mismatched newcomer vanishes
        }
    }

    Ok(())
}

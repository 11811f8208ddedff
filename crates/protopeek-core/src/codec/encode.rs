//! Field-tree serialization back to wire bytes.
//!
//! Encoding is a straight post-order walk. [`encoded_len`] computes the
//! exact output size first so the buffer is allocated once and written in a
//! single pass; PACKED bodies reuse the same computation for their length
//! prefixes instead of serializing into scratch buffers.

use crate::field::{Node, Payload};
use crate::wire::{encode_key, encode_varint, key_len, varint_len, WireKind};

/// Exact number of bytes [`encode`] produces for `node`
pub fn encoded_len(node: &Node) -> usize {
    match &node.payload {
        Payload::Varint(values) => values
            .iter()
            .map(|v| key_len(node.tag, WireKind::Varint) + varint_len(*v))
            .sum(),
        Payload::I32(values) => values.len() * (key_len(node.tag, WireKind::I32) + 4),
        Payload::I64(values) => values.len() * (key_len(node.tag, WireKind::I64) + 8),
        Payload::Binary(items) => items
            .iter()
            .map(|b| key_len(node.tag, WireKind::Len) + varint_len(b.len() as u64) + b.len())
            .sum(),
        Payload::Group(children) => {
            key_len(node.tag, WireKind::SGroup)
                + key_len(node.tag, WireKind::EGroup)
                + children.iter().map(encoded_len).sum::<usize>()
        }
        Payload::Packed { children, .. } => {
            let body: usize = children.iter().map(encoded_len).sum();
            key_len(node.tag, WireKind::Len) + varint_len(body as u64) + body
        }
        Payload::Repeat(children) | Payload::Root(children) => {
            children.iter().map(encoded_len).sum()
        }
    }
}

/// Serialize a field tree to wire bytes.
///
/// Scalar and binary nodes emit one key per stored value. PACKED nodes
/// re-emit a LEN field whose body is the serialized children; the retained
/// raw payload is not copied out, but the bytes still match it because the
/// children came from an exact-length parse of that payload. REPEAT
/// wrappers and the root emit their children back to back with no framing.
pub fn encode(node: &Node) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(node));
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut Vec<u8>) {
    match &node.payload {
        Payload::Varint(values) => {
            for value in values {
                encode_key(out, node.tag, WireKind::Varint);
                encode_varint(out, *value);
            }
        }
        Payload::I32(values) => {
            for value in values {
                encode_key(out, node.tag, WireKind::I32);
                // stored as u64 magnitudes; bits past 32 are dropped
                out.extend_from_slice(&(*value as u32).to_le_bytes());
            }
        }
        Payload::I64(values) => {
            for value in values {
                encode_key(out, node.tag, WireKind::I64);
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        Payload::Binary(items) => {
            for item in items {
                encode_key(out, node.tag, WireKind::Len);
                encode_varint(out, item.len() as u64);
                out.extend_from_slice(item);
            }
        }
        Payload::Group(children) => {
            encode_key(out, node.tag, WireKind::SGroup);
            for child in children {
                write_node(child, out);
            }
            encode_key(out, node.tag, WireKind::EGroup);
        }
        Payload::Packed { children, .. } => {
            encode_key(out, node.tag, WireKind::Len);
            let body: usize = children.iter().map(encoded_len).sum();
            encode_varint(out, body as u64);
            for child in children {
                write_node(child, out);
            }
        }
        Payload::Repeat(children) | Payload::Root(children) => {
            for child in children {
                write_node(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_varint_field() {
        let root = Node::root(vec![Node::varint(1, 1)]);
        assert_eq!(encode(&root), [0x08, 0x01]);
    }

    #[test]
    fn test_encode_multi_value_scalar() {
        let root = Node::root(vec![Node::varints(1, vec![1, 300])]);
        assert_eq!(encode(&root), [0x08, 0x01, 0x08, 0xAC, 0x02]);
    }

    #[test]
    fn test_encode_fixed_fields() {
        let root = Node::root(vec![Node::i32(1, 0xFFFF_FFFF)]);
        assert_eq!(encode(&root), [0x0D, 0xFF, 0xFF, 0xFF, 0xFF]);

        let root = Node::root(vec![Node::i64(3, 0xFFFF_FFFF)]);
        assert_eq!(
            encode(&root),
            [0x19, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_binary_field() {
        let root = Node::root(vec![Node::binary(2, *b"hi")]);
        assert_eq!(encode(&root), [0x12, 0x02, 0x68, 0x69]);
    }

    #[test]
    fn test_encode_group() {
        let root = Node::root(vec![Node::group(5, vec![Node::varint(1, 7)])]);
        assert_eq!(encode(&root), [0x2B, 0x08, 0x07, 0x2C]);
    }

    #[test]
    fn test_encode_packed_emits_len_field() {
        let root = Node::root(vec![Node::packed(2, vec![Node::varint(1, 1)])]);
        assert_eq!(encode(&root), [0x12, 0x02, 0x08, 0x01]);
    }

    #[test]
    fn test_encoded_len_matches_output() {
        let root = Node::root(vec![
            Node::varints(1, vec![0, 0x7F, 0x80, u64::MAX]),
            Node::binary(2, *b"some payload"),
            Node::group(
                5,
                vec![Node::i32(1, 9), Node::group(6, vec![Node::i64(2, 10)])],
            ),
            Node::packed(7, vec![Node::varint(1, 300)]),
            // a tag wide enough to need a two-byte key
            Node::varint(1000, 1),
        ]);
        assert_eq!(encoded_len(&root), encode(&root).len());
    }

    #[test]
    fn test_encode_i32_drops_high_bits() {
        // force an oversized magnitude through the repeated-values constructor
        let mut node = Node::i32(1, 0);
        node.set_value(0x1_0000_0002);
        let root = Node::root(vec![node]);
        assert_eq!(encode(&root), [0x0D, 0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_empty_root_encodes_to_nothing() {
        assert!(encode(&Node::default()).is_empty());
    }
}

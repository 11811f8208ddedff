//! End-to-end decode/encode round-trips over real wire byte sequences.

use protopeek_core::{
    decode, decode_with, encode, render_human, DecodeOptions, HumanOptions, Node, NodeKind,
};

/// Decode, re-encode, and require byte equality with the input.
fn assert_round_trip(bytes: &[u8]) -> Node {
    let root = decode(bytes).expect("input should decode");
    assert_eq!(encode(&root), bytes, "re-encoding should reproduce the input");
    root
}

#[test]
fn minimal_varint_field() {
    let root = assert_round_trip(&[0x08, 0x01]);
    assert_eq!(root.children().len(), 1);
    let child = root.child(1);
    assert_eq!(child.kind(), NodeKind::Varint);
    assert_eq!(child.values(), [1]);
}

#[test]
fn varint_at_32_bit_boundary() {
    let root = assert_round_trip(&[0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0x07]);
    assert_eq!(root.child(1).value(), 0x7FFF_FFFF);
}

#[test]
fn varint_past_32_bits() {
    let root = assert_round_trip(&[0x08, 0x80, 0x80, 0x80, 0x80, 0x08]);
    assert_eq!(root.child(1).value(), 0x8000_0000);
}

#[test]
fn fixed_width_fields() {
    let root = assert_round_trip(&[0x0D, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(root.child(1).kind(), NodeKind::I32);
    assert_eq!(root.child(1).value(), 0xFFFF_FFFF);

    let root = assert_round_trip(&[0x19, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(root.child(3).kind(), NodeKind::I64);
    assert_eq!(root.child(3).value(), 0xFFFF_FFFF);
}

#[test]
fn text_payload_stays_binary_at_any_depth() {
    let payload = b"i am binary, my id is 4";
    let mut bytes = vec![0x22, payload.len() as u8];
    bytes.extend_from_slice(payload);

    // reinterpretation disabled
    let report = decode_with(&bytes, &DecodeOptions::new().packed_depth(0));
    assert!(report.is_ok());
    assert_eq!(report.root.child(4).kind(), NodeKind::Binary);

    // unbounded reinterpretation still fails to parse the text, so the
    // payload stays binary and re-encodes byte-exactly
    let root = assert_round_trip(&bytes);
    let child = root.child(4);
    assert_eq!(child.kind(), NodeKind::Binary);
    assert_eq!(child.bytes_value(), &payload[..]);
}

#[test]
fn repeated_groups_with_empty_sibling() {
    // SGROUP(5) EGROUP(5), then SGROUP(5) { 1:1, 2:2, 3:3, 4:4 } EGROUP(5)
    let bytes = [
        0x2B, 0x2C, //
        0x2B, 0x08, 0x01, 0x10, 0x02, 0x18, 0x03, 0x20, 0x04, 0x2C,
    ];
    let root = assert_round_trip(&bytes);

    let repeat = root.child(5);
    assert_eq!(repeat.kind(), NodeKind::Repeat);
    assert_eq!(repeat.children().len(), 2);
    assert_eq!(repeat.at(0).kind(), NodeKind::Group);
    assert!(!repeat.at(0).has_children());
    let full = repeat.at(1);
    for tag in 1..=4u32 {
        assert_eq!(full.child(tag).value(), u64::from(tag));
    }

    let text = render_human(&root, &HumanOptions::default());
    assert!(text.contains("/* repeat count: 2 */"));
    assert_eq!(text.matches("5 : {").count(), 2);
}

#[test]
fn constructed_tree_survives_non_speculative_round_trip() {
    let mut tree = Node::root(vec![
        Node::varints(1, vec![1, 9_999_999, 0x7FFF_FFFF, 0x8000_0000]),
        Node::i32(2, 0xFFFF_FFFF),
        Node::i64(3, 0xFFFF_FFFF),
        Node::binary(4, *b"i am binary, my id is 4"),
    ]);
    tree.append_child(Node::group(5, Vec::new()));
    tree.append_child(Node::group(
        5,
        vec![
            Node::varint(1, 1),
            Node::varint(2, 2),
            Node::varint(3, 3),
            Node::varint(4, 4),
        ],
    ));

    let bytes = encode(&tree);
    let report = decode_with(&bytes, &DecodeOptions::new().packed_depth(0));
    assert!(report.is_ok());
    assert_eq!(report.root, tree);
}

#[test]
fn binary_payload_preserved_byte_exactly() {
    // a payload that is not a complete message must come back untouched
    let payload: Vec<u8> = vec![0x08, 0x01, 0x80];
    let bytes = encode(&Node::root(vec![Node::binary(7, payload.clone())]));

    let root = decode(&bytes).unwrap();
    let child = root.child(7);
    assert_eq!(child.kind(), NodeKind::Binary);
    assert_eq!(child.byte_strings(), [payload]);
    assert_eq!(encode(&root), bytes);
}

#[test]
fn packed_upgrade_requires_full_reparse() {
    // [0x08, 0x01] parses completely: upgraded
    let root = decode(&[0x12, 0x02, 0x08, 0x01]).unwrap();
    assert_eq!(root.child(2).kind(), NodeKind::Packed);

    // [0x08, 0x01, 0x80] fails past the first field: stays binary even
    // though a strict prefix of it would have parsed
    let root = decode(&[0x12, 0x03, 0x08, 0x01, 0x80]).unwrap();
    assert_eq!(root.child(2).kind(), NodeKind::Binary);
}

#[test]
fn packed_round_trip_is_byte_exact() {
    let bytes = [0x12, 0x04, 0x08, 0x01, 0x10, 0x02];
    let root = assert_round_trip(&bytes);
    let packed = root.child(2);
    assert_eq!(packed.kind(), NodeKind::Packed);
    assert_eq!(packed.raw_payload(), Some(&bytes[2..]));
}

#[test]
fn deeper_packed_depth_never_loses_upgrades() {
    // tag 2 LEN wrapping tag 2 LEN wrapping a varint field
    let inner = [0x08u8, 0x01];
    let mid = [&[0x12u8, inner.len() as u8][..], &inner[..]].concat();
    let outer = [&[0x12u8, mid.len() as u8][..], &mid[..]].concat();

    fn count_packed(node: &Node) -> usize {
        let own = usize::from(node.kind() == NodeKind::Packed);
        own + node.children().iter().map(count_packed).sum::<usize>()
    }

    let mut last = 0;
    for packed_depth in [0, 1, 2, -1] {
        let report = decode_with(&outer, &DecodeOptions::new().packed_depth(packed_depth));
        assert!(report.is_ok());
        let count = count_packed(&report.root);
        assert!(count >= last, "packed set shrank at depth {packed_depth}");
        last = count;
    }
    assert_eq!(last, 2);
}

#[test]
fn nested_groups_round_trip() {
    // SGROUP(1) { SGROUP(2) { 3: 9 } EGROUP(2) } EGROUP(1)
    let bytes = [0x0B, 0x13, 0x18, 0x09, 0x14, 0x0C];
    let root = assert_round_trip(&bytes);
    assert_eq!(root.child(1).child(2).child(3).value(), 9);
}

#[test]
fn failure_still_reports_progress() {
    // two good fields, then a truncated fixed-width value
    let report = decode_with(&[0x08, 0x01, 0x10, 0x02, 0x0D, 0x00], &DecodeOptions::default());
    assert!(!report.is_ok());
    assert_eq!(report.consumed, 5);
    assert_eq!(report.remaining, 1);
    // the partial tree keeps what decoded cleanly
    assert_eq!(report.root.child(1).value(), 1);
    assert_eq!(report.root.child(2).value(), 2);
}

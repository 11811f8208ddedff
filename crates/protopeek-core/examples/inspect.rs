//! Build a message by hand, encode it, and inspect the decoded result.

use protopeek_core::{
    decode, encode, render_human, render_literal, HumanOptions, LiteralOptions, Node,
};

fn main() {
    let mut message = Node::root(Vec::new());
    // repeated occurrences of one tag collapse into a single multi-valued field
    for value in [1u64, 9_999_999, 0x7FFF_FFFF, 0x8000_0000] {
        message.append_child(Node::varint(0, value));
    }
    message.append_child(Node::i32(1, 0xFFFF_FFFF));
    message.append_child(Node::i64(3, 0xFFFF_FFFF));
    message.append_child(Node::binary(4, *b"i am binary, my id is 4"));
    // two groups under one tag become a repeat
    message.append_child(Node::group(5, Vec::new()));
    message.append_child(Node::group(
        5,
        vec![
            Node::varint(1, 1),
            Node::varint(2, 2),
            Node::varint(3, 3),
            Node::varint(4, 4),
        ],
    ));

    let bytes = encode(&message);
    for byte in &bytes {
        print!("{byte:02X} ");
    }
    println!();

    match decode(&bytes) {
        Ok(root) => {
            println!("decode success");
            print!("{}", render_human(&root, &HumanOptions::default()));
            println!();
            print!("{}", render_literal(&root, &LiteralOptions::new().namespace(true)));
        }
        Err(err) => println!("decode fail: {err}"),
    }
}

//! Constructor-literal source rendering.
//!
//! Emits the tree as C++ initializer-list source, one constructor call per
//! field: `varint<1>{ 3 },`, `binary<2>{ "..." },` and brace blocks for
//! groups and packed messages. The output pastes into code built on a
//! family of tag-templated helper types and rebuilds an equivalent message.

use std::fmt::{self, Write};

use crate::field::{Node, Payload};
use crate::render::{escape_bytes, indent, value_type_name};

/// Options for the constructor-literal view
#[derive(Debug, Clone)]
pub struct LiteralOptions {
    /// Extra spaces per nesting level
    pub indent: i32,
    /// Spaces prepended to every line before indentation starts
    pub margin: i32,
    /// Maximum render depth; `-1` is unlimited, `0` prints nothing
    pub depth: i32,
    /// Qualify constructors with the `proto::` namespace
    pub namespace: bool,
}

impl Default for LiteralOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            margin: 0,
            depth: -1,
            namespace: false,
        }
    }
}

impl LiteralOptions {
    /// Creates options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-level indentation
    pub fn indent(mut self, indent: i32) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the left margin
    pub fn margin(mut self, margin: i32) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the depth limit
    pub fn depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Enables or disables the namespace qualifier
    pub fn namespace(mut self, namespace: bool) -> Self {
        self.namespace = namespace;
        self
    }
}

/// Render the tree as constructor literals wrapped in a brace pair
pub fn render_literal(root: &Node, options: &LiteralOptions) -> String {
    let mut out = String::from("{\n");
    write_node(&mut out, root, options.margin, options.depth, options)
        .expect("string write cannot fail");
    out.push_str("}\n");
    out
}

fn write_node(
    w: &mut impl Write,
    node: &Node,
    margin: i32,
    depth: i32,
    options: &LiteralOptions,
) -> fmt::Result {
    if depth == 0 {
        return Ok(());
    }
    let depth = if depth != -1 { depth - 1 } else { depth };
    let cur = margin + options.indent;
    let pad = indent(cur);
    let ns = if options.namespace { "proto::" } else { "" };

    match &node.payload {
        Payload::Varint(values) | Payload::I32(values) | Payload::I64(values) => {
            let name = value_type_name(node.kind());
            for value in values {
                writeln!(w, "{pad}{ns}{name}<{}>{{ {value} }},", node.tag)?;
            }
        }

        Payload::Binary(items) => {
            for item in items {
                writeln!(w, "{pad}{ns}binary<{}>{{ \"{}\" }},", node.tag, escape_bytes(item))?;
            }
        }

        Payload::Group(children) => {
            writeln!(w, "{pad}{ns}group<{}>{{", node.tag)?;
            for child in children {
                write_node(w, child, cur, depth, options)?;
            }
            writeln!(w, "{pad}}},")?;
        }

        Payload::Packed { children, .. } => {
            writeln!(w, "{pad}{ns}packed<{}>{{", node.tag)?;
            for child in children {
                write_node(w, child, cur, depth, options)?;
            }
            writeln!(w, "{pad}}},")?;
        }

        // repeated occurrences appear as plain siblings, no wrapper
        Payload::Repeat(children) | Payload::Root(children) => {
            for child in children {
                write_node(w, child, cur - 2, depth, options)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    fn sample_tree() -> Node {
        Node::root(vec![
            Node::varint(1, 1),
            Node::i32(2, 5),
            Node::i64(3, 6),
            Node::binary(4, *b"hi"),
            Node::group(5, vec![Node::varint(1, 7)]),
        ])
    }

    #[test]
    fn test_render_default() {
        let text = render_literal(&sample_tree(), &LiteralOptions::default());
        assert_eq!(
            text,
            concat!(
                "{\n",
                "  varint<1>{ 1 },\n",
                "  int32<2>{ 5 },\n",
                "  int64<3>{ 6 },\n",
                "  binary<4>{ \"hi\" },\n",
                "  group<5>{\n",
                "    varint<1>{ 7 },\n",
                "  },\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_render_with_namespace() {
        let root = Node::root(vec![Node::varint(1, 3), Node::group(2, vec![Node::varint(1, 4)])]);
        let text = render_literal(&root, &LiteralOptions::new().namespace(true));
        assert_eq!(
            text,
            concat!(
                "{\n",
                "  proto::varint<1>{ 3 },\n",
                "  proto::group<2>{\n",
                "    proto::varint<1>{ 4 },\n",
                "  },\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_render_packed() {
        let root = decode(&[0x12, 0x02, 0x08, 0x01]).unwrap();
        let text = render_literal(&root, &LiteralOptions::default());
        assert_eq!(
            text,
            concat!(
                "{\n",
                "  packed<2>{\n",
                "    varint<1>{ 1 },\n",
                "  },\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_repeat_emits_no_wrapper() {
        let root = decode(&[0x2B, 0x2C, 0x2B, 0x08, 0x01, 0x2C]).unwrap();
        let text = render_literal(&root, &LiteralOptions::default());
        assert_eq!(
            text,
            concat!(
                "{\n",
                "  group<5>{\n",
                "  },\n",
                "  group<5>{\n",
                "    varint<1>{ 1 },\n",
                "  },\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_multi_value_scalar_one_line_each() {
        let root = Node::root(vec![Node::varints(1, vec![1, 2])]);
        let text = render_literal(&root, &LiteralOptions::default());
        assert!(text.contains("varint<1>{ 1 },\n"));
        assert!(text.contains("varint<1>{ 2 },\n"));
    }

    #[test]
    fn test_depth_limit() {
        let text = render_literal(&sample_tree(), &LiteralOptions::new().depth(0));
        assert_eq!(text, "{\n}\n");
    }

    #[test]
    fn test_escaped_binary() {
        let root = Node::root(vec![Node::binary(4, vec![0x01, b'z'])]);
        let text = render_literal(&root, &LiteralOptions::default());
        assert!(text.contains("binary<4>{ \"\\x01z\" },\n"));
    }
}

//! Human-readable pseudo-JSON rendering.

use std::fmt::{self, Write};

use crate::field::{Node, Payload};
use crate::render::{escape_bytes, indent, value_type_name};

/// Options for the human-readable view
#[derive(Debug, Clone)]
pub struct HumanOptions {
    /// Extra spaces per nesting level
    pub indent: i32,
    /// Spaces prepended to every line before indentation starts
    pub margin: i32,
    /// Maximum render depth; `-1` is unlimited, `0` prints nothing
    pub depth: i32,
    /// Type annotations: 0 none, 1 scalars and packed, 2 also groups
    pub show_type: u8,
    /// Child-count and payload-length annotations on containers
    pub show_size: bool,
}

impl Default for HumanOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            margin: 0,
            depth: -1,
            show_type: 2,
            show_size: true,
        }
    }
}

impl HumanOptions {
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

    /// Sets the type-annotation level
    pub fn show_type(mut self, level: u8) -> Self {
        self.show_type = level;
        self
    }

    /// Enables or disables size annotations
    pub fn show_size(mut self, show: bool) -> Self {
        self.show_size = show;
        self
    }
}

/// Render the tree as pseudo-JSON wrapped in a brace pair.
///
/// One line per scalar value or byte string, a brace block per container.
/// The root's children render at the margin itself so the outer braces sit
/// at column zero.
pub fn render_human(root: &Node, options: &HumanOptions) -> String {
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
    options: &HumanOptions,
) -> fmt::Result {
    if depth == 0 {
        return Ok(());
    }
    let depth = if depth != -1 { depth - 1 } else { depth };
    let cur = margin + options.indent;
    let pad = indent(cur);

    match &node.payload {
        Payload::Varint(values) | Payload::I32(values) | Payload::I64(values) => {
            let name = value_type_name(node.kind());
            for value in values {
                write!(w, "{pad}{} : {value},", node.tag)?;
                if options.show_type > 0 {
                    write!(w, " /* {name} */ ")?;
                }
                writeln!(w)?;
            }
        }

        Payload::Binary(items) => {
            for item in items {
                writeln!(w, "{pad}{} : \"{}\",", node.tag, escape_bytes(item))?;
            }
        }

        Payload::Group(children) => {
            write!(w, "{pad}{} : {{", node.tag)?;
            if options.show_type == 2 {
                write!(w, " /* group */")?;
            }
            if options.show_size {
                write!(w, " /* childs: {} */", children.len())?;
            }
            writeln!(w)?;
            for child in children {
                write_node(w, child, cur, depth, options)?;
            }
            writeln!(w, "{pad}}},")?;
        }

        Payload::Packed { raw, children } => {
            write!(w, "{pad}{} : {{", node.tag)?;
            if options.show_type > 0 {
                write!(w, " /* packed binary */")?;
            }
            if options.show_size {
                if raw.is_empty() {
                    write!(w, " /* len:  */ /* child: {} */", children.len())?;
                } else {
                    write!(w, " /* len: {} */ /* child: {} */", raw.len(), children.len())?;
                }
            }
            writeln!(w)?;
            for child in children {
                write_node(w, child, cur, depth, options)?;
            }
            writeln!(w, "{pad}}},")?;
        }

        Payload::Repeat(children) => {
            writeln!(w, "{pad}/* repeat count: {} */", children.len())?;
            // occurrences render as siblings at the parent's own level
            for child in children {
                write_node(w, child, cur - 2, depth, options)?;
            }
        }

        Payload::Root(children) => {
            for child in children {
                write_node(w, child, cur - 2, depth, options)?;
            }
        }
    }

    Ok(())
}

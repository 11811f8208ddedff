//! The field tree: an in-memory model of a parsed protobuf message.
//!
//! Without a schema, a message is just an ordered collection of fields
//! identified by numeric tag and wire kind. The tree refines the five wire
//! kinds with three derived ones:
//!
//! - [`NodeKind::Packed`]: a length-delimited payload that successfully
//!   re-parsed as a nested message; keeps both the raw bytes and the parsed
//!   children.
//! - [`NodeKind::Repeat`]: several group-or-packed occurrences of one tag,
//!   collapsed in order.
//! - [`NodeKind::Undefined`]: the implicit root, and the sentinel returned
//!   by lookups that find nothing.
//!
//! Repeated scalar and binary occurrences of a tag do not grow the tree;
//! their values concatenate onto the first occurrence. Children of any
//! non-repeat container therefore always carry distinct tags.

pub(crate) mod merge;

use std::fmt;
use std::ops::Index;

/// Logical node kinds: the wire kinds plus the derived in-memory ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Unsigned 64-bit integers from VARINT fields
    Varint,
    /// 32-bit little-endian values, stored as u64 magnitudes
    I32,
    /// 64-bit little-endian values
    I64,
    /// Raw byte strings from LEN fields
    Binary,
    /// Ordered children framed by SGROUP/EGROUP keys
    Group,
    /// A LEN payload that re-parsed as a nested message
    Packed,
    /// Multiple group-or-packed occurrences of one tag
    Repeat,
    /// The implicit root, and the "no such child" sentinel
    Undefined,
}

impl NodeKind {
    /// Short lowercase name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Varint => "varint",
            NodeKind::I32 => "i32",
            NodeKind::I64 => "i64",
            NodeKind::Binary => "binary",
            NodeKind::Group => "group",
            NodeKind::Packed => "packed",
            NodeKind::Repeat => "repeat",
            NodeKind::Undefined => "undefined",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific node data
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Payload {
    Varint(Vec<u64>),
    I32(Vec<u64>),
    I64(Vec<u64>),
    Binary(Vec<Vec<u8>>),
    Group(Vec<Node>),
    Packed {
        /// Original wire payload, kept for inspection; empty on hand-built nodes
        raw: Vec<u8>,
        children: Vec<Node>,
    },
    Repeat(Vec<Node>),
    Root(Vec<Node>),
}

impl Payload {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Payload::Varint(_) => NodeKind::Varint,
            Payload::I32(_) => NodeKind::I32,
            Payload::I64(_) => NodeKind::I64,
            Payload::Binary(_) => NodeKind::Binary,
            Payload::Group(_) => NodeKind::Group,
            Payload::Packed { .. } => NodeKind::Packed,
            Payload::Repeat(_) => NodeKind::Repeat,
            Payload::Root(_) => NodeKind::Undefined,
        }
    }
}

/// Sentinel returned by lookups that find nothing
static UNDEFINED: Node = Node {
    tag: 0,
    payload: Payload::Root(Vec::new()),
};

/// One field of a schema-less message, or the message root itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) tag: u32,
    pub(crate) payload: Payload,
}

impl Default for Node {
    /// An empty root, ready to receive children
    fn default() -> Self {
        Node::root(Vec::new())
    }
}

impl Node {
    // ---- construction ----------------------------------------------------

    /// A VARINT field holding one value
    pub fn varint(tag: u32, value: u64) -> Self {
        Node {
            tag,
            payload: Payload::Varint(vec![value]),
        }
    }

    /// A VARINT field holding several values (a repeated scalar)
    pub fn varints(tag: u32, values: impl Into<Vec<u64>>) -> Self {
        Node {
            tag,
            payload: Payload::Varint(values.into()),
        }
    }

    /// An I32 field holding one value
    pub fn i32(tag: u32, value: u32) -> Self {
        Node {
            tag,
            payload: Payload::I32(vec![u64::from(value)]),
        }
    }

    /// An I32 field holding several values
    pub fn i32s(tag: u32, values: impl IntoIterator<Item = u32>) -> Self {
        Node {
            tag,
            payload: Payload::I32(values.into_iter().map(u64::from).collect()),
        }
    }

    /// An I64 field holding one value
    pub fn i64(tag: u32, value: u64) -> Self {
        Node {
            tag,
            payload: Payload::I64(vec![value]),
        }
    }

    /// An I64 field holding several values
    pub fn i64s(tag: u32, values: impl Into<Vec<u64>>) -> Self {
        Node {
            tag,
            payload: Payload::I64(values.into()),
        }
    }

    /// A BINARY field holding one byte string
    pub fn binary(tag: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Node {
            tag,
            payload: Payload::Binary(vec![bytes.into()]),
        }
    }

    /// A BINARY field holding several byte strings
    pub fn binaries(tag: u32, items: impl Into<Vec<Vec<u8>>>) -> Self {
        Node {
            tag,
            payload: Payload::Binary(items.into()),
        }
    }

    /// A GROUP with the given children, merging duplicate tags as they land
    pub fn group(tag: u32, children: Vec<Node>) -> Self {
        let mut node = Node {
            tag,
            payload: Payload::Group(Vec::new()),
        };
        node.append_children(children);
        node
    }

    /// A hand-built PACKED node with the given children.
    ///
    /// Carries no raw payload; decoded PACKED nodes retain the original
    /// wire bytes instead.
    pub fn packed(tag: u32, children: Vec<Node>) -> Self {
        let mut node = Node {
            tag,
            payload: Payload::Packed {
                raw: Vec::new(),
                children: Vec::new(),
            },
        };
        node.append_children(children);
        node
    }

    /// A message root holding the given top-level fields
    pub fn root(children: Vec<Node>) -> Self {
        let mut node = Node {
            tag: 0,
            payload: Payload::Root(Vec::new()),
        };
        node.append_children(children);
        node
    }

    // ---- inspection ------------------------------------------------------

    /// Logical kind of this node
    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    /// Field tag (0 for the root)
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// All scalar values under this tag; empty for non-scalar kinds
    pub fn values(&self) -> &[u64] {
        match &self.payload {
            Payload::Varint(values) | Payload::I32(values) | Payload::I64(values) => values,
            _ => &[],
        }
    }

    /// First scalar value, or 0 when there is none
    pub fn value(&self) -> u64 {
        self.values().first().copied().unwrap_or(0)
    }

    /// All byte strings of a BINARY node; empty otherwise
    pub fn byte_strings(&self) -> &[Vec<u8>] {
        match &self.payload {
            Payload::Binary(items) => items,
            _ => &[],
        }
    }

    /// First byte string of a BINARY node, or the retained payload of a
    /// decoded PACKED node; empty when there is none
    pub fn bytes_value(&self) -> &[u8] {
        match &self.payload {
            Payload::Binary(items) => items.first().map(Vec::as_slice).unwrap_or(&[]),
            Payload::Packed { raw, .. } => raw,
            _ => &[],
        }
    }

    /// Raw wire payload retained by a decoded PACKED node
    pub fn raw_payload(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Packed { raw, .. } if !raw.is_empty() => Some(raw),
            _ => None,
        }
    }

    /// Child nodes of a container; empty for leaf kinds
    pub fn children(&self) -> &[Node] {
        match &self.payload {
            Payload::Group(children)
            | Payload::Packed { children, .. }
            | Payload::Repeat(children)
            | Payload::Root(children) => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.payload {
            Payload::Group(children)
            | Payload::Packed { children, .. }
            | Payload::Repeat(children)
            | Payload::Root(children) => Some(children),
            _ => None,
        }
    }

    /// The unique child with `tag`, or the UNDEFINED sentinel
    pub fn child(&self, tag: u32) -> &Node {
        self.children()
            .iter()
            .find(|c| c.tag == tag)
            .unwrap_or(&UNDEFINED)
    }

    /// The child at `index` in insertion order, or the UNDEFINED sentinel
    pub fn at(&self, index: usize) -> &Node {
        self.children().get(index).unwrap_or(&UNDEFINED)
    }

    /// True if a child with `tag` exists
    pub fn has(&self, tag: u32) -> bool {
        self.children().iter().any(|c| c.tag == tag)
    }

    /// True if this node has any children
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// False only for the UNDEFINED kind, i.e. the root and lookup misses
    pub fn is_defined(&self) -> bool {
        self.kind() != NodeKind::Undefined
    }

    /// True when this tag occurred more than once on the wire: an explicit
    /// REPEAT wrapper or a multi-valued scalar/binary node
    pub fn is_repeat(&self) -> bool {
        self.kind() == NodeKind::Repeat || self.values().len() > 1 || self.byte_strings().len() > 1
    }

    // ---- mutation --------------------------------------------------------

    /// Append a scalar value; no effect on non-scalar nodes
    pub fn append_value(&mut self, value: u64) {
        if let Payload::Varint(values) | Payload::I32(values) | Payload::I64(values) =
            &mut self.payload
        {
            values.push(value);
        }
    }

    /// Append a byte string; no effect on non-BINARY nodes
    pub fn append_bytes(&mut self, bytes: impl Into<Vec<u8>>) {
        if let Payload::Binary(items) = &mut self.payload {
            items.push(bytes.into());
        }
    }

    /// Replace all scalar values with a single one; no effect on non-scalar nodes
    pub fn set_value(&mut self, value: u64) {
        if let Payload::Varint(values) | Payload::I32(values) | Payload::I64(values) =
            &mut self.payload
        {
            values.clear();
            values.push(value);
        }
    }

    /// Replace all byte strings with a single one; no effect on non-BINARY nodes
    pub fn set_bytes(&mut self, bytes: impl Into<Vec<u8>>) {
        if let Payload::Binary(items) = &mut self.payload {
            items.clear();
            items.push(bytes.into());
        }
    }

    /// Insert a child, collapsing a duplicate tag into the existing node.
    ///
    /// Same-kind scalar and binary occurrences concatenate their values;
    /// a second group or packed occurrence promotes the pair to a REPEAT
    /// wrapper; a mismatched kind is silently dropped. Leaf nodes cannot
    /// take children and ignore the call.
    pub fn append_child(&mut self, child: Node) {
        merge::merge_child(self, child, false).expect("lenient merge cannot fail");
    }

    /// Insert several children in order, merging each as [`Node::append_child`] does
    pub fn append_children(&mut self, children: impl IntoIterator<Item = Node>) {
        for child in children {
            self.append_child(child);
        }
    }

    /// Drop all children, then insert the given ones with merging
    pub fn set_children(&mut self, children: Vec<Node>) {
        if let Some(existing) = self.children_mut() {
            existing.clear();
        }
        self.append_children(children);
    }
}

impl Index<u32> for Node {
    type Output = Node;

    /// Subscript lookup by tag, returning the UNDEFINED sentinel on a miss
    fn index(&self, tag: u32) -> &Node {
        self.child(tag)
    }
}

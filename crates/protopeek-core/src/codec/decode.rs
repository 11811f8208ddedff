//! Wire-format decoding into a field tree.
//!
//! The decoder walks the buffer field by field, merging each one into the
//! current parent. Two constructs recurse: groups (framed by SGROUP/EGROUP
//! keys) and the speculative reinterpretation of LEN payloads. Every
//! length-delimited payload is optimistically re-parsed as a nested message,
//! and promoted to a PACKED node when that parse consumes the payload
//! exactly. A failed speculative parse is not an error; the payload simply
//! stays BINARY.

use crate::error::{Error, Result};
use crate::field::{merge::merge_child, Node, NodeKind, Payload};
use crate::wire::{decode_varint, WireKind};
use tracing::{debug, trace};

/// Default recursion limit for nested groups and packed payloads
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for the decoder
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum call depth at which a LEN payload may be reinterpreted as a
    /// nested message. `-1` means unbounded, `0` disables reinterpretation,
    /// `k` allows it at depths `<= k` with the top call being depth 1.
    pub packed_depth: i32,
    /// Hard recursion limit guarding against stack exhaustion
    pub max_depth: usize,
    /// Reject stray group terminators and merge kind conflicts instead of
    /// skipping them
    pub strict: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            packed_depth: -1,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

impl DecodeOptions {
    /// Creates options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the speculative reinterpretation depth
    pub fn packed_depth(mut self, depth: i32) -> Self {
        self.packed_depth = depth;
        self
    }

    /// Sets the recursion limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enables or disables strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Outcome of a decode run.
///
/// The partially built tree is returned even on failure so callers can
/// inspect or render whatever decoded cleanly before the defect.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    /// The decoded tree; partial when `error` is set
    pub root: Node,
    /// Bytes consumed at the top level before success or failure
    pub consumed: usize,
    /// Bytes left unconsumed at the top level
    pub remaining: usize,
    /// The defect that stopped decoding, if any
    pub error: Option<Error>,
}

impl DecodeReport {
    /// True when the whole buffer decoded cleanly
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts the report into a `Result`, discarding the partial tree on
    /// failure
    pub fn into_result(self) -> Result<Node> {
        match self.error {
            None => Ok(self.root),
            Some(error) => Err(error),
        }
    }
}

/// Decode a complete buffer with default options.
///
/// Speculative reinterpretation is unbounded; pass explicit
/// [`DecodeOptions`] to [`decode_with`] to control it. An empty buffer is
/// an error, which also keeps zero-length LEN payloads from reading as
/// empty nested messages.
pub fn decode(data: &[u8]) -> Result<Node> {
    decode_with(data, &DecodeOptions::default()).into_result()
}

/// Decode a complete buffer, reporting progress even on failure
pub fn decode_with(data: &[u8], options: &DecodeOptions) -> DecodeReport {
    debug!(
        len = data.len(),
        packed_depth = options.packed_depth,
        "decoding buffer"
    );

    let mut root = Node::default();
    let report = match decode_fields(&mut root, data, 0, 1, options) {
        Ok(frame) => DecodeReport {
            root,
            consumed: frame.consumed,
            remaining: frame.remaining,
            error: None,
        },
        Err(abort) => DecodeReport {
            root,
            consumed: abort.consumed,
            remaining: abort.remaining,
            error: Some(abort.error),
        },
    };

    match &report.error {
        None => debug!(consumed = report.consumed, "decode complete"),
        Some(error) => debug!(%error, consumed = report.consumed, "decode failed"),
    }
    report
}

/// Clean exit of one recursion frame
struct Frame {
    /// Bytes this frame consumed from its window
    consumed: usize,
    /// Bytes left in the window (non-zero only after a group terminator)
    remaining: usize,
    /// True when the frame exited on an EGROUP key
    ended: bool,
}

/// Failed exit of one recursion frame; `consumed`/`remaining` describe the
/// frame's own progress, while the error keeps the absolute defect offset
struct Abort {
    consumed: usize,
    remaining: usize,
    error: Error,
}

fn decode_fields(
    parent: &mut Node,
    data: &[u8],
    base: usize,
    depth: usize,
    options: &DecodeOptions,
) -> std::result::Result<Frame, Abort> {
    if data.is_empty() {
        return Err(Abort {
            consumed: 0,
            remaining: 0,
            error: Error::truncated_key(base),
        });
    }
    if depth > options.max_depth {
        return Err(Abort {
            consumed: 0,
            remaining: data.len(),
            error: Error::DepthExceeded {
                limit: options.max_depth,
                offset: base,
            },
        });
    }

    let abort = |consumed: usize, error: Error| Abort {
        consumed,
        remaining: data.len() - consumed,
        error,
    };

    let mut pos = 0;
    while pos < data.len() {
        let key_offset = base + pos;
        let Some((key, key_len)) = decode_varint(&data[pos..]) else {
            return Err(abort(pos, Error::truncated_key(key_offset)));
        };
        let kind = match WireKind::from_bits((key & 0x07) as u8, key_offset) {
            Ok(kind) => kind,
            Err(error) => return Err(abort(pos + key_len, error)),
        };
        let tag = (key as u32) >> 3;
        pos += key_len;

        // a key with nothing after it can only be a group terminator
        if pos == data.len() && !(parent.kind() == NodeKind::Group && kind == WireKind::EGroup) {
            return Err(Abort {
                consumed: data.len(),
                remaining: 0,
                error: Error::TruncatedPayload { offset: base + pos },
            });
        }

        match kind {
            WireKind::Varint => {
                let Some((value, size)) = decode_varint(&data[pos..]) else {
                    return Err(abort(pos, Error::truncated_varint(base + pos)));
                };
                pos += size;
                trace!(tag, value, offset = key_offset, "varint field");
                merge_child(parent, Node::varint(tag, value), options.strict)
                    .map_err(|error| abort(pos, error))?;
            }

            WireKind::I64 => {
                let available = data.len() - pos;
                if available < 8 {
                    return Err(abort(pos, Error::truncated_fixed(8, available, base + pos)));
                }
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&data[pos..pos + 8]);
                pos += 8;
                merge_child(parent, Node::i64(tag, u64::from_le_bytes(raw)), options.strict)
                    .map_err(|error| abort(pos, error))?;
            }

            WireKind::I32 => {
                let available = data.len() - pos;
                if available < 4 {
                    return Err(abort(pos, Error::truncated_fixed(4, available, base + pos)));
                }
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&data[pos..pos + 4]);
                pos += 4;
                merge_child(parent, Node::i32(tag, u32::from_le_bytes(raw)), options.strict)
                    .map_err(|error| abort(pos, error))?;
            }

            WireKind::Len => {
                let len_offset = base + pos;
                let Some((declared, size)) = decode_varint(&data[pos..]) else {
                    return Err(abort(pos, Error::truncated_varint(len_offset)));
                };
                pos += size;
                let available = data.len() - pos;
                if declared > available as u64 {
                    return Err(abort(pos, Error::truncated_len(declared, available, len_offset)));
                }
                let payload = &data[pos..pos + declared as usize];

                let node = match try_reparse(tag, payload, base + pos, depth, options) {
                    Some(children) => {
                        trace!(tag, len = payload.len(), "reinterpreted as packed message");
                        Node {
                            tag,
                            payload: Payload::Packed {
                                raw: payload.to_vec(),
                                children,
                            },
                        }
                    }
                    None => Node::binary(tag, payload),
                };
                pos += declared as usize;
                merge_child(parent, node, options.strict).map_err(|error| abort(pos, error))?;
            }

            WireKind::SGroup => {
                let mut sub = Node {
                    tag,
                    payload: Payload::Group(Vec::new()),
                };
                match decode_fields(&mut sub, &data[pos..], base + pos, depth + 1, options) {
                    Ok(frame) if frame.ended => {
                        pos += frame.consumed;
                        merge_child(parent, sub, options.strict)
                            .map_err(|error| abort(pos, error))?;
                    }
                    Ok(_) => {
                        return Err(abort(pos, Error::unterminated_group(tag, key_offset)));
                    }
                    Err(inner) => return Err(abort(pos, inner.error)),
                }
            }

            WireKind::EGroup => {
                if parent.kind() == NodeKind::Group {
                    return Ok(Frame {
                        consumed: pos,
                        remaining: data.len() - pos,
                        ended: true,
                    });
                }
                if options.strict {
                    return Err(abort(
                        pos,
                        Error::unknown_wire_kind(WireKind::EGroup as u8, key_offset),
                    ));
                }
                trace!(tag, offset = key_offset, "skipping stray group end");
            }
        }
    }

    Ok(Frame {
        consumed: pos,
        remaining: 0,
        ended: false,
    })
}

/// Speculatively parse a LEN payload as a nested message.
///
/// Returns the parsed children only when the depth gate allows the attempt
/// and the parse consumes the payload exactly; any failure, including a
/// depth or strictness violation inside the payload, falls back to `None`.
fn try_reparse(
    tag: u32,
    payload: &[u8],
    base: usize,
    depth: usize,
    options: &DecodeOptions,
) -> Option<Vec<Node>> {
    let allowed = options.packed_depth == -1 || depth as i32 <= options.packed_depth;
    if !allowed {
        return None;
    }

    let mut probe = Node {
        tag,
        payload: Payload::Packed {
            raw: Vec::new(),
            children: Vec::new(),
        },
    };
    match decode_fields(&mut probe, payload, base, depth + 1, options) {
        Ok(frame) if frame.remaining == 0 => match probe.payload {
            Payload::Packed { children, .. } => Some(children),
            _ => None,
        },
        _ => None,
    }
}

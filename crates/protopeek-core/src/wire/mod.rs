//! Low-level protobuf wire format: varints, wire kinds and field keys.
//!
//! Each wire field starts with a *key*: a varint packing the field tag and
//! a 3-bit wire kind:
//!
//! ```text
//! key = (tag << 3) | wire_kind
//! ```
//!
//! Wire kinds:
//! - 0: VARINT (variable-length integer)
//! - 1: I64 (8 bytes little-endian)
//! - 2: LEN (length varint followed by that many opaque bytes)
//! - 3: SGROUP / 4: EGROUP (start/end framing of a group)
//! - 5: I32 (4 bytes little-endian)
//!
//! Kinds 6 and 7 are reserved and rejected.

mod varint;

use crate::error::{Error, Result};

pub use varint::{decode_varint, encode_varint, varint_len, MAX_VARINT_BYTES};

/// Wire kinds carried in the low 3 bits of a field key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireKind {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width, little-endian
    I64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Len = 2,
    /// Group start
    SGroup = 3,
    /// Group end
    EGroup = 4,
    /// 32-bit fixed-width, little-endian
    I32 = 5,
}

impl WireKind {
    /// Decode a wire kind from the low 3 bits of a key.
    ///
    /// `offset` is the key's position in the input, used only for error
    /// reporting. The reserved values 6 and 7 (and anything wider) are
    /// rejected with [`Error::UnknownWireKind`].
    pub fn from_bits(bits: u8, offset: usize) -> Result<Self> {
        match bits {
            0 => Ok(WireKind::Varint),
            1 => Ok(WireKind::I64),
            2 => Ok(WireKind::Len),
            3 => Ok(WireKind::SGroup),
            4 => Ok(WireKind::EGroup),
            5 => Ok(WireKind::I32),
            _ => Err(Error::unknown_wire_kind(bits, offset)),
        }
    }
}

impl TryFrom<u8> for WireKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        WireKind::from_bits(value, 0)
    }
}

/// Append the key varint for `(tag, kind)` to `buf`
pub fn encode_key(buf: &mut Vec<u8>, tag: u32, kind: WireKind) {
    encode_varint(buf, (u64::from(tag) << 3) | kind as u64);
}

/// Exact encoded size of the key for `(tag, kind)`
pub fn key_len(tag: u32, kind: WireKind) -> usize {
    varint_len((u64::from(tag) << 3) | kind as u64)
}

/// Decode a field key from the front of `data`.
///
/// Returns `(tag, kind, bytes_consumed)`. `offset` is the key's absolute
/// position in the input, used only for error reporting. Oversized key
/// varints keep their low 32 bits before the tag is extracted.
pub fn decode_key(data: &[u8], offset: usize) -> Result<(u32, WireKind, usize)> {
    let (key, consumed) = decode_varint(data).ok_or_else(|| Error::truncated_key(offset))?;
    let kind = WireKind::from_bits((key & 0x07) as u8, offset)?;
    let tag = (key as u32) >> 3;
    Ok((tag, kind, consumed))
}

//! Error types for the protopeek-core library.
//!
//! Every failure the decoder can report is a *data* error: it describes a
//! defect in the input bytes, not a fault in the caller. The variants carry
//! the absolute byte offset of the defect so callers can localize it.

use crate::field::NodeKind;
use thiserror::Error;

/// Result type alias for protopeek operations
pub type Result<T> = std::result::Result<T, Error>;

/// Decoding errors for protobuf wire data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Field key varint does not fit in the remaining window
    #[error("field key truncated at offset {offset}")]
    TruncatedKey {
        /// Byte offset where the key started
        offset: usize,
    },

    /// Key carries a reserved or impossible wire kind
    #[error("unknown wire kind {kind} in key at offset {offset}")]
    UnknownWireKind {
        /// The offending low 3 bits of the key
        kind: u8,
        /// Byte offset of the key
        offset: usize,
    },

    /// Varint value runs past the end of the buffer
    #[error("varint value truncated at offset {offset}")]
    TruncatedVarint {
        /// Byte offset where the value started
        offset: usize,
    },

    /// Fixed-width payload shorter than its wire kind requires
    #[error("fixed-width value at offset {offset} needs {needed} bytes, {available} left")]
    TruncatedFixed {
        /// Bytes the wire kind requires (4 or 8)
        needed: usize,
        /// Bytes actually remaining
        available: usize,
        /// Byte offset where the value started
        offset: usize,
    },

    /// Length-delimited payload declares more bytes than remain
    #[error("length-delimited field at offset {offset} declares {declared} bytes, {available} left")]
    TruncatedLen {
        /// Length the wire declared
        declared: u64,
        /// Bytes actually remaining
        available: usize,
        /// Byte offset of the length varint
        offset: usize,
    },

    /// Key present but its payload is entirely missing
    #[error("field payload missing at offset {offset}")]
    TruncatedPayload {
        /// Byte offset just past the key
        offset: usize,
    },

    /// A group start key never met a matching group end key
    #[error("group {tag} starting at offset {offset} never terminated")]
    UnterminatedGroup {
        /// Tag of the unterminated group
        tag: u32,
        /// Byte offset of the group start key
        offset: usize,
    },

    /// Nesting of groups and packed payloads exceeded the recursion limit
    #[error("recursion depth limit {limit} exceeded at offset {offset}")]
    DepthExceeded {
        /// The configured limit
        limit: usize,
        /// Byte offset where the one-too-deep field started
        offset: usize,
    },

    /// Strict mode: a field arrived under a tag already holding another kind
    #[error("field {tag}: {incoming} occurrence conflicts with existing {existing} value")]
    KindConflict {
        /// Tag shared by both occurrences
        tag: u32,
        /// Kind already stored under the tag
        existing: NodeKind,
        /// Kind of the arriving occurrence
        incoming: NodeKind,
    },
}

impl Error {
    /// Creates a new truncated-key error
    pub fn truncated_key(offset: usize) -> Self {
        Self::TruncatedKey { offset }
    }

    /// Creates a new unknown-wire-kind error
    pub fn unknown_wire_kind(kind: u8, offset: usize) -> Self {
        Self::UnknownWireKind { kind, offset }
    }

    /// Creates a new truncated-varint error
    pub fn truncated_varint(offset: usize) -> Self {
        Self::TruncatedVarint { offset }
    }

    /// Creates a new truncated-fixed error
    pub fn truncated_fixed(needed: usize, available: usize, offset: usize) -> Self {
        Self::TruncatedFixed {
            needed,
            available,
            offset,
        }
    }

    /// Creates a new truncated-len error
    pub fn truncated_len(declared: u64, available: usize, offset: usize) -> Self {
        Self::TruncatedLen {
            declared,
            available,
            offset,
        }
    }

    /// Creates a new unterminated-group error
    pub fn unterminated_group(tag: u32, offset: usize) -> Self {
        Self::UnterminatedGroup { tag, offset }
    }

    /// Returns true if this error means the input simply ended too early,
    /// as opposed to containing structurally invalid bytes
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::TruncatedKey { .. }
                | Self::TruncatedVarint { .. }
                | Self::TruncatedFixed { .. }
                | Self::TruncatedLen { .. }
                | Self::TruncatedPayload { .. }
        )
    }

    /// Returns the byte offset the error points at, if it has one
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedKey { offset }
            | Self::UnknownWireKind { offset, .. }
            | Self::TruncatedVarint { offset }
            | Self::TruncatedFixed { offset, .. }
            | Self::TruncatedLen { offset, .. }
            | Self::TruncatedPayload { offset }
            | Self::UnterminatedGroup { offset, .. }
            | Self::DepthExceeded { offset, .. } => Some(*offset),
            Self::KindConflict { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::truncated_len(500, 3, 12);
        assert!(err.to_string().contains("declares 500 bytes"));
        assert!(err.to_string().contains("offset 12"));
    }

    #[test]
    fn test_is_truncation() {
        assert!(Error::truncated_key(0).is_truncation());
        assert!(Error::truncated_fixed(8, 2, 4).is_truncation());
        assert!(!Error::unterminated_group(5, 0).is_truncation());
        assert!(!Error::unknown_wire_kind(6, 0).is_truncation());
    }

    #[test]
    fn test_offset() {
        assert_eq!(Error::truncated_varint(7).offset(), Some(7));
        let conflict = Error::KindConflict {
            tag: 1,
            existing: NodeKind::Varint,
            incoming: NodeKind::Binary,
        };
        assert_eq!(conflict.offset(), None);
    }
}

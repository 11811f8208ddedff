//! # protopeek-core
//!
//! A schema-less protocol-buffer codec for reverse engineering, debugging
//! and tooling against protobuf wire payloads when no `.proto` file is
//! available.
//!
//! Given bytes produced by any protobuf encoder, the decoder reconstructs a
//! tree of fields identified by numeric tag and wire kind, the encoder
//! re-emits equivalent bytes, and two renderers produce human- and
//! code-readable views of the tree.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: varints, wire kinds and field keys
//! - [`field`]: the field tree and its merging rules
//! - [`codec`]: decoding and encoding between bytes and trees
//! - [`render`]: human-readable and constructor-literal views
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```
//! use protopeek_core::{decode, encode, render_human, HumanOptions};
//!
//! // tag 1, VARINT, value 150
//! let root = decode(&[0x08, 0x96, 0x01])?;
//! assert_eq!(root.child(1).value(), 150);
//!
//! // re-encoding is byte-exact
//! assert_eq!(encode(&root), [0x08, 0x96, 0x01]);
//!
//! let text = render_human(&root, &HumanOptions::default());
//! assert!(text.contains("1 : 150"));
//! # Ok::<(), protopeek_core::Error>(())
//! ```
//!
//! ## Speculative reinterpretation
//!
//! Length-delimited payloads are opportunistically re-parsed as nested
//! messages and promoted to PACKED nodes when the parse consumes the
//! payload exactly. Callers who know their payloads are flat can disable
//! this with [`DecodeOptions::packed_depth`] set to `0`.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod codec;
pub mod error;
pub mod field;
pub mod render;
pub mod wire;

// Re-export primary types for convenience
pub use codec::{
    decode, decode_with, encode, encoded_len, DecodeOptions, DecodeReport, DEFAULT_MAX_DEPTH,
};
pub use error::{Error, Result};
pub use field::{Node, NodeKind};
pub use render::{escape_bytes, render_human, render_literal, HumanOptions, LiteralOptions};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Decoding and encoding between wire bytes and the field tree.
//!
//! The two directions are asymmetric: encoding is a total function over
//! well-formed trees, while decoding reports data errors through a
//! [`DecodeReport`] that carries the partial tree and the progress made
//! before the defect.
//!
//! ```
//! use protopeek_core::codec::{decode, encode};
//!
//! let root = decode(&[0x08, 0x01]).unwrap();
//! assert_eq!(encode(&root), [0x08, 0x01]);
//! ```

mod decode;
mod encode;

pub use decode::{decode, decode_with, DecodeOptions, DecodeReport, DEFAULT_MAX_DEPTH};
pub use encode::{encode, encoded_len};

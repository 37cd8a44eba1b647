//! # eamuse-codec
//!
//! Codec stack for the e-amusement arcade network protocol.
//! * `lz77` compresses/decompresses over a 4 KiB ring, Konami's variant of
//!   the format with overlapping back-references.
//! * `node` is the typed document model (`Node`, `Kind`, `Scalar`) every
//!   serializer is a pure function over.
//! * `binary` and `xml` are the two interchangeable wire serializers.
//! * `envelope` strips/applies compression framing and sniffs the format.
//! * `session` derives the per-response `X-Eamuse-Info` key from a
//!   process-global LCG.
//!
//! The HTTP front end, the `{game, action}` plugin registry, and process
//! lifecycle concerns are deliberately not part of this crate: it is the
//! codec those things sit on top of, not a server.
//!
//! ## Example
//!
//! ```
//! use eamuse_codec::node::Node;
//! use eamuse_codec::charset::TextCharset;
//! use eamuse_codec::envelope::{self, Compression, PacketFormat};
//!
//! let tree = Node::void("response");
//! let (bytes, info) = envelope::encode(Compression::Lz77, &tree, TextCharset::Utf8, PacketFormat::Binary).unwrap();
//! let decoded = envelope::decode(Compression::Lz77, &info, &bytes).unwrap();
//! assert_eq!(decoded, tree);
//! ```

mod tools;

pub mod binary;
pub mod charset;
pub mod envelope;
pub mod error;
pub mod lz77;
pub mod node;
pub mod session;
pub mod xml;

pub use error::Error;

//! Error taxonomy for the codec stack.
//!
//! Mirrors the five wire-facing categories plus the two dispatch-boundary
//! variants a caller-supplied plugin registry reports through.

use thiserror::Error;

/// Top level error for every operation exposed by this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("lz77: {0}")]
    Lz(#[from] LzError),
    #[error("envelope: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("charset: {0}")]
    Charset(#[from] CharsetError),
    #[error("no handler registered for this game/action")]
    HandlerAbsent,
    #[error("handler returned something other than a node")]
    HandlerReturnedWrong,
}

#[derive(Error, Debug)]
pub enum LzError {
    #[error("unexpected end of stream mid-backref")]
    UnexpectedEof,
    #[error("impossible flag bit pattern encountered")]
    MalformedFlag,
    #[error("backref distance {distance} exceeds the {window}-byte window")]
    BackrefDistanceOutOfWindow { distance: usize, window: usize },
}

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("compression header says {header:?} but payload looks like {sniffed:?}")]
    CompressionMismatch { header: &'static str, sniffed: &'static str },
    #[error("unrecognized magic byte 0x{0:02X}")]
    UnknownMagic(u8),
    #[error("X-Eamuse-Info header value {0:?} is not well formed")]
    MalformedInfo(String),
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unknown type tag 0x{0:02X}")]
    UnknownTag(u8),
    #[error("value segment truncated while reading {what}")]
    TruncatedValue { what: &'static str },
    #[error("6-bit name/attribute decode failed")]
    NameDecode,
    #[error("attribute {0:?} repeated on a single node")]
    DuplicateAttribute(String),
    #[error("document has no root node")]
    EmptyDocument,
    #[error("structure segment truncated")]
    TruncatedStructure,
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("node name {0:?} is not a valid ASCII identifier of at most 63 bytes")]
    InvalidName(String),
    #[error("kind {0:?} has no fixed-size array element layout on this wire")]
    NotArrayCapable(&'static str),
    #[error("document has trailing data after its single root node")]
    TrailingData,
}

#[derive(Error, Debug)]
pub enum CharsetError {
    #[error("bytes are not valid {charset} text")]
    Undecodable { charset: &'static str },
    #[error("unknown charset marker 0x{0:02X}")]
    UnknownMarker(u8),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Text charsets carried in the envelope and binary header's second byte.
//!
//! ASCII and UTF-8 round-trip through `core::str`; the Shift-JIS and EUC-JP
//! markers lean on `encoding_rs`, the same crate most of the pack reaches
//! for when a codec needs a non-Unicode Japanese encoding. ISO-8859-1 is a
//! direct byte-to-codepoint mapping and does not need a crate at all.

use crate::error::{CharsetError, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCharset {
    Ascii,
    Utf8,
    ShiftJis,
    EucJp,
    Iso8859_1,
}

impl TextCharset {
    /// Second byte of the binary header / the envelope's charset sniff.
    pub fn magic_byte(self) -> u8 {
        match self {
            TextCharset::Ascii => 0x42,
            TextCharset::EucJp => 0x44,
            TextCharset::Iso8859_1 => 0x52,
            TextCharset::Utf8 => 0x54,
            TextCharset::ShiftJis => 0x58,
        }
    }

    pub fn from_magic_byte(byte: u8) -> Result<TextCharset, Error> {
        Ok(match byte {
            0x42 => TextCharset::Ascii,
            0x44 => TextCharset::EucJp,
            0x52 => TextCharset::Iso8859_1,
            0x54 => TextCharset::Utf8,
            0x58 => TextCharset::ShiftJis,
            other => return Err(Error::Charset(CharsetError::UnknownMarker(other))),
        })
    }

    /// Label written into the XML prolog's `encoding="..."` attribute.
    pub fn xml_label(self) -> &'static str {
        match self {
            TextCharset::Ascii => "US-ASCII",
            TextCharset::Utf8 => "UTF-8",
            TextCharset::ShiftJis => "SHIFT_JIS",
            TextCharset::EucJp => "EUC-JP",
            TextCharset::Iso8859_1 => "ISO-8859-1",
        }
    }

    pub fn from_xml_label(label: &str) -> Result<TextCharset, Error> {
        Ok(match label.to_ascii_uppercase().as_str() {
            "US-ASCII" | "ASCII" => TextCharset::Ascii,
            "UTF-8" => TextCharset::Utf8,
            "SHIFT_JIS" | "SHIFT-JIS" | "SJIS" => TextCharset::ShiftJis,
            "EUC-JP" | "EUCJP" => TextCharset::EucJp,
            "ISO-8859-1" | "LATIN1" => TextCharset::Iso8859_1,
            _ => return Err(Error::Schema(crate::error::SchemaError::Xml(format!("unrecognized encoding {label:?}")))),
        })
    }

    pub fn name(self) -> &'static str {
        self.xml_label()
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, Error> {
        match self {
            TextCharset::Ascii => {
                if !text.is_ascii() {
                    return Err(Error::Charset(CharsetError::Undecodable { charset: "ASCII" }));
                }
                Ok(text.as_bytes().to_vec())
            }
            TextCharset::Utf8 => Ok(text.as_bytes().to_vec()),
            TextCharset::Iso8859_1 => {
                let mut out = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    let cp = ch as u32;
                    if cp > 0xFF {
                        return Err(Error::Charset(CharsetError::Undecodable { charset: "ISO-8859-1" }));
                    }
                    out.push(cp as u8);
                }
                Ok(out)
            }
            TextCharset::ShiftJis => {
                let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
                if had_errors {
                    return Err(Error::Charset(CharsetError::Undecodable { charset: "Shift-JIS" }));
                }
                Ok(bytes.into_owned())
            }
            TextCharset::EucJp => {
                let (bytes, _, had_errors) = encoding_rs::EUC_JP.encode(text);
                if had_errors {
                    return Err(Error::Charset(CharsetError::Undecodable { charset: "EUC-JP" }));
                }
                Ok(bytes.into_owned())
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, Error> {
        match self {
            TextCharset::Ascii => {
                if !bytes.is_ascii() {
                    return Err(Error::Charset(CharsetError::Undecodable { charset: "ASCII" }));
                }
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            TextCharset::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|_| Error::Charset(CharsetError::Undecodable { charset: "UTF-8" }))
            }
            TextCharset::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextCharset::ShiftJis => {
                let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
                if had_errors {
                    return Err(Error::Charset(CharsetError::Undecodable { charset: "Shift-JIS" }));
                }
                Ok(text.into_owned())
            }
            TextCharset::EucJp => {
                let (text, _, had_errors) = encoding_rs::EUC_JP.decode(bytes);
                if had_errors {
                    return Err(Error::Charset(CharsetError::Undecodable { charset: "EUC-JP" }));
                }
                Ok(text.into_owned())
            }
        }
    }
}

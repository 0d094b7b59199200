//! Session character set handling.
//!
//! Wraps `encoding_rs` so a session can be configured with a charset
//! label ("UTF-8", "ISO-8859-1", ...). Decoding is strict: malformed
//! input is an error, never a replacement character, because a silently
//! mangled message would be handed to downstream processing as if it
//! were valid.

use encoding_rs::{Encoding, UTF_8};

use crate::error::{MllpError, Result};

/// A resolved character encoding for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    /// Resolve a charset from a WHATWG label.
    ///
    /// # Errors
    ///
    /// Returns `MllpError::UnknownCharset` if the label is not in the
    /// encoding registry.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| MllpError::UnknownCharset(label.to_string()))
    }

    /// The UTF-8 charset.
    pub fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode frame bytes strictly.
    ///
    /// # Errors
    ///
    /// Returns `MllpError::Decode` if the bytes are malformed in this
    /// encoding. The error is fatal for the frame.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|cow| cow.into_owned())
            .ok_or(MllpError::Decode {
                charset: self.encoding.name(),
            })
    }

    /// Encode a payload for the outbound envelope.
    ///
    /// Characters unmappable in this encoding are an error rather than
    /// being substituted.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            return Err(MllpError::Decode {
                charset: self.encoding.name(),
            });
        }
        Ok(bytes.into_owned())
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

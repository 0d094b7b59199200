//! Outbound envelope encoding.
//!
//! The writing half of MLLP framing: wrap a payload in the start byte
//! and the two-byte terminator so the peer's scanner can delimit it.
//! Used for acknowledgements and replies.

use crate::charset::Charset;
use crate::error::Result;

use super::Delimiters;

/// Wrap raw payload bytes in the framing markers.
pub fn enclose(payload: &[u8], delimiters: &Delimiters) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 3);
    buf.push(delimiters.start_byte);
    buf.extend_from_slice(payload);
    buf.push(delimiters.end_byte1);
    buf.push(delimiters.end_byte2);
    buf
}

/// Charset-encode a message and wrap it in the framing markers.
///
/// # Errors
///
/// Returns `MllpError::Decode` if the message has characters the
/// session charset cannot represent.
pub fn encode_message(message: &str, delimiters: &Delimiters, charset: Charset) -> Result<Vec<u8>> {
    let payload = charset.encode(message)?;
    Ok(enclose(&payload, delimiters))
}

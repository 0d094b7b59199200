//! MLLP framing protocol.
//!
//! - [`Delimiters`]: the configurable start/end marker bytes
//! - [`DecoderState`]: per-connection scanner for inbound frames
//! - [`enclose`] / [`encode_message`]: outbound envelope encoding

mod delimiters;
mod envelope;
mod scanner;

pub use delimiters::{
    Delimiters, DEFAULT_END_BYTE1, DEFAULT_END_BYTE2, DEFAULT_START_BYTE,
};
pub use envelope::{enclose, encode_message};
pub use scanner::DecoderState;

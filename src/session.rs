//! Per-connection decoding session.
//!
//! Owns the cumulative read buffer and the scanner state for one
//! connection, pairing them for the connection's lifetime. Each socket
//! read is pushed in; every frame completed by that read comes out
//! decoded.
//!
//! Uses `bytes::BytesMut` so the buffer compacts cheaply after each
//! extracted frame.
//!
//! # Example
//!
//! ```
//! use mllp_link::{MllpConfig, MllpSession};
//!
//! let mut session = MllpSession::new(&MllpConfig::default()).unwrap();
//!
//! let mut wire = vec![0x0B];
//! wire.extend_from_slice(b"HELLO");
//! wire.extend_from_slice(&[0x1C, 0x0D]);
//!
//! let messages = session.push(&wire).unwrap();
//! assert_eq!(messages, vec!["HELLO".to_string()]);
//! ```

use bytes::BytesMut;

use crate::charset::Charset;
use crate::config::MllpConfig;
use crate::error::{MllpError, Result};
use crate::protocol::{DecoderState, Delimiters};

/// Decoding state for one connection.
///
/// Single-threaded by construction: the session lives inside the task
/// that drives the connection's reads.
pub struct MllpSession {
    buffer: BytesMut,
    state: DecoderState,
    delimiters: Delimiters,
    charset: Charset,
    max_message_size: usize,
    /// Decode error held back because the same push had already
    /// produced messages; surfaced on the next push.
    deferred_error: Option<MllpError>,
}

impl MllpSession {
    /// Create a session from a validated configuration.
    pub fn new(config: &MllpConfig) -> Result<Self> {
        config.delimiters.validate()?;
        Ok(Self {
            buffer: BytesMut::with_capacity(config.read_buffer_size),
            state: DecoderState::new(),
            delimiters: config.delimiters,
            charset: config.resolve_charset()?,
            max_message_size: config.max_message_size,
            deferred_error: None,
        })
    }

    /// Create a session with the standard MLLP setup.
    pub fn with_defaults() -> Self {
        Self {
            buffer: BytesMut::with_capacity(crate::config::DEFAULT_READ_BUFFER_SIZE),
            state: DecoderState::new(),
            delimiters: Delimiters::default(),
            charset: Charset::default(),
            max_message_size: crate::config::DEFAULT_MAX_MESSAGE_SIZE,
            deferred_error: None,
        }
    }

    /// The session's charset.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// The session's delimiters.
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Number of buffered, not-yet-consumed bytes.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append a socket read and drain every frame it completes.
    ///
    /// Returns the decoded messages in arrival order; empty if the data
    /// left a frame still open. The buffer is compacted after each
    /// extracted frame, so memory tracks the size of the pending frame,
    /// not of the whole connection history.
    ///
    /// Decoded messages are never discarded: if a frame fails to decode
    /// after earlier frames in the same push already decoded, those
    /// messages are returned and the error surfaces on the next push
    /// (the data passed to that push is buffered before the error
    /// returns, so nothing is lost either way).
    ///
    /// # Errors
    ///
    /// `MllpError::Decode` on malformed payload bytes (fatal for the
    /// frame), `MllpError::Protocol` if an unterminated frame exceeds
    /// the configured maximum message size.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(data);

        if let Some(e) = self.deferred_error.take() {
            return Err(e);
        }

        let mut messages = Vec::new();
        while self.state.scan(&self.buffer, &self.delimiters) {
            // The cursor sits just past the frame terminator.
            let consumed = self.state.scan_position();
            let message = self.state.extract(&self.buffer, self.charset);

            let _ = self.buffer.split_to(consumed);
            self.state.rebase(consumed);

            match message {
                Ok(message) => messages.push(message),
                Err(e) if messages.is_empty() => return Err(e),
                Err(e) => {
                    self.deferred_error = Some(e);
                    break;
                }
            }
        }

        self.enforce_max_size()?;

        // Nothing pending: drop inter-frame noise instead of buffering it.
        if !self.state.is_frame_open() && !self.buffer.is_empty() {
            let inspected = self.state.scan_position();
            let _ = self.buffer.split_to(inspected);
            self.state.rebase(inspected);
        }

        Ok(messages)
    }

    fn enforce_max_size(&self) -> Result<()> {
        let pending = match self.state.frame_start() {
            Some(start) => self.buffer.len() - start,
            None => 0,
        };
        if pending > self.max_message_size {
            return Err(MllpError::Protocol(format!(
                "unterminated frame exceeds {} bytes",
                self.max_message_size
            )));
        }
        Ok(())
    }
}

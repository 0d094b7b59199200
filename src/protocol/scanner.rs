//! Stateful MLLP frame scanner.
//!
//! Finds message boundaries in a cumulative byte buffer that grows with
//! each socket read. The scanner resumes where the previous call left
//! off, so non-aligned partial reads never rescan inspected bytes.
//!
//! One [`DecoderState`] is bound to exactly one connection for its
//! lifetime and is only ever touched by the task driving that
//! connection's reads. There is no interior locking.
//!
//! # Example
//!
//! ```
//! use mllp_link::protocol::{DecoderState, Delimiters};
//! use mllp_link::Charset;
//!
//! let delims = Delimiters::default();
//! let mut state = DecoderState::new();
//!
//! let buffer = [&[0x0Bu8][..], &b"HELLO"[..], &[0x1C, 0x0D]].concat();
//! assert!(state.scan(&buffer, &delims));
//! assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "HELLO");
//! ```

use crate::charset::Charset;
use crate::error::{MllpError, Result};

use super::Delimiters;

/// Scanner position within a frame.
///
/// `IDLE -> FRAME_OPEN -> AWAITING_SECOND_END -> FRAME_COMPLETE`, then
/// back to `IDLE` on extraction. Offsets index into the cumulative
/// buffer: `start` is the first content byte (just past the start
/// marker), `end` is one past the last content byte (the first end
/// marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No frame pending; waiting for a start byte.
    Idle,
    /// Start byte seen; accumulating content.
    FrameOpen { start: usize },
    /// First end byte seen; one more terminator byte completes the frame.
    AwaitingSecondEnd { start: usize },
    /// Both end bytes seen; content is `buffer[start..end]`.
    Complete { start: usize, end: usize },
}

/// Per-connection scanning state.
///
/// Created when a connection is accepted, reset after each extracted
/// frame, dropped when the connection closes.
#[derive(Debug, Clone)]
pub struct DecoderState {
    state: ScanState,
    /// Resume cursor: index of the first byte not yet inspected.
    current: usize,
}

impl DecoderState {
    /// Create a fresh state with nothing pending.
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            current: 0,
        }
    }

    /// Whether a complete frame is ready for extraction.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, ScanState::Complete { .. })
    }

    /// Whether a frame start has been seen but not yet terminated.
    pub fn is_frame_open(&self) -> bool {
        matches!(
            self.state,
            ScanState::FrameOpen { .. } | ScanState::AwaitingSecondEnd { .. }
        )
    }

    /// Offset of the first content byte of the pending frame, if any.
    pub fn frame_start(&self) -> Option<usize> {
        match self.state {
            ScanState::Idle => None,
            ScanState::FrameOpen { start }
            | ScanState::AwaitingSecondEnd { start }
            | ScanState::Complete { start, .. } => Some(start),
        }
    }

    /// Index of the first byte not yet inspected.
    pub fn scan_position(&self) -> usize {
        self.current
    }

    /// Resume scanning `buffer` at the saved cursor.
    ///
    /// Returns true iff a complete frame is ready. Scanning stops as
    /// soon as a frame completes; bytes after it stay uninspected until
    /// the frame is extracted and scanning resumes.
    ///
    /// A start byte seen while a frame is already open violates the
    /// protocol; it is dropped with a warning and the pending frame is
    /// kept (no resynchronization to the newer marker).
    pub fn scan(&mut self, buffer: &[u8], delimiters: &Delimiters) -> bool {
        if self.is_complete() {
            return true;
        }

        while self.current < buffer.len() {
            let b = buffer[self.current];
            self.current += 1;

            match self.state {
                ScanState::Idle => {
                    if b == delimiters.start_byte {
                        self.state = ScanState::FrameOpen {
                            start: self.current,
                        };
                    }
                    // Bytes outside any frame are discarded.
                }
                ScanState::FrameOpen { start } => {
                    if b == delimiters.end_byte1 {
                        self.state = ScanState::AwaitingSecondEnd { start };
                    } else if b == delimiters.start_byte {
                        tracing::warn!(
                            offset = self.current - 1,
                            "start byte inside open frame, dropping"
                        );
                    }
                }
                ScanState::AwaitingSecondEnd { start } => {
                    if b == delimiters.end_byte2 {
                        // Exclude both end markers from the content.
                        self.state = ScanState::Complete {
                            start,
                            end: self.current - 2,
                        };
                        return true;
                    } else if b == delimiters.start_byte {
                        tracing::warn!(
                            offset = self.current - 1,
                            "start byte inside open frame, dropping"
                        );
                        self.state = ScanState::FrameOpen { start };
                    } else if b != delimiters.end_byte1 {
                        // Lone end byte, not a terminator after all.
                        tracing::warn!(
                            offset = self.current - 1,
                            "first end byte not followed by second, continuing frame"
                        );
                        self.state = ScanState::FrameOpen { start };
                    }
                }
                ScanState::Complete { .. } => unreachable!("scan past complete frame"),
            }
        }

        false
    }

    /// Decode the completed frame's content and reset to idle.
    ///
    /// Must only be called after [`scan`](Self::scan) returned true.
    /// The state is reset even if decoding fails, so the caller may skip
    /// the bad frame and keep the connection.
    ///
    /// # Errors
    ///
    /// `MllpError::Protocol` if no complete frame is pending;
    /// `MllpError::Decode` if the content is malformed in `charset`.
    pub fn extract(&mut self, buffer: &[u8], charset: Charset) -> Result<String> {
        let ScanState::Complete { start, end } = self.state else {
            return Err(MllpError::Protocol(
                "extract called without a complete frame".to_string(),
            ));
        };

        let content = &buffer[start..end];
        self.reset();
        charset.decode(content)
    }

    /// Clear the pending frame, keeping the resume cursor.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
    }

    /// Account for `consumed` bytes dropped from the front of the buffer.
    ///
    /// Callers that compact their read buffer (e.g. after extracting a
    /// frame) must rebase so the cursor and any pending offsets keep
    /// indexing the same bytes. Bytes inside a pending frame must not be
    /// dropped.
    pub fn rebase(&mut self, consumed: usize) {
        self.current = self.current.saturating_sub(consumed);
        self.state = match self.state {
            ScanState::Idle => ScanState::Idle,
            ScanState::FrameOpen { start } => ScanState::FrameOpen {
                start: start.saturating_sub(consumed),
            },
            ScanState::AwaitingSecondEnd { start } => ScanState::AwaitingSecondEnd {
                start: start.saturating_sub(consumed),
            },
            ScanState::Complete { start, end } => ScanState::Complete {
                start: start.saturating_sub(consumed),
                end: end.saturating_sub(consumed),
            },
        };
    }

    /// Current state name for diagnostics.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            ScanState::Idle => "Idle",
            ScanState::FrameOpen { .. } => "FrameOpen",
            ScanState::AwaitingSecondEnd { .. } => "AwaitingSecondEnd",
            ScanState::Complete { .. } => "Complete",
        }
    }
}

impl Default for DecoderState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: u8 = 0x0B;
    const END1: u8 = 0x1C;
    const END2: u8 = 0x0D;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![START];
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&[END1, END2]);
        bytes
    }

    #[test]
    fn test_single_complete_frame() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();
        let buffer = framed(b"HELLO");

        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "HELLO");
        assert_eq!(state.state_name(), "Idle");
    }

    #[test]
    fn test_split_across_reads() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        // First read: start byte + "HEL"
        let mut buffer = vec![START, b'H', b'E', b'L'];
        assert!(!state.scan(&buffer, &delims));
        assert_eq!(state.state_name(), "FrameOpen");

        // Second read: "LO" + terminator
        buffer.extend_from_slice(&[b'L', b'O', END1, END2]);
        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "HELLO");
    }

    #[test]
    fn test_terminator_split_between_end_bytes() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        let mut buffer = vec![START, b'X', END1];
        assert!(!state.scan(&buffer, &delims));
        assert_eq!(state.state_name(), "AwaitingSecondEnd");

        buffer.push(END2);
        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "X");
    }

    #[test]
    fn test_no_rescan_of_inspected_bytes() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        let buffer = vec![START, b'A', b'B'];
        assert!(!state.scan(&buffer, &delims));
        assert_eq!(state.scan_position(), 3);

        // Repeated scan with no new data inspects nothing further.
        assert!(!state.scan(&buffer, &delims));
        assert_eq!(state.scan_position(), 3);
    }

    #[test]
    fn test_bytes_before_start_ignored() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        let mut buffer = b"noise".to_vec();
        buffer.extend_from_slice(&framed(b"OK"));

        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "OK");
    }

    #[test]
    fn test_stray_start_byte_dropped() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        // Second start byte arrives mid-frame; the original frame wins.
        let buffer = vec![START, b'A', START, b'B', END1, END2];
        assert!(state.scan(&buffer, &delims));

        let content = state.extract(&buffer, Charset::utf8()).unwrap();
        assert_eq!(content, format!("A{}B", START as char));
    }

    #[test]
    fn test_lone_end_byte1_is_content() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        // END1 followed by ordinary data does not terminate the frame.
        let buffer = vec![START, b'A', END1, b'B', END1, END2];
        assert!(state.scan(&buffer, &delims));

        let content = state.extract(&buffer, Charset::utf8()).unwrap();
        assert_eq!(content.as_bytes(), &[b'A', END1, b'B'][..]);
    }

    #[test]
    fn test_repeated_end_byte1_before_end_byte2() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        let buffer = vec![START, b'A', END1, END1, END2];
        assert!(state.scan(&buffer, &delims));

        // The earlier END1 lands in the content, the last pair terminates.
        let content = state.extract(&buffer, Charset::utf8()).unwrap();
        assert_eq!(content.as_bytes(), &[b'A', END1][..]);
    }

    #[test]
    fn test_empty_frame() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();
        let buffer = framed(b"");

        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "");
    }

    #[test]
    fn test_scan_stops_at_frame_boundary() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        let mut buffer = framed(b"ONE");
        buffer.extend_from_slice(&framed(b"TWO"));

        assert!(state.scan(&buffer, &delims));
        // Cursor sits just past the first frame's terminator.
        assert_eq!(state.scan_position(), framed(b"ONE").len());

        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "ONE");
        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "TWO");
    }

    #[test]
    fn test_extract_without_frame_is_error() {
        let mut state = DecoderState::new();
        let result = state.extract(b"", Charset::utf8());
        assert!(matches!(result, Err(MllpError::Protocol(_))));
    }

    #[test]
    fn test_extract_resets_on_decode_error() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();
        let buffer = framed(&[0xFF]);

        assert!(state.scan(&buffer, &delims));
        assert!(state.extract(&buffer, Charset::utf8()).is_err());
        // Bad frame is gone; scanner is ready for the next one.
        assert_eq!(state.state_name(), "Idle");
    }

    #[test]
    fn test_rebase_after_compaction() {
        let delims = Delimiters::default();
        let mut state = DecoderState::new();

        let mut buffer = framed(b"ONE");
        let first_len = buffer.len();
        buffer.extend_from_slice(&[START, b'T']);

        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "ONE");

        // Caller compacts the first frame out of the buffer.
        let mut buffer = buffer.split_off(first_len);
        state.rebase(first_len);
        assert_eq!(state.scan_position(), 0);

        buffer.extend_from_slice(&[b'W', b'O', END1, END2]);
        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "TWO");
    }

    #[test]
    fn test_custom_delimiters() {
        let delims = Delimiters::new(b'<', b'>', b'\n');
        let mut state = DecoderState::new();
        let buffer = b"<msg>\n".to_vec();

        assert!(state.scan(&buffer, &delims));
        assert_eq!(state.extract(&buffer, Charset::utf8()).unwrap(), "msg");
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let delims = Delimiters::default();
        let mut stream = Vec::new();
        for payload in [&b"MSH|one"[..], b"", b"MSH|two", b"MSH|three"] {
            stream.extend_from_slice(&framed(payload));
        }

        // Reference: single chunk.
        let mut reference = Vec::new();
        let mut state = DecoderState::new();
        while state.scan(&stream, &delims) {
            reference.push(state.extract(&stream, Charset::utf8()).unwrap());
        }
        assert_eq!(reference.len(), 4);

        // Every chunk size from one byte up.
        for chunk_size in 1..=stream.len() {
            let mut state = DecoderState::new();
            let mut buffer = Vec::new();
            let mut frames = Vec::new();

            for chunk in stream.chunks(chunk_size) {
                buffer.extend_from_slice(chunk);
                while state.scan(&buffer, &delims) {
                    frames.push(state.extract(&buffer, Charset::utf8()).unwrap());
                }
            }

            assert_eq!(frames, reference, "chunk size {}", chunk_size);
        }
    }
}

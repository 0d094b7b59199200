//! Session and server configuration.
//!
//! All fields default to the standard MLLP setup, so `MllpConfig::default()`
//! is a working configuration. JSON deserialization mirrors the field
//! names, with every field optional:
//!
//! ```
//! use mllp_link::MllpConfig;
//!
//! let config = MllpConfig::from_json(r#"{"charset": "ISO-8859-1"}"#).unwrap();
//! assert_eq!(config.max_message_size, 4 * 1024 * 1024);
//! ```

use serde::Deserialize;

use crate::charset::Charset;
use crate::error::Result;
use crate::protocol::Delimiters;

/// Default cap on a single message's framed size.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Default socket read buffer size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for an MLLP session or server.
#[derive(Debug, Clone, Deserialize)]
pub struct MllpConfig {
    /// Frame marker bytes.
    #[serde(default)]
    pub delimiters: Delimiters,
    /// Charset label for payload decoding (WHATWG registry).
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Maximum bytes a single frame may span before the connection is
    /// treated as violating the protocol.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Size of the per-connection socket read buffer.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_max_message_size() -> usize {
    DEFAULT_MAX_MESSAGE_SIZE
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl MllpConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate delimiters and resolve the charset label.
    pub fn validate(&self) -> Result<()> {
        self.delimiters.validate()?;
        self.resolve_charset()?;
        Ok(())
    }

    /// Resolve the configured charset label.
    pub fn resolve_charset(&self) -> Result<Charset> {
        Charset::for_label(&self.charset)
    }
}

impl Default for MllpConfig {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            charset: default_charset(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

//! # mllp-link
//!
//! Async MLLP (Minimal Lower Layer Protocol) framing plus a
//! store-backed idempotent gate, for building at-most-once message
//! receivers over TCP.
//!
//! ## Architecture
//!
//! - **Framing** ([`protocol`]): a per-connection scanner that finds
//!   message boundaries (start byte, double end byte) across
//!   non-aligned socket reads, and the outbound envelope encoder.
//! - **Session** ([`MllpSession`]): pairs the cumulative read buffer
//!   with one scanner state for a connection's lifetime.
//! - **Server** ([`MllpServer`]): accept loop, per-connection read
//!   loop, acknowledgement replies.
//! - **Idempotency** ([`idempotent`], [`store`]): an at-most-once gate
//!   over any store with atomic put-if-absent.
//!
//! ## Example
//!
//! ```ignore
//! use mllp_link::{MllpConfig, MllpServer};
//!
//! #[tokio::main]
//! async fn main() -> mllp_link::Result<()> {
//!     let server = MllpServer::bind(
//!         "0.0.0.0:2575",
//!         MllpConfig::default(),
//!         |message: String| async move { Ok(Some(ack_for(&message))) },
//!     )
//!     .await?;
//!     server.serve().await
//! }
//! # fn ack_for(_m: &str) -> String { String::new() }
//! ```

pub mod idempotent;
pub mod protocol;
pub mod store;
pub mod transport;

mod charset;
mod config;
mod error;
mod server;
mod session;

pub use charset::Charset;
pub use config::MllpConfig;
pub use error::{MllpError, Result};
pub use idempotent::IdempotentRepository;
pub use server::{serve_connection, MessageHandler, MllpServer};
pub use session::MllpSession;

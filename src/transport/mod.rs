//! Network transport for MLLP connections.

mod tcp;

pub use tcp::{connect, MllpListener};

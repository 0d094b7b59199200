//! Minimal deduplicating MLLP receiver.
//!
//! Listens on 127.0.0.1:2575, acknowledges each message, and flags
//! redeliveries (keyed by the message's first `|`-separated field).
//!
//! ```sh
//! cargo run --example mllp_echo
//! printf '\x0bmsg-1|hello\x1c\x0d' | nc 127.0.0.1 2575 | xxd
//! ```

use std::sync::Arc;

use mllp_link::store::MemoryKeyStore;
use mllp_link::{IdempotentRepository, MllpConfig, MllpServer};

#[tokio::main]
async fn main() -> mllp_link::Result<()> {
    tracing_subscriber::fmt().init();

    let gate = Arc::new(IdempotentRepository::new(MemoryKeyStore::new()));

    let handler = move |message: String| {
        let gate = gate.clone();
        async move {
            let key = message.split('|').next().unwrap_or("").to_string();
            let reply = if gate.add(&key).await? {
                tracing::info!(%key, "accepted");
                format!("ACK|{key}")
            } else {
                tracing::info!(%key, "duplicate");
                format!("DUP|{key}")
            };
            Ok::<_, mllp_link::MllpError>(Some(reply))
        }
    };

    let server = MllpServer::bind("127.0.0.1:2575", MllpConfig::default(), handler).await?;
    tracing::info!(addr = %server.local_addr(), "listening");
    server.serve().await
}

//! MLLP server: accept loop, per-connection read loop, reply path.
//!
//! Each accepted connection gets its own task owning an
//! [`MllpSession`]; decoded messages go to the configured
//! [`MessageHandler`], and any reply it returns is envelope-encoded and
//! written back on the same connection (the MLLP acknowledgement
//! pattern).
//!
//! Connections are handled serially within themselves — MLLP peers
//! expect an acknowledgement before the next message — while separate
//! connections run concurrently.
//!
//! # Example
//!
//! ```ignore
//! use mllp_link::{MllpConfig, MllpServer};
//!
//! #[tokio::main]
//! async fn main() -> mllp_link::Result<()> {
//!     let server = MllpServer::bind(
//!         "0.0.0.0:2575",
//!         MllpConfig::default(),
//!         |message: String| async move {
//!             println!("received: {message}");
//!             Ok(Some("ACK".to_string()))
//!         },
//!     )
//!     .await?;
//!
//!     server.serve().await
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::ToSocketAddrs;

use crate::config::MllpConfig;
use crate::error::{MllpError, Result};
use crate::protocol::encode_message;
use crate::session::MllpSession;
use crate::transport::MllpListener;

/// Receives each decoded inbound message.
///
/// Return `Ok(Some(reply))` to send an acknowledgement back on the
/// connection, `Ok(None)` for no reply. An error closes the connection.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn on_message(&self, message: String) -> Result<Option<String>>;
}

/// Closures `Fn(String) -> impl Future<Output = Result<Option<String>>>`
/// are handlers.
#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    async fn on_message(&self, message: String) -> Result<Option<String>> {
        (self)(message).await
    }
}

/// A bound MLLP server.
pub struct MllpServer {
    listener: MllpListener,
    config: MllpConfig,
    handler: Arc<dyn MessageHandler>,
}

impl MllpServer {
    /// Bind to `addr` with a validated configuration and a handler.
    pub async fn bind<A, H>(addr: A, config: MllpConfig, handler: H) -> Result<Self>
    where
        A: ToSocketAddrs,
        H: MessageHandler,
    {
        config.validate()?;
        let listener = MllpListener::bind(addr).await?;
        Ok(Self {
            listener,
            config,
            handler: Arc::new(handler),
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    ///
    /// Each connection runs in its own task; a connection error closes
    /// that connection only. Transient accept failures (aborted
    /// handshakes, fd exhaustion) are logged and retried after a short
    /// pause; only fatal listener errors return.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(MllpError::Io(e)) if is_transient_accept_error(&e) => {
                    tracing::warn!(error = %e, "transient accept failure, retrying");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let config = self.config.clone();
            let handler = self.handler.clone();

            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, &config, handler).await {
                    tracing::error!(%peer, error = %e, "connection closed with error");
                } else {
                    tracing::debug!(%peer, "connection closed");
                }
            });
        }
    }
}

/// Pause before retrying a failed accept, so fd exhaustion does not
/// spin the loop while connections drain.
const ACCEPT_RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(100);

/// Whether an accept error clears on its own (retry) or condemns the
/// listener (return).
fn is_transient_accept_error(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    if matches!(
        e.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    ) {
        return true;
    }

    // ENFILE (23) / EMFILE (24): fd exhaustion, clears as connections
    // close. No stable ErrorKind for these.
    #[cfg(unix)]
    if matches!(e.raw_os_error(), Some(23) | Some(24)) {
        return true;
    }

    false
}

/// Drive one connection: read, decode, dispatch, reply.
///
/// Generic over the stream so tests can use in-memory duplex pipes.
/// Returns when the peer closes the connection; any session or handler
/// error propagates and the caller drops the connection (decode errors
/// are fatal at connection level).
pub async fn serve_connection<S>(
    mut stream: S,
    config: &MllpConfig,
    handler: Arc<dyn MessageHandler>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = MllpSession::new(config)?;
    let mut buf = vec![0u8; config.read_buffer_size];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }

        for message in session.push(&buf[..n])? {
            if let Some(reply) = handler.on_message(message).await? {
                let framed = encode_message(&reply, &session.delimiters(), session.charset())?;
                stream.write_all(&framed).await?;
                stream.flush().await?;
            }
        }
    }
}

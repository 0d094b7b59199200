//! TCP listener and connector.
//!
//! MLLP runs over plain TCP; this is a thin layer over tokio's
//! listener that keeps the bound address around and logs connection
//! lifecycle.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::error::Result;

/// TCP listener for inbound MLLP connections.
pub struct MllpListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl MllpListener {
    /// Bind to an address. Use port 0 to let the OS pick one.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::debug!(%local_addr, "listener bound");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept a single connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().await?;
        tracing::debug!(%peer, "connection accepted");
        Ok((stream, peer))
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Connect to an MLLP peer.
pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    Ok(stream)
}

//! TCP connection establishment.
//!
//! The server binds and accepts exactly one peer; the client dials with a
//! timeout. Once connected both sides are symmetric.

use std::{net::SocketAddr, time::Duration};

use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use crate::{
    config::{PeerConfig, Role},
    error::PeerError,
};

/// Listening socket waiting for the other peer.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `addr` (e.g. "localhost:8080", or port 0 for any free port).
    pub async fn bind(addr: &str) -> Result<Self, PeerError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|e| PeerError::Connection(format!("could not listen on {addr}: {e}")))?;

        Ok(Self { inner })
    }

    /// Address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, PeerError> {
        Ok(self.inner.local_addr()?)
    }

    /// Accept a single peer connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), PeerError> {
        let (stream, peer_addr) = self
            .inner
            .accept()
            .await
            .map_err(|e| PeerError::Connection(format!("could not accept connection: {e}")))?;

        stream.set_nodelay(true)?;
        Ok((stream, peer_addr))
    }
}

/// Dial `addr`, giving up after `timeout`.
pub async fn dial(addr: &str, timeout: Duration) -> Result<TcpStream, PeerError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| PeerError::Connection(format!("timed out connecting to {addr}")))?
        .map_err(|e| PeerError::Connection(format!("could not connect to {addr}: {e}")))?;

    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Establish the connection for the configured role.
pub async fn establish(config: &PeerConfig) -> Result<TcpStream, PeerError> {
    let addr = config.address();

    match config.role {
        Role::Server => {
            let listener = Listener::bind(&addr).await?;
            info!(addr = %listener.local_addr()?, "listening for connection");

            let (stream, peer_addr) = listener.accept().await?;
            info!(peer = %peer_addr, "accepted connection");
            Ok(stream)
        },
        Role::Client => {
            let stream = dial(&addr, config.connect_timeout).await?;
            info!(peer = %stream.peer_addr()?, "connected");
            Ok(stream)
        },
    }
}

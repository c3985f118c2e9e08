//! Peer and session configuration.

use std::{fmt, str::FromStr, time::Duration};

use zeroize::Zeroizing;

use crate::error::PeerError;

/// Which side of the connection this peer takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Listen on the address and accept one peer.
    Server,
    /// Dial the address.
    Client,
}

impl FromStr for Role {
    type Err = PeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "client" => Ok(Self::Client),
            other => Err(PeerError::Config(format!(
                "invalid role '{other}': valid roles are 'server' or 'client'"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => f.write_str("server"),
            Self::Client => f.write_str("client"),
        }
    }
}

/// Shared secret both peers agreed on out of band.
///
/// Zeroized on drop; `Debug` never shows the bytes.
#[derive(Clone)]
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Wrap raw password bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw password bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True for a zero-length password.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Limits for a running session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the inbound and outbound message queues.
    pub queue_depth: usize,
    /// Longest accepted inbound line, in bytes of base64 text.
    pub max_line_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { queue_depth: 32, max_line_len: 64 * 1024 }
    }
}

/// Peer configuration.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Listen or dial
    pub role: Role,
    /// Host to bind to or dial
    pub host: String,
    /// Port to bind to or dial
    pub port: u16,
    /// How long a client waits for the dial to complete
    pub connect_timeout: Duration,
    /// Session limits
    pub session: SessionConfig,
}

impl PeerConfig {
    /// `host:port` string used for bind and dial.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            role: Role::Server,
            host: "localhost".to_string(),
            port: 8080,
            connect_timeout: Duration::from_secs(10),
            session: SessionConfig::default(),
        }
    }
}

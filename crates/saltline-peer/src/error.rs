//! Peer error types.

use std::io;

use saltline_crypto::EnvelopeError;
use thiserror::Error;

use crate::framing::FramingError;

/// Errors that can occur while running a peer.
#[derive(Debug, Error)]
pub enum PeerError {
    /// I/O error on the connection or the console.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Sealing or opening an envelope failed.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// A line could not be turned back into an envelope.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Could not establish the connection to the other peer.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Invalid configuration (unknown role, bad address).
    #[error("configuration error: {0}")]
    Config(String),

    /// A background session task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

impl PeerError {
    /// Returns true if the error concerns only a single inbound message.
    ///
    /// Such messages are discarded and the session continues.
    pub fn is_per_message(&self) -> bool {
        match self {
            Self::Envelope(err) => !err.is_fatal(),
            Self::Framing(_) => true,
            Self::Io(_) | Self::Connection(_) | Self::Config(_) | Self::Task(_) => false,
        }
    }
}

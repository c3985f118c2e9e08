//! Saltline peer.
//!
//! Two parties chat over a direct TCP connection. Every line typed on the
//! console is sealed with [`saltline_crypto`] under the shared password and
//! sent as one base64 line; every line received is opened and printed.
//!
//! # Components
//!
//! - [`transport`]: listen/accept or dial, depending on [`Role`]
//! - [`LineCodec`]: envelope ↔ line framing plus seal/open
//! - [`run_session`]: the read and write pumps for one connection
//!
//! The password must already be shared out of band. There is no key
//! exchange, no sender authentication and no tamper detection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
mod error;
pub mod framing;
mod session;
pub mod transport;

pub use config::{Password, PeerConfig, Role, SessionConfig};
pub use error::PeerError;
pub use framing::{FramingError, LineCodec};
pub use session::{SessionSummary, run_session};
use tokio::io::{AsyncBufRead, AsyncWrite};

/// Connect according to `config` and run one session to completion.
pub async fn run<I, O>(
    config: &PeerConfig,
    password: Password,
    console_in: I,
    console_out: O,
) -> Result<SessionSummary, PeerError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let stream = transport::establish(config).await?;
    let codec = LineCodec::new(password, config.session.max_line_len);

    run_session(stream, console_in, console_out, codec, &config.session).await
}

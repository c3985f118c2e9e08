//! Saltline peer binary.
//!
//! # Usage
//!
//! ```bash
//! # Terminal 1
//! saltline server localhost 8080
//!
//! # Terminal 2
//! saltline client localhost 8080
//! ```
//!
//! The password is read from `SALTLINE_PASSWORD`, or prompted for on start.

use std::{error::Error, time::Duration};

use clap::Parser;
use saltline_peer::{Password, PeerConfig, PeerError, Role, SessionConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the shared password.
const PASSWORD_ENV: &str = "SALTLINE_PASSWORD";

/// Saltline encrypted chat peer
#[derive(Parser, Debug)]
#[command(name = "saltline")]
#[command(about = "Password-encrypted two-party chat over TCP")]
#[command(version)]
struct Args {
    /// Role: server (listen) or client (dial)
    role: Role,

    /// Host to listen on or connect to
    #[arg(default_value = "localhost")]
    host: String,

    /// Port to listen on or connect to
    #[arg(default_value = "8080")]
    port: u16,

    /// Seconds to wait when connecting as client
    #[arg(long, default_value = "10")]
    connect_timeout: u64,

    /// Capacity of the inbound and outbound message queues
    #[arg(long, default_value = "32")]
    queue_depth: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries chat text only
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = PeerConfig {
        role: args.role,
        host: args.host,
        port: args.port,
        connect_timeout: Duration::from_secs(args.connect_timeout),
        session: SessionConfig { queue_depth: args.queue_depth.max(1), ..Default::default() },
    };

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let result = runtime.block_on(run(config));

    // A pending stdin read cannot be cancelled and would block a normal shutdown
    runtime.shutdown_background();

    Ok(result?)
}

async fn run(config: PeerConfig) -> Result<(), PeerError> {
    tracing::info!(role = %config.role, addr = %config.address(), "Saltline peer starting");

    let mut console = BufReader::new(tokio::io::stdin());
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(value) => Password::from(value),
        Err(_) => prompt_password(&mut console).await?,
    };

    if password.is_empty() {
        tracing::warn!("Empty password - messages are trivially decryptable");
    }

    let summary = saltline_peer::run(&config, password, console, tokio::io::stdout()).await?;
    tracing::debug!(?summary, "peer exiting");

    Ok(())
}

async fn prompt_password<R>(console: &mut R) -> Result<Password, PeerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stderr = tokio::io::stderr();
    stderr.write_all(b"Enter password: ").await?;
    stderr.flush().await?;

    let mut line = String::new();
    if console.read_line(&mut line).await? == 0 {
        return Err(PeerError::Config("no password given".to_string()));
    }

    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Password::from(line))
}

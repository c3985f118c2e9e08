//! Two-direction message pump for one connection.
//!
//! ```text
//! console_in ──seal──▶ outbound queue ──▶ write task ──▶ connection
//! connection ──▶ read task ──open──▶ inbound queue ──▶ console_out
//! ```
//!
//! Both queues are bounded. Console EOF half-closes the connection and the
//! session keeps receiving until the other peer closes its side.

use std::{io, sync::Arc};

use tokio::{
    io::{
        AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader, ReadHalf, WriteHalf,
    },
    sync::mpsc::{self, OwnedPermit, error::SendError},
    task::JoinError,
};
use tracing::{debug, info, warn};

use crate::{
    config::SessionConfig,
    error::PeerError,
    framing::{FramingError, LineCodec},
};

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Messages sealed and queued for the peer.
    pub sent: u64,
    /// Messages opened and written to the console.
    pub received: u64,
    /// Inbound lines discarded because they could not be opened.
    pub rejected: u64,
}

/// Result of reading one inbound line.
#[derive(Debug)]
enum Inbound {
    Message(Vec<u8>),
    Rejected(PeerError),
}

/// Why the main loop stopped without an error of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ended {
    PeerClosed,
    WriterStopped,
}

/// Run a chat session over `conn` until the other peer closes it.
///
/// Lines read from `console_in` are sealed and sent. Messages from the
/// peer are written to `console_out`, one per line. Lines that fail to
/// open, including lines longer than `config.max_line_len`, are logged
/// and skipped.
///
/// A console line is only read once the outbound queue has room for it,
/// so a slow connection never stalls delivery of inbound messages.
///
/// # Errors
///
/// - `Io`: console or connection failure
/// - `Envelope`: sealing failed (entropy source unavailable)
/// - `Task`: a background task panicked
pub async fn run_session<C, I, O>(
    conn: C,
    console_in: I,
    mut console_out: O,
    codec: LineCodec,
    config: &SessionConfig,
) -> Result<SessionSummary, PeerError>
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (conn_rd, conn_wr) = tokio::io::split(conn);
    let codec = Arc::new(codec);

    let (outbound_tx, outbound_rx) = mpsc::channel::<String>(config.queue_depth);
    let (inbound_tx, mut inbound_rx) = mpsc::channel::<Inbound>(config.queue_depth);

    let mut writer = tokio::spawn(write_loop(conn_wr, outbound_rx));
    let reader =
        tokio::spawn(read_loop(conn_rd, Arc::clone(&codec), config.max_line_len, inbound_tx));

    let mut summary = SessionSummary::default();
    let mut console = console_in.lines();
    let mut outbound = Some(outbound_tx);
    let mut permit: Option<OwnedPermit<String>> = None;
    let mut writer_done = false;

    let ended: Result<Ended, PeerError> = loop {
        tokio::select! {
            // Console first, so typed lines are queued before a peer close is seen
            biased;

            line = console.next_line(), if permit.is_some() => {
                let text = match line {
                    Ok(Some(text)) => text,
                    Ok(None) => {
                        debug!("console closed, half-closing connection");
                        permit = None;
                        outbound = None;
                        continue;
                    },
                    Err(e) => break Err(e.into()),
                };

                let sealed = match codec.seal(text.as_bytes()) {
                    Ok(sealed) => sealed,
                    Err(e) => break Err(e),
                };
                debug!(envelope_len = sealed.len(), "sending message");

                if let Some(slot) = permit.take() {
                    let _ = slot.send(sealed);
                    summary.sent += 1;
                }
            },

            reserved = reserve_slot(outbound.clone()),
                if outbound.is_some() && permit.is_none() =>
            {
                match reserved {
                    Ok(slot) => permit = Some(slot),
                    Err(_) => break Ok(Ended::WriterStopped),
                }
            },

            inbound = inbound_rx.recv() => match inbound {
                Some(Inbound::Message(plaintext)) => {
                    if let Err(e) = write_console_line(&mut console_out, &plaintext).await {
                        break Err(e.into());
                    }
                    summary.received += 1;
                },
                Some(Inbound::Rejected(reason)) => {
                    warn!(error = %reason, "discarding undecryptable message");
                    summary.rejected += 1;
                },
                None => {
                    info!("peer closed connection");
                    break Ok(Ended::PeerClosed);
                },
            },

            joined = &mut writer, if !writer_done => {
                writer_done = true;
                match flatten_join(joined) {
                    Ok(()) => debug!("write side closed"),
                    Err(e) => break Err(e),
                }
            },
        }
    };

    drop(permit);
    drop(outbound);
    reader.abort();

    let write_result = if writer_done { Ok(()) } else { flatten_join(writer.await) };
    let read_result = match reader.await {
        Ok(res) => res.map_err(PeerError::from),
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(PeerError::Task(e.to_string())),
    };

    let ended = ended?;
    read_result?;
    match (ended, write_result) {
        (_, Ok(())) => {},
        // Peer may close before our half-close lands
        (Ended::PeerClosed, Err(e)) => debug!(error = %e, "write side ended with error"),
        (Ended::WriterStopped, Err(e)) => return Err(e),
    }

    info!(
        sent = summary.sent,
        received = summary.received,
        rejected = summary.rejected,
        "session finished"
    );
    Ok(summary)
}

/// Wait for room in the outbound queue. Never resolves once the console
/// has closed.
async fn reserve_slot(
    outbound: Option<mpsc::Sender<String>>,
) -> Result<OwnedPermit<String>, SendError<()>> {
    match outbound {
        Some(tx) => tx.reserve_owned().await,
        None => std::future::pending().await,
    }
}

/// Read lines from the connection, open them, forward the results.
///
/// At most `max_line_len + 1` bytes of a line are buffered. The remainder
/// of a longer line is skipped and the line is rejected.
async fn read_loop<C>(
    conn_rd: ReadHalf<C>,
    codec: Arc<LineCodec>,
    max_line_len: usize,
    inbound: mpsc::Sender<Inbound>,
) -> io::Result<()>
where
    C: AsyncRead,
{
    let mut reader = BufReader::new(conn_rd);
    let mut line = Vec::new();
    let cap = max_line_len as u64 + 1;

    loop {
        line.clear();
        if (&mut reader).take(cap).read_until(b'\n', &mut line).await? == 0 {
            break;
        }

        let terminated = line.last() == Some(&b'\n');
        let item = if !terminated && line.len() > max_line_len {
            let skipped = discard_line(&mut reader).await?;
            let len = line.len() + skipped;
            Inbound::Rejected(FramingError::LineTooLong { len, max: max_line_len }.into())
        } else {
            if terminated {
                line.pop();
            }
            // Non-UTF-8 bytes become replacement characters and fail base64
            match codec.open(&String::from_utf8_lossy(&line)) {
                Ok(plaintext) => Inbound::Message(plaintext),
                Err(e) => Inbound::Rejected(e),
            }
        };

        if inbound.send(item).await.is_err() {
            break;
        }
    }

    Ok(())
}

/// Skip to just past the next `\n`. Returns the number of bytes skipped,
/// not counting the terminator.
async fn discard_line<R>(reader: &mut R) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;

    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(skipped);
        }

        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(skipped + pos);
            },
            None => {
                let len = buf.len();
                reader.consume(len);
                skipped += len;
            },
        }
    }
}

/// Drain sealed lines onto the connection, then half-close it.
async fn write_loop<C>(
    mut conn_wr: WriteHalf<C>,
    mut outbound: mpsc::Receiver<String>,
) -> io::Result<()>
where
    C: AsyncWrite,
{
    while let Some(line) = outbound.recv().await {
        conn_wr.write_all(line.as_bytes()).await?;
        conn_wr.write_all(b"\n").await?;
        conn_wr.flush().await?;
    }

    conn_wr.shutdown().await
}

async fn write_console_line<O>(console_out: &mut O, plaintext: &[u8]) -> io::Result<()>
where
    O: AsyncWrite + Unpin,
{
    console_out.write_all(plaintext).await?;
    console_out.write_all(b"\n").await?;
    console_out.flush().await
}

fn flatten_join(joined: Result<io::Result<()>, JoinError>) -> Result<(), PeerError> {
    match joined {
        Ok(res) => res.map_err(PeerError::from),
        Err(e) => Err(PeerError::Task(e.to_string())),
    }
}

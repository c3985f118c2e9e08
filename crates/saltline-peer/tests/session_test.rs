//! Session tests over in-memory duplex streams.
//!
//! Each peer gets a duplex "keyboard" for console input and collects its
//! console output in a buffer, so both directions can be driven and
//! observed without sockets or a terminal.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use saltline_peer::{LineCodec, Password, PeerError, SessionConfig, SessionSummary, run_session};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream, ReadBuf},
    task::JoinHandle,
};

const TIMEOUT: Duration = Duration::from_secs(60);

type PeerHandle = JoinHandle<(SessionSummary, Vec<u8>)>;

fn codec(password: &str) -> LineCodec {
    LineCodec::new(Password::from(password), SessionConfig::default().max_line_len)
}

/// Spawn a session on `conn`; returns the keyboard handle and the task.
fn spawn_peer(conn: DuplexStream, password: &str) -> (DuplexStream, PeerHandle) {
    spawn_peer_with(conn, password, SessionConfig::default())
}

fn spawn_peer_with(
    conn: DuplexStream,
    password: &str,
    config: SessionConfig,
) -> (DuplexStream, PeerHandle) {
    let (keyboard, console_in) = tokio::io::duplex(4096);
    let codec = codec(password);

    let handle = tokio::spawn(async move {
        let mut output = Vec::new();
        let summary = run_session(
            conn,
            BufReader::new(console_in),
            &mut output,
            codec,
            &config,
        )
        .await
        .unwrap();
        (summary, output)
    });

    (keyboard, handle)
}

#[tokio::test]
async fn messages_flow_in_both_directions() {
    let (a_conn, b_conn) = tokio::io::duplex(64 * 1024);
    let (mut alice_keys, alice) = spawn_peer(a_conn, "password");
    let (mut bob_keys, bob) = spawn_peer(b_conn, "password");

    alice_keys.write_all(b"hello bob\nsecret message\n").await.unwrap();
    bob_keys.write_all(b"hi alice\n").await.unwrap();

    // Closing both keyboards half-closes both directions and ends the session
    drop(alice_keys);
    drop(bob_keys);

    let (alice_summary, alice_out) = alice.await.unwrap();
    let (bob_summary, bob_out) = bob.await.unwrap();

    assert_eq!(bob_out, b"hello bob\nsecret message\n");
    assert_eq!(alice_out, b"hi alice\n");

    assert_eq!(alice_summary, SessionSummary { sent: 2, received: 1, rejected: 0 });
    assert_eq!(bob_summary, SessionSummary { sent: 1, received: 2, rejected: 0 });
}

#[tokio::test]
async fn peer_close_ends_session_after_flush() {
    let (a_conn, b_conn) = tokio::io::duplex(64 * 1024);
    let (alice_keys, alice) = spawn_peer(a_conn, "password");
    let (mut bob_keys, bob) = spawn_peer(b_conn, "password");

    bob_keys.write_all(b"are you still there?\n").await.unwrap();

    // Alice stops typing; Bob's keyboard stays open
    drop(alice_keys);

    let (bob_summary, bob_out) = bob.await.unwrap();
    let (alice_summary, alice_out) = alice.await.unwrap();
    drop(bob_keys);

    assert_eq!(alice_out, b"are you still there?\n");
    assert_eq!(alice_summary, SessionSummary { sent: 0, received: 1, rejected: 0 });
    assert_eq!(bob_summary.sent, 1);
    assert!(bob_out.is_empty());
}

#[tokio::test]
async fn empty_line_is_delivered() {
    let (a_conn, b_conn) = tokio::io::duplex(64 * 1024);
    let (mut alice_keys, alice) = spawn_peer(a_conn, "password");
    let (bob_keys, bob) = spawn_peer(b_conn, "password");

    alice_keys.write_all(b"\nafter blank\n").await.unwrap();
    drop(alice_keys);
    drop(bob_keys);

    let (_, bob_out) = bob.await.unwrap();
    let (alice_summary, _) = alice.await.unwrap();

    assert_eq!(bob_out, b"\nafter blank\n");
    assert_eq!(alice_summary.sent, 2);
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let (mut raw, b_conn) = tokio::io::duplex(64 * 1024);
    let (bob_keys, bob) = spawn_peer(b_conn, "password");

    let valid = codec("password").seal(b"still works").unwrap();
    let short = saltline_peer::framing::encode_line(&[0u8; 16]);

    raw.write_all(b"not base64 at all!!\n").await.unwrap();
    raw.write_all(format!("{short}\n").as_bytes()).await.unwrap();
    raw.write_all(&[0xFF, 0xFE, b'\n']).await.unwrap();
    raw.write_all(format!("{valid}\n").as_bytes()).await.unwrap();
    raw.shutdown().await.unwrap();

    let (summary, bob_out) = bob.await.unwrap();
    drop(bob_keys);

    assert_eq!(bob_out, b"still works\n");
    assert_eq!(summary.received, 1);
    assert_eq!(summary.rejected, 3);
}

#[tokio::test]
async fn wrong_password_messages_are_rejected() {
    const MESSAGES: usize = 20;

    let (a_conn, b_conn) = tokio::io::duplex(256 * 1024);
    let (mut alice_keys, alice) = spawn_peer(a_conn, "correct");
    let (bob_keys, bob) = spawn_peer(b_conn, "wrong");

    for _ in 0..MESSAGES {
        alice_keys.write_all(b"hello world\n").await.unwrap();
    }
    drop(alice_keys);
    drop(bob_keys);

    let (bob_summary, bob_out) = bob.await.unwrap();
    let _ = alice.await.unwrap();

    // Padding validation lets roughly 1 in 256 wrong keys through as garbage
    assert_eq!(bob_summary.received + bob_summary.rejected, MESSAGES as u64);
    assert!(bob_summary.rejected >= MESSAGES as u64 - 3);
    assert!(!bob_out.windows(11).any(|w| w == b"hello world"));
}

#[tokio::test]
async fn bulk_traffic_both_ways_does_not_stall() {
    const LINES: usize = 20;

    // Transport buffer and queues far smaller than the traffic
    let config = SessionConfig { queue_depth: 1, ..Default::default() };
    let (a_conn, b_conn) = tokio::io::duplex(1024);
    let (mut alice_keys, alice) = spawn_peer_with(a_conn, "password", config.clone());
    let (mut bob_keys, bob) = spawn_peer_with(b_conn, "password", config);

    let line = format!("{}\n", "x".repeat(4000));
    let alice_line = line.clone();
    let alice_typing = tokio::spawn(async move {
        for _ in 0..LINES {
            alice_keys.write_all(alice_line.as_bytes()).await.unwrap();
        }
    });
    let bob_typing = tokio::spawn(async move {
        for _ in 0..LINES {
            bob_keys.write_all(line.as_bytes()).await.unwrap();
        }
    });

    let (alice_result, bob_result) = tokio::time::timeout(TIMEOUT, async {
        alice_typing.await.unwrap();
        bob_typing.await.unwrap();
        (alice.await.unwrap(), bob.await.unwrap())
    })
    .await
    .expect("sessions stalled under bidirectional load");

    let (alice_summary, alice_out) = alice_result;
    let (bob_summary, bob_out) = bob_result;

    let expected = SessionSummary { sent: LINES as u64, received: LINES as u64, rejected: 0 };
    assert_eq!(alice_summary, expected);
    assert_eq!(bob_summary, expected);
    assert_eq!(alice_out.len(), LINES * 4001);
    assert_eq!(bob_out.len(), LINES * 4001);
}

#[tokio::test]
async fn oversized_line_is_rejected_and_session_continues() {
    let config = SessionConfig { max_line_len: 1024, ..Default::default() };
    let (mut raw, b_conn) = tokio::io::duplex(64 * 1024);
    let (bob_keys, bob) = spawn_peer_with(b_conn, "password", config);

    let valid = codec("password").seal(b"after the flood").unwrap();

    // Far past the limit and larger than the transport buffer
    raw.write_all(&vec![b'A'; 256 * 1024]).await.unwrap();
    raw.write_all(b"\n").await.unwrap();
    raw.write_all(format!("{valid}\n").as_bytes()).await.unwrap();
    raw.shutdown().await.unwrap();

    let (summary, bob_out) = tokio::time::timeout(TIMEOUT, bob).await.unwrap().unwrap();
    drop(bob_keys);

    assert_eq!(bob_out, b"after the flood\n");
    assert_eq!(summary, SessionSummary { sent: 0, received: 1, rejected: 1 });
}

#[tokio::test]
async fn unterminated_oversized_line_is_rejected_at_eof() {
    let config = SessionConfig { max_line_len: 1024, ..Default::default() };
    let (mut raw, b_conn) = tokio::io::duplex(64 * 1024);
    let (bob_keys, bob) = spawn_peer_with(b_conn, "password", config);

    raw.write_all(&vec![b'A'; 8 * 1024]).await.unwrap();
    raw.shutdown().await.unwrap();

    let (summary, bob_out) = tokio::time::timeout(TIMEOUT, bob).await.unwrap().unwrap();
    drop(bob_keys);

    assert!(bob_out.is_empty());
    assert_eq!(summary.rejected, 1);
}

/// Connection whose writes always fail and whose reads never complete.
struct BrokenConnection;

impl AsyncRead for BrokenConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl AsyncWrite for BrokenConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn connection_write_failure_is_reported() {
    // More lines than the outbound queue holds
    let input = "hello\n".repeat(200);
    let mut output = Vec::new();

    let result = tokio::time::timeout(
        TIMEOUT,
        run_session(
            BrokenConnection,
            input.as_bytes(),
            &mut output,
            codec("password"),
            &SessionConfig::default(),
        ),
    )
    .await
    .unwrap();

    match result {
        Err(PeerError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected broken pipe, got {other:?}"),
    }
    assert!(output.is_empty());
}

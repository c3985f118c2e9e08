//! Fuzz target for inbound line handling
//!
//! Arbitrary text received from the network must be rejected with a typed
//! error or opened, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use saltline_peer::{framing::decode_line, LineCodec, Password};

const MAX_LINE_LEN: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    if let Ok(bytes) = decode_line(&line, MAX_LINE_LEN) {
        assert!(line.len() <= MAX_LINE_LEN);
        assert!(bytes.len() <= line.len());
    }

    let codec = LineCodec::new(Password::from("fuzz"), MAX_LINE_LEN);
    let _ = codec.open(&line);
});

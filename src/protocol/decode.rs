//! Protocol line decoding

use crate::{Error, Result};
use bytes::BytesMut;

/// Decode one response line from the front of `data`.
///
/// Returns `Ok(None)` when no complete line is buffered yet. A complete line is
/// removed from the buffer and returned without its terminator. Lines end in
/// CRLF; a bare LF is accepted as well.
///
/// Lines longer than `max_len` bytes are rejected, including partial lines that
/// have already grown past the limit, so a peer that never sends a terminator
/// cannot make the buffer grow without bound.
pub fn decode_line(data: &mut BytesMut, max_len: usize) -> Result<Option<String>> {
    let newline = match data.iter().position(|&b| b == b'\n') {
        Some(pos) => pos,
        None => {
            // Leave room for a trailing CR whose LF has not arrived yet
            if data.len() > max_len.saturating_add(1) {
                return Err(Error::Protocol(format!(
                    "response line exceeds maximum length of {} bytes",
                    max_len
                )));
            }
            return Ok(None);
        }
    };

    let mut line = data.split_to(newline + 1);
    line.truncate(newline);
    if line.last() == Some(&b'\r') {
        line.truncate(newline - 1);
    }

    if line.len() > max_len {
        return Err(Error::Protocol(format!(
            "response line of {} bytes exceeds maximum length of {} bytes",
            line.len(),
            max_len
        )));
    }

    String::from_utf8(line.to_vec())
        .map(Some)
        .map_err(|e| Error::Protocol(format!("response line is not valid UTF-8: {}", e)))
}

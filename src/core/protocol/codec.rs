// src/core/protocol/codec.rs

//! Implements the AMI wire framing and the corresponding `Encoder` and
//! `Decoder` for network communication.
//!
//! Incoming bytes accumulate in the decode buffer until the first occurrence
//! of the `\r\n\r\n` block terminator; everything after it stays buffered for
//! the next call, so a terminator split across physical reads is found once
//! its bytes are contiguous.

use crate::core::AmiError;
use crate::core::protocol::action::{ActionRequest, ActionValue};
use crate::core::protocol::message::Message;
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The CRLF (Carriage Return, Line Feed) sequence terminating each line.
const CRLF: &[u8] = b"\r\n";

/// The blank line marking the end of one message block.
const BLOCK_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Protocol-level limit to prevent unbounded buffering on a peer that never
/// sends a terminator. `Follows` payloads are the largest legitimate blocks.
const MAX_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// A `tokio_util::codec` implementation framing and parsing manager messages,
/// and serializing outgoing action requests.
#[derive(Debug, Default)]
pub struct AmiCodec;

impl Decoder for AmiCodec {
    type Item = Message;
    type Error = AmiError;

    /// Yields one parsed [`Message`] per `\r\n\r\n`-delimited block, or
    /// `Ok(None)` when the buffer holds no complete block yet.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match find_terminator(src) {
            Some(pos) => {
                let block = src.split_to(pos);
                src.advance(BLOCK_TERMINATOR.len());
                Ok(Some(Message::parse(&block)))
            }
            None if src.len() > MAX_BLOCK_SIZE => Err(AmiError::Protocol(format!(
                "message block exceeds {MAX_BLOCK_SIZE} bytes without a terminator"
            ))),
            None => Ok(None),
        }
    }
}

impl Encoder<&ActionRequest> for AmiCodec {
    type Error = AmiError;

    /// Serializes an [`ActionRequest`] as CRLF `Key: Value` lines terminated
    /// by a blank line. The correlation id must already be resolved; a line
    /// for it is appended unless the caller supplied it as a parameter.
    fn encode(&mut self, req: &ActionRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let id = req.action_id().ok_or_else(|| {
            AmiError::Protocol(format!(
                "action '{}' has no usable correlation id",
                req.action()
            ))
        })?;

        put_line(dst, "Action", req.action());
        for (key, value) in req.params() {
            match value {
                ActionValue::Single(v) => put_line(dst, key, v),
                ActionValue::Many(vs) => {
                    for v in vs {
                        put_line(dst, key, v);
                    }
                }
            }
        }
        if !req.has_explicit_id() {
            put_line(dst, "ActionID", id);
        }
        dst.extend_from_slice(CRLF);
        Ok(())
    }
}

fn put_line(dst: &mut BytesMut, key: &str, value: &str) {
    dst.extend_from_slice(key.as_bytes());
    dst.extend_from_slice(b": ");
    dst.extend_from_slice(value.as_bytes());
    dst.extend_from_slice(CRLF);
}

/// Helper function to find the block terminator in a buffer.
fn find_terminator(src: &[u8]) -> Option<usize> {
    src.windows(BLOCK_TERMINATOR.len())
        .position(|window| window == BLOCK_TERMINATOR)
}

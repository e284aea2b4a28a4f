// src/manager/connection.rs

//! The owned TCP connection: socket, codec, and the receive buffer holding
//! bytes read but not yet resolved into a full message.

use crate::core::AmiError;
use crate::core::protocol::{ActionRequest, AmiCodec, Message};
use bytes::BytesMut;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};

const READ_CHUNK_CAPACITY: usize = 4096;

#[derive(Debug)]
pub(crate) struct Connection {
    stream: TcpStream,
    codec: AmiCodec,
    /// Invariant: holds at most one partial trailing message between calls;
    /// complete messages are drained before control returns to the caller.
    buf: BytesMut,
}

impl Connection {
    /// Attempts to connect to the given host and port with a configured timeout.
    pub(crate) async fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, AmiError> {
        let addr = format!("{host}:{port}");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                AmiError::Io(Arc::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connection attempt to {addr} timed out"),
                )))
            })??;
        Ok(Self {
            stream,
            codec: AmiCodec,
            buf: BytesMut::with_capacity(READ_CHUNK_CAPACITY),
        })
    }

    /// Reads one `\n`-terminated line. Only used for the greeting banner,
    /// which is the single line the peer sends outside block framing.
    pub(crate) async fn read_banner(&mut self) -> Result<String, AmiError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line = self.buf.split_to(pos + 1);
                return Ok(String::from_utf8_lossy(&line).trim_end().to_string());
            }
            if self.stream.read_buf(&mut self.buf).await? == 0 {
                return Err(AmiError::ConnectionClosed);
            }
        }
    }

    /// Pulls one message: decode whatever is buffered first, read more only
    /// when the decoder reports an incomplete block. End-of-stream with no
    /// remaining terminator is a connection error. When `allow_timeout` is
    /// set and a read timeout is configured, an idle read yields a
    /// Timeout-kind message instead of blocking.
    pub(crate) async fn read_message(
        &mut self,
        allow_timeout: bool,
        read_timeout: Option<Duration>,
    ) -> Result<Message, AmiError> {
        loop {
            if let Some(msg) = self.codec.decode(&mut self.buf)? {
                return Ok(msg);
            }
            let read_fut = self.stream.read_buf(&mut self.buf);
            let n = match read_timeout.filter(|_| allow_timeout) {
                Some(limit) => match tokio::time::timeout(limit, read_fut).await {
                    Ok(res) => res?,
                    Err(_) => return Ok(Message::timeout()),
                },
                None => read_fut.await?,
            };
            if n == 0 {
                return Err(AmiError::ConnectionClosed);
            }
        }
    }

    /// Serializes and writes one action request. Write failures surface as
    /// errors instead of leaving the caller waiting for a response that will
    /// never arrive.
    pub(crate) async fn send(&mut self, req: &ActionRequest) -> Result<(), AmiError> {
        let mut wire = BytesMut::new();
        self.codec.encode(req, &mut wire)?;
        self.stream.write_all(&wire).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub(crate) async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}

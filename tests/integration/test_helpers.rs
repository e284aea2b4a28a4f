// tests/integration/test_helpers.rs

//! A scripted manager peer: accepts one connection and plays the server side
//! of the wire protocol under test control.

use bytes::BytesMut;
use std::future::Future;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Decoder;
use trunkline::{AmiCodec, Config, Message};

pub const BANNER: &[u8] = b"Asterisk Call Manager/1.3\r\n";

pub struct ScriptedPeer {
    stream: TcpStream,
    codec: AmiCodec,
    buf: BytesMut,
}

impl ScriptedPeer {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            codec: AmiCodec,
            buf: BytesMut::new(),
        }
    }

    pub async fn send_banner(&mut self) {
        self.stream.write_all(BANNER).await.unwrap();
    }

    /// Reads one request block off the wire and parses it.
    pub async fn expect_request(&mut self) -> Message {
        loop {
            if let Some(msg) = self.codec.decode(&mut self.buf).unwrap() {
                return msg;
            }
            let n = self.stream.read_buf(&mut self.buf).await.unwrap();
            assert!(n > 0, "client closed before sending a full request");
        }
    }

    /// Reads until the client closes its end of the connection.
    pub async fn expect_eof(&mut self) {
        loop {
            if self.stream.read_buf(&mut self.buf).await.unwrap() == 0 {
                return;
            }
        }
    }

    pub async fn send_fields(&mut self, fields: &[(&str, &str)]) {
        let mut block = String::new();
        for (key, value) in fields {
            block.push_str(key);
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
        block.push_str("\r\n");
        self.stream.write_all(block.as_bytes()).await.unwrap();
    }

    pub async fn send_raw(&mut self, raw: &[u8]) {
        self.stream.write_all(raw).await.unwrap();
    }

    /// Plays the server side of a successful login and returns the
    /// client-generated correlation id.
    pub async fn handle_login(&mut self) -> String {
        self.send_banner().await;
        let login = self.expect_request().await;
        assert_eq!(login.get("Action"), Some("Login"));
        assert_eq!(login.get("Username"), Some("monitor"));
        assert_eq!(login.get("Secret"), Some("hunter2"));
        let id = login.action_id().expect("login carries an id").to_string();
        assert!(!id.is_empty());
        self.send_fields(&[
            ("Response", "Success"),
            ("ActionID", &id),
            ("Message", "Authentication accepted"),
        ])
        .await;
        id
    }
}

/// Binds an ephemeral listener, runs `script` against the one accepted
/// connection, and returns the port plus the script's join handle. Awaiting
/// the handle at the end of a test propagates server-side assertion panics.
pub async fn spawn_peer<F, Fut>(script: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(ScriptedPeer) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        script(ScriptedPeer::new(stream)).await;
    });
    (port, handle)
}

pub fn test_config(port: u16) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port,
        username: "monitor".into(),
        secret: "hunter2".into(),
        ..Config::default()
    }
}

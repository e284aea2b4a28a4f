// src/manager/session.rs

//! Defines the `Manager` which owns the connection and drives the
//! correlation engine: send an action, match its response by id, aggregate
//! list responses, and dispatch events encountered along the way.

use super::connection::Connection;
use crate::config::Config;
use crate::core::AmiError;
use crate::core::events::{EventHandler, EventRegistry, PeerInfo};
use crate::core::protocol::{ActionIdGenerator, ActionRequest, Message, MessageKind};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A client session against one manager peer.
///
/// All reads and writes happen on the task driving the session; there is no
/// background reader. `send_action` suspends the caller until the correlated
/// response arrives, dispatching any events read along the way. The `&mut
/// self` receivers enforce one outstanding correlated request at a time.
pub struct Manager {
    config: Config,
    conn: Option<Connection>,
    registry: EventRegistry,
    ids: ActionIdGenerator,
    peer: PeerInfo,
    authenticated: bool,
}

impl Manager {
    /// Creates a disconnected session. Configuration is passed once, here.
    pub fn new(config: Config) -> Self {
        let peer = PeerInfo {
            host: config.host.clone(),
            port: config.port,
        };
        Self {
            config,
            conn: None,
            registry: EventRegistry::new(),
            ids: ActionIdGenerator::new(),
            peer,
            authenticated: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Registers a handler for an event name, or `*` for the wildcard
    /// fallback. Rejected if the name already has a handler.
    pub fn register_event_handler<H>(&mut self, event: &str, handler: H) -> Result<(), AmiError>
    where
        H: EventHandler + 'static,
    {
        self.registry.register(event, Arc::new(handler))
    }

    /// Removes the handler for an event name. Rejected if none is registered.
    pub fn unregister_event_handler(&mut self, event: &str) -> Result<(), AmiError> {
        self.registry.unregister(event)
    }

    /// Opens the socket, discards the one-line greeting banner, and logs in.
    ///
    /// A rejected login tears the connection down and returns
    /// [`AmiError::Authentication`]; the caller may retry with different
    /// credentials.
    pub async fn connect(&mut self) -> Result<(), AmiError> {
        let mut conn = Connection::open(
            &self.config.host,
            self.config.port,
            self.config.limits.connect_timeout(),
        )
        .await?;
        let banner = conn.read_banner().await?;
        debug!("manager greeting: {banner}");
        self.conn = Some(conn);

        let login = ActionRequest::new("Login")
            .param("Username", self.config.username.clone())
            .param("Secret", self.config.secret.clone());
        let res = self.send_action(login).await?;
        if !res.is_success() {
            let reason = res
                .get_ignore_case("message")
                .unwrap_or("login rejected")
                .to_string();
            self.disconnect().await;
            return Err(AmiError::Authentication(reason));
        }

        self.authenticated = true;
        info!(
            "authenticated against manager peer {}:{}",
            self.peer.host, self.peer.port
        );
        Ok(())
    }

    /// If authenticated, writes a best-effort `Logoff` action without
    /// awaiting its response, then releases the socket unconditionally.
    pub async fn disconnect(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if self.authenticated {
                let mut logoff = ActionRequest::new("Logoff");
                logoff.assign_action_id(self.ids.next_id());
                if let Err(e) = conn.send(&logoff).await {
                    debug!("logoff write failed during disconnect: {e}");
                }
            }
            conn.shutdown().await;
            debug!(
                "disconnected from manager peer {}:{}",
                self.peer.host, self.peer.port
            );
        }
        self.authenticated = false;
    }

    /// Sends one action and blocks until its correlated response (or, for a
    /// list response, the terminal `Complete` marker) arrives.
    ///
    /// The correlation id is taken from a caller-supplied `actionid`
    /// parameter, or generated. Events read while waiting are dispatched
    /// synchronously, in arrival order, before the wait resumes.
    pub async fn send_action(&mut self, mut req: ActionRequest) -> Result<Message, AmiError> {
        let id = match req.action_id() {
            Some(id) => id.to_string(),
            None => {
                let id = self.ids.next_id();
                req.assign_action_id(id.clone());
                id
            }
        };
        let conn = self.conn.as_mut().ok_or(AmiError::NotConnected)?;
        conn.send(&req).await?;
        debug!("sent action '{}' with id {id}", req.action());
        self.wait_response(&id).await
    }

    /// Pulls one message off the wire, dispatching it first if it is an
    /// event. With `allow_timeout` set and a configured read timeout, an
    /// idle read yields a Timeout-kind message instead of blocking forever.
    pub async fn read_event(&mut self, allow_timeout: bool) -> Result<Message, AmiError> {
        self.read_one(allow_timeout).await
    }

    async fn read_one(&mut self, allow_timeout: bool) -> Result<Message, AmiError> {
        let read_timeout = self.config.limits.read_timeout();
        let conn = self.conn.as_mut().ok_or(AmiError::NotConnected)?;
        let msg = conn.read_message(allow_timeout, read_timeout).await?;
        match msg.kind() {
            MessageKind::Timeout if !allow_timeout => {
                return Err(AmiError::Protocol(
                    "empty message from manager peer outside a timeout-tolerant read".into(),
                ));
            }
            MessageKind::Event => self.dispatch_event(&msg),
            MessageKind::Unknown => {
                warn!(fields = ?msg.fields(), "unhandled message type from manager peer");
            }
            _ => {}
        }
        Ok(msg)
    }

    pub(crate) fn next_action_id(&self) -> String {
        self.ids.next_id()
    }

    /// Reads until a message carrying `action_id` is observed, then folds a
    /// list response into its terminal message with an explicit loop bounded
    /// by `limits.max_list_events`.
    pub(crate) async fn wait_response(&mut self, action_id: &str) -> Result<Message, AmiError> {
        let mut res = self.read_until_match(action_id).await?;
        if res.is_list_start() {
            let max = self.config.limits.max_list_events;
            let mut events = Vec::new();
            loop {
                let msg = self.read_until_match(action_id).await?;
                if msg.is_list_complete() {
                    res = msg;
                    break;
                }
                if max != 0 && events.len() >= max {
                    return Err(AmiError::Protocol(format!(
                        "list response for action id '{action_id}' exceeded {max} entries"
                    )));
                }
                events.push(msg);
            }
            res.set_events(events);
        }
        Ok(res)
    }

    /// Non-matching messages are dispatched (if events) by `read_one` and
    /// discarded from the correlation path.
    async fn read_until_match(&mut self, action_id: &str) -> Result<Message, AmiError> {
        loop {
            let msg = self.read_one(false).await?;
            if msg.action_id() == Some(action_id) {
                return Ok(msg);
            }
        }
    }

    /// Routes one event through the registry. A panicking handler is caught
    /// here and logged; it never reaches the correlation wait loop.
    fn dispatch_event(&self, msg: &Message) {
        let Some(name) = msg.event_name() else {
            warn!("event message without an Event field, not dispatching");
            return;
        };
        let name = name.to_ascii_lowercase();
        let Some(handler) = self.registry.lookup(&name) else {
            debug!("no event handler for '{name}'");
            return;
        };
        debug!("dispatching event '{name}'");
        if catch_unwind(AssertUnwindSafe(|| handler.on_event(&name, msg, &self.peer))).is_err() {
            warn!("event handler for '{name}' panicked");
        }
    }
}

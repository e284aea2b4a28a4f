// src/core/protocol/message.rs

//! Implements the parsed AMI message structure and the classification of one
//! delimited block into it.

use indexmap::IndexMap;

/// The sentinel line terminating the free-text payload of a `Follows` response.
const FOLLOWS_SENTINEL: &str = "--END COMMAND--";

/// The reserved field holding a multi-line `Follows` payload.
const DATA_KEY: &str = "data";

/// Classification of a message, taken from the key of its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A reply correlated to an action (`Response: ...`).
    Response,
    /// An unsolicited notification (`Event: ...`).
    Event,
    /// A placeholder produced when an allowed read timeout elapsed.
    Timeout,
    /// Any other first-line key. Tolerated, never rejected.
    Unknown,
}

/// One classified manager message: a kind tag, an ordered-insertion key/value
/// mapping, and, on the terminal message of an aggregated list response, the
/// ordered sub-messages collected under `events`.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    kind: MessageKind,
    fields: IndexMap<String, String>,
    events: Vec<Message>,
}

impl Message {
    /// Parses one delimited block of CRLF-separated lines.
    ///
    /// Parsing is total: a line without a colon yields an empty value, and an
    /// unknown first-line key tags the message [`MessageKind::Unknown`]
    /// instead of failing.
    pub fn parse(block: &[u8]) -> Self {
        let text = String::from_utf8_lossy(block);
        let mut lines: Vec<&str> = text.split("\r\n").collect();

        let first = lines.first().copied().unwrap_or("");
        let (type_key, type_value) = match first.split_once(": ") {
            Some((k, v)) => (k, v),
            None => (first, ""),
        };
        let kind = match type_key.to_ascii_lowercase().as_str() {
            "response" => MessageKind::Response,
            "event" => MessageKind::Event,
            "" => MessageKind::Timeout,
            _ => MessageKind::Unknown,
        };

        // A `Follows` response carries a free-text payload in its last line,
        // terminated by the sentinel. The payload's inner lines are separated
        // by bare `\n`, so the whole payload lands in one CRLF-split element.
        // That element never reaches the key/value pass below.
        let mut payload = None;
        if type_value == "Follows"
            && let Some(last) = lines.pop()
            && let Some(pos) = last.find(FOLLOWS_SENTINEL)
        {
            let body = &last[..pos];
            payload = Some(body.strip_suffix('\n').unwrap_or(body).to_string());
        }

        let has_payload = payload.is_some();
        let mut fields = IndexMap::new();
        if let Some(data) = payload {
            fields.insert(DATA_KEY.to_string(), data);
        }

        for line in lines {
            if line.is_empty() {
                continue;
            }
            let (key, value) = match line.split_once(':') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (line.trim(), ""),
            };
            // A literal `data:` line must not clobber an extracted payload.
            if has_payload && key == DATA_KEY {
                continue;
            }
            fields.insert(key.to_string(), value.to_string());
        }

        Self {
            kind,
            fields,
            events: Vec::new(),
        }
    }

    /// The placeholder returned when an allowed read timeout elapsed.
    pub fn timeout() -> Self {
        Self {
            kind: MessageKind::Timeout,
            fields: IndexMap::new(),
            events: Vec::new(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Looks up a field by exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Looks up a field ignoring ASCII case on the key. Peers are not
    /// consistent about header casing.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The correlation id echoed by the peer, if present.
    pub fn action_id(&self) -> Option<&str> {
        self.get_ignore_case("actionid")
    }

    /// The event name of an `Event:` message.
    pub fn event_name(&self) -> Option<&str> {
        self.get_ignore_case("event")
    }

    /// The free-text payload of a `Follows` response, if any.
    pub fn data(&self) -> Option<&str> {
        self.get(DATA_KEY)
    }

    /// True when the peer reported the action as successful.
    pub fn is_success(&self) -> bool {
        self.get_ignore_case("response") == Some("Success")
    }

    /// True for the initial message of a multi-part list response.
    pub fn is_list_start(&self) -> bool {
        self.get_ignore_case("eventlist") == Some("start")
    }

    /// True for the terminal message of a multi-part list response.
    pub fn is_list_complete(&self) -> bool {
        self.get_ignore_case("eventlist") == Some("Complete")
    }

    /// The sub-messages of an aggregated list response. Empty unless this is
    /// the terminal message returned by a list-response wait.
    pub fn events(&self) -> &[Message] {
        &self.events
    }

    pub(crate) fn set_events(&mut self, events: Vec<Message>) {
        self.events = events;
    }
}

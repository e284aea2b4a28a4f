// src/core/protocol/action.rs

//! Outgoing action requests and correlation-id generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// A parameter value: one line, or one line per element under the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionValue {
    Single(String),
    Many(Vec<String>),
}

/// A named action with its ordered parameters and correlation id.
///
/// The id is captured from a parameter whose key is case-insensitively
/// `actionid`; otherwise the session assigns a generated one before the
/// request is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    action: String,
    params: Vec<(String, ActionValue)>,
    action_id: Option<String>,
    explicit_id: bool,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Vec::new(),
            action_id: None,
            explicit_id: false,
        }
    }

    /// Appends a single-valued parameter. A key case-insensitively named
    /// `actionid` with a non-empty value also becomes the request's
    /// correlation id; an empty one is not usable and a generated id is
    /// appended at send time instead.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if key.eq_ignore_ascii_case("actionid") && !value.is_empty() {
            self.action_id = Some(value.clone());
            self.explicit_id = true;
        }
        self.params.push((key, ActionValue::Single(value)));
        self
    }

    /// Appends a single-valued parameter only when a value is present.
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Appends a multi-valued parameter, serialized as one line per element
    /// under the same key.
    pub fn param_list<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.params.push((key.into(), ActionValue::Many(values)));
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn params(&self) -> &[(String, ActionValue)] {
        &self.params
    }

    pub fn action_id(&self) -> Option<&str> {
        self.action_id.as_deref()
    }

    /// True when the id came from a caller-supplied `actionid` parameter and
    /// therefore already serializes as one of the parameter lines.
    pub fn has_explicit_id(&self) -> bool {
        self.explicit_id
    }

    /// Fills in a generated correlation id. Does not mark it explicit, so the
    /// serializer appends the `ActionID` line itself.
    pub(crate) fn assign_action_id(&mut self, id: String) {
        self.action_id = Some(id);
    }
}

/// Generates collision-resistant correlation ids: a session-scoped random
/// salt combined with a monotonic counter, so logical sessions sharing a
/// process cannot cross-talk.
#[derive(Debug)]
pub struct ActionIdGenerator {
    salt: u32,
    counter: AtomicU64,
}

impl ActionIdGenerator {
    pub fn new() -> Self {
        Self {
            salt: rand::random(),
            counter: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("A{:08x}-{:06}", self.salt, seq)
    }
}

impl Default for ActionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

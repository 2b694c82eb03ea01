//! The Gear data model: an authored artifact (messages, examples, wiring)
//! that is also an executable actor. Grounded on
//! `langgraph_core::messages::{Message, MessageRole}` for the role-coercion
//! idiom (unknown roles default to `user` rather than erroring) and on the
//! bounded, newest-first log pattern used by `orchestrator`'s audit trails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cap on `Gear::log` — entries past this index are dropped on insert.
pub const LOG_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Unknown role strings coerce to `user` on ingress.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "system" => MessageRole::System,
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::User,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role_raw: &str, content: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), role: MessageRole::coerce(role_raw), content: content.into() }
    }
}

/// An authored example input, shown in the gear's authoring UX (out of
/// scope here; stored opaquely and round-tripped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub name: String,
    pub payload: serde_json::Value,
}

/// The identity of the gear (or external caller) that produced a log entry
/// or forwarded message. `source` is a discriminated union in the spec
/// (`{id,label} | string`); represented here as an untagged enum so either
/// shape round-trips through JSON without a wrapper field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Gear { id: String, label: String },
    Label(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub source: Source,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gear {
    pub id: String,
    pub label: String,
    pub messages: Vec<Message>,
    pub example_inputs: Vec<Example>,
    /// Multi-source fan-in accumulator, keyed by the upstream source id.
    pub inputs: std::collections::HashMap<String, serde_json::Value>,
    pub output_urls: Vec<String>,
    /// Newest-first, capped at [`LOG_CAP`].
    pub log: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gear {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            label: label.into(),
            messages: Vec::new(),
            example_inputs: Vec::new(),
            inputs: std::collections::HashMap::new(),
            output_urls: Vec::new(),
            log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The effective system prompt: the concatenation of all `system`-role
    /// messages' content, in authoring order. Regenerated lazily on read
    /// rather than cached, since `addMessage` never invalidates a cache
    /// explicitly in the spec.
    pub fn system_prompt(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Appends a message, coercing unknown roles to `user`. A tail
    /// duplicate — a `user` message whose content matches the gear's
    /// current last message (also `user`) — is skipped rather than
    /// appended twice, since callers may resend the latest turn alongside
    /// history.
    pub fn add_message(&mut self, role_raw: &str, content: impl Into<String>) {
        let content = content.into();
        let role = MessageRole::coerce(role_raw);
        if role == MessageRole::User {
            if let Some(last) = self.messages.last() {
                if last.role == MessageRole::User && last.content == content {
                    return;
                }
            }
        }
        self.messages.push(Message { id: Uuid::new_v4().to_string(), role, content });
        self.updated_at = Utc::now();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.updated_at = Utc::now();
    }

    pub fn set_output_urls(&mut self, urls: Vec<String>) {
        self.output_urls = urls;
        self.updated_at = Utc::now();
    }

    pub fn set_example_inputs(&mut self, examples: Vec<Example>) {
        self.example_inputs = examples;
        self.updated_at = Utc::now();
    }

    /// Prepend a log entry, dropping anything past [`LOG_CAP`].
    pub fn push_log(&mut self, input: serde_json::Value, output: serde_json::Value, source: Source) {
        self.log.insert(0, LogEntry { timestamp: Utc::now(), input, output, source });
        self.log.truncate(LOG_CAP);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_role_coerces_to_user() {
        let mut g = Gear::new("g1", "Gear One");
        g.add_message("narrator", "hi");
        assert_eq!(g.messages[0].role, MessageRole::User);
    }

    #[test]
    fn system_prompt_joins_only_system_messages_in_order() {
        let mut g = Gear::new("g1", "Gear One");
        g.add_message("system", "first");
        g.add_message("user", "ignored");
        g.add_message("system", "second");
        assert_eq!(g.system_prompt(), "first\n\nsecond");
    }

    #[test]
    fn tail_duplicate_user_message_is_skipped() {
        let mut g = Gear::new("g1", "Gear One");
        g.add_message("user", "hello");
        g.add_message("user", "hello");
        assert_eq!(g.messages.len(), 1);
    }

    #[test]
    fn non_tail_duplicate_user_message_is_kept() {
        let mut g = Gear::new("g1", "Gear One");
        g.add_message("user", "hello");
        g.add_message("assistant", "hi there");
        g.add_message("user", "hello");
        assert_eq!(g.messages.len(), 3);
    }

    #[test]
    fn log_cap_drops_oldest_past_fifty() {
        let mut g = Gear::new("g1", "Gear One");
        for i in 0..60 {
            g.push_log(json!(i), json!(i), Source::Label("test".into()));
        }
        assert_eq!(g.log.len(), LOG_CAP);
        // Newest-first: the most recent insert (59) is at index 0.
        assert_eq!(g.log[0].input, json!(59));
        assert_eq!(g.log[49].input, json!(10));
    }
}

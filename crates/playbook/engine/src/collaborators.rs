//! Collaborator interfaces consumed by executors
//!
//! The concrete integrations behind these traits (chat platform API,
//! message bus scheduling) live outside this crate. Executors hold
//! them only for the duration of one invocation; nothing is held
//! while suspended.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use playbook_types::{PlaybookResult, Value, WakeToken};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Wake scheduling ──────────────────────────────────────────────────

/// The message a scheduled wake delivers back to the run driver,
/// correlated to exactly one (run, step)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResumptionMessage {
    pub run_correlation_id: String,
    pub step_id: String,
    /// Merged into the executor's resume state on re-entry
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub payload: HashMap<String, Value>,
}

/// Schedules delayed resumption messages on the event bus.
///
/// The returned token must be stored inside the suspend state so an
/// abandoned suspension can cancel its pending wake.
#[async_trait]
pub trait WakeScheduler: Send + Sync {
    async fn schedule_publish(
        &self,
        wake_at: DateTime<Utc>,
        message: ResumptionMessage,
    ) -> PlaybookResult<WakeToken>;

    async fn cancel_scheduled_publish(&self, token: &WakeToken) -> PlaybookResult<()>;
}

// ── Messaging ────────────────────────────────────────────────────────

/// Where a chat message lands: a channel, optionally inside a thread
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTarget {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
}

impl MessageTarget {
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread: None,
        }
    }

    pub fn in_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = Some(thread.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub message_id: String,
}

/// One selectable option on an interactive prompt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptChoice {
    /// Value delivered back in the resumption payload when selected
    pub value: String,
    pub label: String,
}

impl PromptChoice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Handle to an open interactive prompt. The prompt id doubles as the
/// application-level key an external-event consumer maps back to
/// (run, step) when the operator responds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptHandle {
    pub prompt_id: String,
}

/// Minimal chat-platform surface used by the built-in actions
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn post_message(
        &self,
        target: &MessageTarget,
        text: &str,
    ) -> PlaybookResult<MessageReceipt>;

    async fn open_prompt(
        &self,
        target: &MessageTarget,
        text: &str,
        choices: &[PromptChoice],
    ) -> PlaybookResult<PromptHandle>;

    /// Retract an interactive prompt. Retracting an already-gone
    /// prompt is not an error.
    async fn retract_prompt(&self, prompt_id: &str) -> PlaybookResult<()>;
}

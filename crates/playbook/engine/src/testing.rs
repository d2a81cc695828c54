//! Test doubles for the collaborator interfaces
//!
//! The real scheduling and messaging integrations live outside this
//! crate; until wired in, use these recording mocks. They are public
//! so downstream crates (and the run driver's own tests) can exercise
//! executors deterministically.

use crate::clock::{Clock, FixedClock};
use crate::collaborators::{
    MessageReceipt, MessageTarget, Messenger, PromptChoice, PromptHandle, ResumptionMessage,
    WakeScheduler,
};
use crate::context::{Collaborators, RunRef, StepContext, StepRef};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use playbook_types::{ActionError, ActionTypeDescriptor, PlaybookResult, Value, WakeToken};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// ── Mock scheduler ───────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ScheduledWake {
    pub token: WakeToken,
    pub wake_at: DateTime<Utc>,
    pub message: ResumptionMessage,
}

/// Records scheduled and cancelled wakes
#[derive(Default)]
pub struct MockScheduler {
    pub scheduled: Mutex<Vec<ScheduledWake>>,
    pub cancelled: Mutex<Vec<WakeToken>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled_tokens(&self) -> Vec<WakeToken> {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .map(|wake| wake.token.clone())
            .collect()
    }

    pub fn cancelled_tokens(&self) -> Vec<WakeToken> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl WakeScheduler for MockScheduler {
    async fn schedule_publish(
        &self,
        wake_at: DateTime<Utc>,
        message: ResumptionMessage,
    ) -> PlaybookResult<WakeToken> {
        let token = WakeToken::generate();
        self.scheduled.lock().unwrap().push(ScheduledWake {
            token: token.clone(),
            wake_at,
            message,
        });
        Ok(token)
    }

    async fn cancel_scheduled_publish(&self, token: &WakeToken) -> PlaybookResult<()> {
        self.cancelled.lock().unwrap().push(token.clone());
        Ok(())
    }
}

// ── Mock messenger ───────────────────────────────────────────────────

/// Records posted messages, opened prompts, and retractions
#[derive(Default)]
pub struct MockMessenger {
    pub posted: Mutex<Vec<(MessageTarget, String)>>,
    pub prompts: Mutex<Vec<(PromptHandle, String, Vec<PromptChoice>)>>,
    pub retracted: Mutex<Vec<String>>,
    counter: AtomicU64,
    /// When set, open_prompt fails with this message
    pub fail_open: Mutex<Option<String>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retracted_ids(&self) -> Vec<String> {
        self.retracted.lock().unwrap().clone()
    }

    pub fn last_prompt_id(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .map(|(handle, _, _)| handle.prompt_id.clone())
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn post_message(
        &self,
        target: &MessageTarget,
        text: &str,
    ) -> PlaybookResult<MessageReceipt> {
        self.posted
            .lock()
            .unwrap()
            .push((target.clone(), text.to_string()));
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(MessageReceipt {
            message_id: format!("msg-{id}"),
        })
    }

    async fn open_prompt(
        &self,
        _target: &MessageTarget,
        text: &str,
        choices: &[PromptChoice],
    ) -> PlaybookResult<PromptHandle> {
        if let Some(message) = self.fail_open.lock().unwrap().clone() {
            return Err(ActionError::Messaging(message));
        }
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let handle = PromptHandle {
            prompt_id: format!("prompt-{id}"),
        };
        self.prompts
            .lock()
            .unwrap()
            .push((handle.clone(), text.to_string(), choices.to_vec()));
        Ok(handle)
    }

    async fn retract_prompt(&self, prompt_id: &str) -> PlaybookResult<()> {
        self.retracted.lock().unwrap().push(prompt_id.to_string());
        Ok(())
    }
}

// ── Context fixtures ─────────────────────────────────────────────────

/// A fixed instant for deterministic deadline math
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Bundle of mock collaborators plus the clock they share
pub struct MockHarness {
    pub clock: Arc<FixedClock>,
    pub scheduler: Arc<MockScheduler>,
    pub messenger: Arc<MockMessenger>,
}

impl MockHarness {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(FixedClock(fixed_now())),
            scheduler: Arc::new(MockScheduler::new()),
            messenger: Arc::new(MockMessenger::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            clock: Arc::clone(&self.clock) as Arc<dyn Clock>,
            scheduler: Arc::clone(&self.scheduler) as Arc<dyn WakeScheduler>,
            messenger: Arc::clone(&self.messenger) as Arc<dyn Messenger>,
        }
    }

    pub fn make_context(
        &self,
        descriptor: ActionTypeDescriptor,
        inputs: HashMap<String, Value>,
        resume_state: Option<HashMap<String, Value>>,
    ) -> StepContext {
        StepContext::new(
            Arc::new(descriptor),
            RunRef::new("run-1", "corr-1"),
            StepRef::new("step-1"),
            inputs,
            resume_state,
            self.collaborators(),
        )
    }
}

impl Default for MockHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot context fixture for tests that never inspect the mocks
pub fn make_context(
    descriptor: ActionTypeDescriptor,
    inputs: HashMap<String, Value>,
    resume_state: Option<HashMap<String, Value>>,
) -> StepContext {
    MockHarness::new().make_context(descriptor, inputs, resume_state)
}

//! Step results: the outcome contract an executor returns
//!
//! A result is terminal (succeeded, failed, complete-playbook) or a
//! suspension. Fields are positional to the outcome: `problem` is
//! meaningful only when failed, `suspend_state` only when suspended,
//! `call_branch` only when succeeded and the type declares branches.

use crate::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Outcome ──────────────────────────────────────────────────────────

/// The four possible outcomes of one executor invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step finished; the run advances via branch or default successor
    Succeeded,
    /// Step failed; the run driver applies its failure policy
    Failed,
    /// Step paused; the engine persists the suspend state and halts
    Suspended,
    /// Terminal for the whole run, overriding any branch or successor
    CompletePlaybook,
}

// ── Problem ──────────────────────────────────────────────────────────

/// Classification of a step failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Missing or malformed declared input; recoverable by failing
    /// only the current step
    BadInput,
    /// Failure explicitly constructed by the executor, surfaced verbatim
    Business,
    /// Uncaught executor error wrapped by the invoker
    Unexpected,
}

/// Structured error carried on a failed result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self {
            kind: ProblemKind::BadInput,
            message: message.into(),
            detail: None,
        }
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self {
            kind: ProblemKind::Business,
            message: message.into(),
            detail: None,
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            kind: ProblemKind::Unexpected,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ── Notices ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Operator-facing annotation attached to a result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }
}

// ── Branch selection ─────────────────────────────────────────────────

/// A continuation point selected by a successful step.
///
/// Pure data: the executor never advances the run itself, it only
/// names the branch; sequencing is exclusively the run driver's job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallBranch {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CallBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ── Step result ──────────────────────────────────────────────────────

/// The outcome of one executor invocation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepResult {
    pub outcome: StepOutcome,
    /// Merged into the run-wide variable scope by the run driver
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub outputs: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<Problem>,
    /// Opaque state persisted verbatim while suspended; everything the
    /// executor needs to reconstruct its decision at resume time and
    /// to cancel the pending wake if abandoned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend_state: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_branch: Option<CallBranch>,
}

impl StepResult {
    fn with_outcome(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            outputs: HashMap::new(),
            notices: Vec::new(),
            problem: None,
            suspend_state: None,
            suspended_until: None,
            call_branch: None,
        }
    }

    pub fn succeeded() -> Self {
        Self::with_outcome(StepOutcome::Succeeded)
    }

    pub fn failed(problem: Problem) -> Self {
        let mut result = Self::with_outcome(StepOutcome::Failed);
        result.problem = Some(problem);
        result
    }

    pub fn suspended(state: HashMap<String, Value>) -> Self {
        let mut result = Self::with_outcome(StepOutcome::Suspended);
        result.suspend_state = Some(state);
        result
    }

    pub fn complete_playbook() -> Self {
        Self::with_outcome(StepOutcome::CompletePlaybook)
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn with_branch(mut self, name: impl Into<String>) -> Self {
        self.call_branch = Some(CallBranch::new(name));
        self
    }

    pub fn with_suspended_until(mut self, deadline: DateTime<Utc>) -> Self {
        self.suspended_until = Some(deadline);
        self
    }

    pub fn is_suspended(&self) -> bool {
        self.outcome == StepOutcome::Suspended
    }

    /// Whether this result ends the step (anything but a suspension)
    pub fn is_terminal(&self) -> bool {
        !self.is_suspended()
    }
}

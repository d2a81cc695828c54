//! Per-step lifecycle: the suspend/resume protocol state
//!
//! The run driver persists a [`StepPhase`] per step and re-invokes the
//! same executor when a correlated wake arrives. The phase is a tagged
//! variant rather than a coroutine because persisted serializable
//! state is the only continuation mechanism that survives process
//! restarts.
//!
//! Resumption is at-most-once per wake token: a duplicate wake
//! arriving after the step already resumed or terminated must be a
//! no-op, never a second transition. Both resumption and abandonment
//! assume the driver serializes access to the phase (single writer,
//! check-then-act); this module provides the checks, not the mutual
//! exclusion.

use crate::{ActionError, PlaybookResult, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Wake token ───────────────────────────────────────────────────────

/// Opaque correlation handle matching a scheduled or external wake
/// back to exactly one outstanding suspension
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WakeToken(pub String);

impl WakeToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Display for WakeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Suspension record ────────────────────────────────────────────────

/// Everything persisted for an outstanding suspension
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuspendRecord {
    /// Opaque executor state, persisted verbatim
    pub state: HashMap<String, Value>,
    /// Token correlating the pending wake to this suspension
    pub wake_token: WakeToken,
    /// Deadline of the scheduled wake, when the wake source is a timer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<DateTime<Utc>>,
}

impl SuspendRecord {
    pub fn new(state: HashMap<String, Value>, wake_token: WakeToken) -> Self {
        Self {
            state,
            wake_token,
            suspended_until: None,
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.suspended_until = Some(deadline);
        self
    }
}

// ── Phases ───────────────────────────────────────────────────────────

/// How a step's lifecycle ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    Succeeded,
    Failed,
    CompletePlaybook,
    /// Suspension torn down without resuming (superseded, cancelled,
    /// or its run deleted)
    Abandoned,
}

/// The persisted lifecycle of one step within a run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum StepPhase {
    NotStarted,
    Running,
    Suspended(SuspendRecord),
    Terminal { state: TerminalState },
}

/// What a wake delivery did to the phase
#[derive(Clone, Debug, PartialEq)]
pub enum WakeDisposition {
    /// The suspension matched; the step is Running again and the
    /// persisted state is handed back for the resumed invocation
    Applied(HashMap<String, Value>),
    /// Stale or duplicate wake; nothing changed
    Ignored,
}

impl StepPhase {
    /// First entry: NotStarted → Running
    pub fn start(&mut self) -> PlaybookResult<()> {
        match self {
            StepPhase::NotStarted => {
                *self = StepPhase::Running;
                Ok(())
            }
            other => Err(ActionError::InvalidTransition(format!(
                "cannot start step in phase {}",
                other.phase_name()
            ))),
        }
    }

    /// Executor returned a suspension: Running → Suspended
    pub fn suspend(&mut self, record: SuspendRecord) -> PlaybookResult<()> {
        match self {
            StepPhase::Running => {
                *self = StepPhase::Suspended(record);
                Ok(())
            }
            other => Err(ActionError::InvalidTransition(format!(
                "cannot suspend step in phase {}",
                other.phase_name()
            ))),
        }
    }

    /// Wake delivery: Suspended → Running, at most once per token.
    ///
    /// Anything other than an outstanding suspension with this exact
    /// token is ignored. This is how a timer wake racing an external
    /// wake, or a duplicate delivery racing abandonment, collapses to
    /// a single winner.
    pub fn resume(&mut self, token: &WakeToken) -> WakeDisposition {
        match self {
            StepPhase::Suspended(record) if &record.wake_token == token => {
                let state = record.state.clone();
                *self = StepPhase::Running;
                WakeDisposition::Applied(state)
            }
            _ => WakeDisposition::Ignored,
        }
    }

    /// Executor reached a terminal outcome: Running → Terminal
    pub fn complete(&mut self, state: TerminalState) -> PlaybookResult<()> {
        match self {
            StepPhase::Running => {
                *self = StepPhase::Terminal { state };
                Ok(())
            }
            other => Err(ActionError::InvalidTransition(format!(
                "cannot complete step in phase {}",
                other.phase_name()
            ))),
        }
    }

    /// Tear down an outstanding suspension: Suspended → Terminal(Abandoned).
    ///
    /// Returns the suspension record so the caller can run executor
    /// cleanup (cancel the scheduled wake, retract interactive
    /// surfaces). On any other phase this is a no-op returning None,
    /// so abandonment can race a wake safely.
    pub fn abandon(&mut self) -> Option<SuspendRecord> {
        match std::mem::replace(
            self,
            StepPhase::Terminal {
                state: TerminalState::Abandoned,
            },
        ) {
            StepPhase::Suspended(record) => Some(record),
            other => {
                // Not suspended; put the original phase back untouched.
                *self = other;
                None
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StepPhase::Terminal { .. })
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, StepPhase::Suspended(_))
    }

    fn phase_name(&self) -> &'static str {
        match self {
            StepPhase::NotStarted => "not_started",
            StepPhase::Running => "running",
            StepPhase::Suspended(_) => "suspended",
            StepPhase::Terminal { .. } => "terminal",
        }
    }
}

impl Default for StepPhase {
    fn default() -> Self {
        StepPhase::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(token: &WakeToken) -> SuspendRecord {
        SuspendRecord::new(
            HashMap::from([("seconds".to_string(), Value::Number(30.0))]),
            token.clone(),
        )
    }

    #[test]
    fn test_straight_through_lifecycle() {
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase.complete(TerminalState::Succeeded).unwrap();
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_suspend_resume_complete() {
        let token = WakeToken::generate();
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase.suspend(make_record(&token)).unwrap();
        assert!(phase.is_suspended());

        let disposition = phase.resume(&token);
        match disposition {
            WakeDisposition::Applied(state) => {
                assert_eq!(state.get("seconds").unwrap().as_number(), Some(30.0));
            }
            WakeDisposition::Ignored => panic!("first wake must apply"),
        }

        phase.complete(TerminalState::Succeeded).unwrap();
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_duplicate_wake_is_noop() {
        let token = WakeToken::generate();
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase.suspend(make_record(&token)).unwrap();

        assert!(matches!(phase.resume(&token), WakeDisposition::Applied(_)));
        // Same token delivered again after the step already resumed.
        assert_eq!(phase.resume(&token), WakeDisposition::Ignored);
    }

    #[test]
    fn test_stale_token_is_noop() {
        let token = WakeToken::generate();
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase.suspend(make_record(&token)).unwrap();

        assert_eq!(
            phase.resume(&WakeToken::new("some-other-token")),
            WakeDisposition::Ignored
        );
        assert!(phase.is_suspended());
    }

    #[test]
    fn test_abandon_then_wake_single_winner() {
        let token = WakeToken::generate();
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase.suspend(make_record(&token)).unwrap();

        let record = phase.abandon().expect("abandon yields the record");
        assert_eq!(record.wake_token, token);
        assert!(phase.is_terminal());

        // The wake that raced the abandonment lands on a terminal
        // phase and must not re-trigger anything.
        assert_eq!(phase.resume(&token), WakeDisposition::Ignored);
    }

    #[test]
    fn test_wake_then_abandon_single_winner() {
        let token = WakeToken::generate();
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase.suspend(make_record(&token)).unwrap();

        assert!(matches!(phase.resume(&token), WakeDisposition::Applied(_)));
        // Abandonment lost the race; the phase stays Running.
        assert!(phase.abandon().is_none());
        assert!(!phase.is_terminal());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut phase = StepPhase::default();
        assert!(phase.complete(TerminalState::Succeeded).is_err());
        assert!(phase
            .suspend(make_record(&WakeToken::generate()))
            .is_err());

        phase.start().unwrap();
        assert!(phase.start().is_err());

        phase.complete(TerminalState::Failed).unwrap();
        assert!(phase.start().is_err());
        assert_eq!(phase.resume(&WakeToken::generate()), WakeDisposition::Ignored);
    }

    #[test]
    fn test_phase_serde_round_trip() {
        let token = WakeToken::new("tok-1");
        let mut phase = StepPhase::default();
        phase.start().unwrap();
        phase
            .suspend(make_record(&token).with_deadline(Utc::now()))
            .unwrap();

        let json = serde_json::to_string(&phase).unwrap();
        let mut back: StepPhase = serde_json::from_str(&json).unwrap();
        assert!(back.is_suspended());
        assert!(matches!(back.resume(&token), WakeDisposition::Applied(_)));
    }
}

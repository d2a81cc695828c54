//! The action executor contract
//!
//! One trait, one entry point. The run driver invokes `execute_step`
//! exactly once per attempt; the executor distinguishes a first run
//! from a resumption purely by inspecting the context's resume state,
//! because the process may have restarted in between.

use crate::context::StepContext;
use async_trait::async_trait;
use playbook_types::{PlaybookResult, StepResult};

/// Runtime behavior for one action type.
///
/// Implementations must be safe to call whether the context carries
/// resume state (resumed run) or not (first run). An executor that
/// suspends must, on resumption, reconstruct its decision purely from
/// the persisted suspend state plus the wake payload — never from
/// other in-memory state.
///
/// Repeated first-run calls with identical inputs are only safe to
/// retry if the action's external side effects are idempotent; action
/// types with side effects must guarantee that themselves.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute_step(&self, ctx: &StepContext) -> PlaybookResult<StepResult>;

    /// Release external resources created while suspending (cancel a
    /// scheduled wake, retract an interactive prompt), invoked when a
    /// suspended step is abandoned. The context carries the persisted
    /// suspend state as resume state.
    ///
    /// Must be idempotent and must not error on already-cleaned-up
    /// state. The default is a no-op for action types that never
    /// suspend.
    async fn dispose_suspended_step(&self, _ctx: &StepContext) -> PlaybookResult<()> {
        Ok(())
    }
}

//! Step runner: invokes executors and polices the result contract
//!
//! The runner is the seam between the run driver and the action
//! catalog. It builds the executor, maps executor errors onto the
//! failure taxonomy, and rejects malformed results (undeclared
//! branches, suspensions without state) before the driver acts on
//! them. It never sequences steps.

use crate::context::StepContext;
use crate::registry::ActionRegistry;
use playbook_types::{
    ActionError, ActionTypeDescriptor, PlaybookResult, Problem, StepOutcome, StepResult,
};
use std::sync::Arc;

pub struct StepRunner {
    registry: Arc<ActionRegistry>,
}

impl StepRunner {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Execute one step attempt.
    ///
    /// Executor errors become a Failed result: bad-input errors as a
    /// recoverable per-step problem naming the offending key,
    /// anything else wrapped as an unexpected problem with full
    /// detail logged. The exception is staff-only action types, whose
    /// errors propagate uncaught so run-level handling treats them as
    /// a fatal run failure (crash-test semantics).
    pub async fn run(&self, ctx: &StepContext) -> PlaybookResult<StepResult> {
        let name = ctx.action_name();
        let descriptor = self.registry.descriptor(name)?;
        let executor = self.registry.executor(name)?;

        tracing::debug!(
            action_type = %name,
            run_id = %ctx.run().run_id,
            step_id = %ctx.step().step_id,
            resumed = ctx.is_resumption(),
            "Executing step"
        );

        let result = match executor.execute_step(ctx).await {
            Ok(result) => result,
            Err(err) if err.is_bad_input() => {
                tracing::warn!(
                    action_type = %name,
                    step_id = %ctx.step().step_id,
                    error = %err,
                    "Step failed input validation"
                );
                StepResult::failed(Problem::bad_input(err.to_string()))
            }
            Err(err) => {
                if descriptor.staff_only {
                    return Err(err);
                }
                tracing::error!(
                    action_type = %name,
                    run_id = %ctx.run().run_id,
                    step_id = %ctx.step().step_id,
                    error = %err,
                    "Step failed unexpectedly"
                );
                StepResult::failed(Problem::unexpected(err.to_string()))
            }
        };

        validate_result(&descriptor, &result)?;

        if result.is_suspended() {
            tracing::info!(
                action_type = %name,
                run_id = %ctx.run().run_id,
                step_id = %ctx.step().step_id,
                suspended_until = ?result.suspended_until,
                "Step suspended"
            );
        }

        Ok(result)
    }

    /// Tear down an abandoned suspension.
    ///
    /// Cleanup failures are logged and swallowed, never escalated: the
    /// run is already completing or deleted, and the executor contract
    /// requires dispose to tolerate already-cleaned-up state anyway.
    pub async fn dispose(&self, ctx: &StepContext) {
        let name = ctx.action_name();
        let executor = match self.registry.executor(name) {
            Ok(executor) => executor,
            Err(err) => {
                tracing::warn!(action_type = %name, error = %err, "Cannot dispose suspended step");
                return;
            }
        };

        if let Err(err) = executor.dispose_suspended_step(ctx).await {
            tracing::warn!(
                action_type = %name,
                run_id = %ctx.run().run_id,
                step_id = %ctx.step().step_id,
                error = %err,
                "Suspended-step cleanup failed; continuing"
            );
        }
    }
}

/// Reject results the driver must never act upon
fn validate_result(descriptor: &ActionTypeDescriptor, result: &StepResult) -> PlaybookResult<()> {
    if result.outcome == StepOutcome::Succeeded {
        if let Some(branch) = &result.call_branch {
            if !descriptor.declares_branch(&branch.name) {
                return Err(ActionError::UndeclaredBranch {
                    action: descriptor.name.clone(),
                    branch: branch.name.clone(),
                });
            }
        }
    }

    if result.outcome == StepOutcome::Suspended && result.suspend_state.is_none() {
        return Err(ActionError::MissingSuspendState);
    }

    Ok(())
}

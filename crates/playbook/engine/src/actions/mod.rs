//! Built-in action type catalog
//!
//! Each action type contributes one descriptor and one executor, wired
//! into the registry by [`register_builtin_actions`] at startup. The
//! set here is representative rather than exhaustive: a timed wait
//! (scheduled-wake suspension), an interactive prompt (external-event
//! suspension with branches), a condition gate, and a staff-only
//! crash test.

pub mod condition;
pub mod crash_test;
pub mod prompt;
pub mod wait;

pub use condition::ConditionExecutor;
pub use crash_test::CrashTestExecutor;
pub use prompt::PromptExecutor;
pub use wait::WaitExecutor;

use crate::registry::ActionRegistry;
use playbook_types::PlaybookResult;
use std::sync::Arc;

/// Register every built-in action type. Call once at startup; a
/// duplicate name means the registry was already populated.
pub fn register_builtin_actions(registry: &mut ActionRegistry) -> PlaybookResult<()> {
    registry.register(wait::descriptor(), || Arc::new(WaitExecutor))?;
    registry.register(prompt::descriptor(), || Arc::new(PromptExecutor))?;
    registry.register(condition::descriptor(), || Arc::new(ConditionExecutor))?;
    registry.register(crash_test::descriptor(), || Arc::new(CrashTestExecutor))?;
    Ok(())
}

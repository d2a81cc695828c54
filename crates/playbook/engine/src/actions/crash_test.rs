//! `system.crash_test` — deliberately fail the run
//!
//! Staff-only diagnostic. Its error is never mapped onto a failed
//! result: the runner propagates staff-only errors uncaught so the
//! run-level failure path itself can be exercised end to end.

use crate::context::StepContext;
use crate::executor::ActionExecutor;
use async_trait::async_trait;
use playbook_types::{
    ActionError, ActionTypeDescriptor, InputDefinition, InputKind, PlaybookResult, StepResult,
};

pub fn descriptor() -> ActionTypeDescriptor {
    ActionTypeDescriptor::new("system.crash_test", "system", "Crash test")
        .with_description("Deliberately fail the whole run (staff diagnostic)")
        .with_input(InputDefinition::new("message", "Message", InputKind::String))
        .staff_only()
}

pub struct CrashTestExecutor;

#[async_trait]
impl ActionExecutor for CrashTestExecutor {
    async fn execute_step(&self, ctx: &StepContext) -> PlaybookResult<StepResult> {
        let message = ctx
            .get::<String>("message")
            .unwrap_or_else(|| "deliberate crash-test failure".to_string());
        Err(ActionError::Internal(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_context;
    use playbook_types::Value;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_always_errors() {
        let ctx = make_context(descriptor(), HashMap::new(), None);
        let err = CrashTestExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::Internal(_)));
    }

    #[tokio::test]
    async fn test_custom_message_carried() {
        let inputs = HashMap::from([(
            "message".to_string(),
            Value::String("game day drill".into()),
        )]);
        let ctx = make_context(descriptor(), inputs, None);

        let err = CrashTestExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("game day drill"));
    }

    #[test]
    fn test_descriptor_is_staff_only() {
        assert!(descriptor().staff_only);
    }
}

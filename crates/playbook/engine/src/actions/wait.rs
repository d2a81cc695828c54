//! `system.wait` — pause the run for a fixed duration
//!
//! First entry schedules a delayed resumption message and suspends
//! with the wake token and deadline in the suspend state. The
//! resumption entry completes immediately; a wait never re-suspends.

use crate::context::StepContext;
use crate::executor::ActionExecutor;
use async_trait::async_trait;
use chrono::Duration;
use playbook_types::{
    ActionError, ActionTypeDescriptor, InputDefinition, InputKind, OutputDefinition,
    PlaybookResult, StepResult, Value, WakeToken,
};
use std::collections::HashMap;

pub fn descriptor() -> ActionTypeDescriptor {
    ActionTypeDescriptor::new("system.wait", "system", "Wait")
        .with_description("Pause the playbook for a fixed number of seconds")
        .with_input(
            InputDefinition::new("seconds", "Seconds", InputKind::Number)
                .required()
                .with_old_name("duration_seconds"),
        )
        .with_output(OutputDefinition::new("waited_seconds", "Waited seconds"))
}

pub struct WaitExecutor;

#[async_trait]
impl ActionExecutor for WaitExecutor {
    async fn execute_step(&self, ctx: &StepContext) -> PlaybookResult<StepResult> {
        let seconds: f64 = ctx.expect("seconds")?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ActionError::invalid_input(
                "seconds",
                "a non-negative number of seconds",
            ));
        }

        if ctx.is_resumption() {
            return Ok(StepResult::succeeded().with_output("waited_seconds", seconds));
        }

        // The millisecond cast saturates for absurd durations; the
        // checked add turns that into a validation error instead of a
        // deadline-arithmetic panic.
        let delta = Duration::milliseconds((seconds * 1000.0) as i64);
        let wake_at = ctx.now().checked_add_signed(delta).ok_or_else(|| {
            ActionError::invalid_input("seconds", "a duration with a representable deadline")
        })?;
        let message = crate::collaborators::ResumptionMessage {
            run_correlation_id: ctx.run().correlation_id.clone(),
            step_id: ctx.step().step_id.clone(),
            payload: HashMap::new(),
        };
        let token = ctx.scheduler().schedule_publish(wake_at, message).await?;

        tracing::debug!(
            step_id = %ctx.step().step_id,
            seconds,
            wake_token = %token,
            "Wait scheduled"
        );

        let state = HashMap::from([
            ("wake_token".to_string(), Value::String(token.to_string())),
            ("wake_at".to_string(), Value::String(wake_at.to_rfc3339())),
        ]);
        Ok(StepResult::suspended(state).with_suspended_until(wake_at))
    }

    async fn dispose_suspended_step(&self, ctx: &StepContext) -> PlaybookResult<()> {
        // Already-fired or missing wakes are not an error.
        let Some(token) = ctx.resume_get::<String>("wake_token") else {
            return Ok(());
        };
        ctx.scheduler()
            .cancel_scheduled_publish(&WakeToken::new(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, MockHarness};
    use playbook_types::StepOutcome;

    fn seconds_input(seconds: f64) -> HashMap<String, Value> {
        HashMap::from([("seconds".to_string(), Value::Number(seconds))])
    }

    #[tokio::test]
    async fn test_first_entry_schedules_and_suspends() {
        let harness = MockHarness::new();
        let ctx = harness.make_context(descriptor(), seconds_input(90.0), None);

        let result = WaitExecutor.execute_step(&ctx).await.unwrap();
        assert_eq!(result.outcome, StepOutcome::Suspended);

        let expected_wake = fixed_now() + Duration::seconds(90);
        assert_eq!(result.suspended_until, Some(expected_wake));

        let state = result.suspend_state.unwrap();
        assert!(state.contains_key("wake_token"));
        assert_eq!(
            state.get("wake_at").unwrap().as_str(),
            Some(expected_wake.to_rfc3339().as_str())
        );

        let scheduled = harness.scheduler.scheduled.lock().unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].wake_at, expected_wake);
        assert_eq!(scheduled[0].message.run_correlation_id, "corr-1");
        assert_eq!(scheduled[0].message.step_id, "step-1");
        assert_eq!(
            state.get("wake_token").unwrap().as_str(),
            Some(scheduled[0].token.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_legacy_alias_resolves() {
        let harness = MockHarness::new();
        let inputs =
            HashMap::from([("duration_seconds".to_string(), Value::Number(30.0))]);
        let ctx = harness.make_context(descriptor(), inputs, None);

        let result = WaitExecutor.execute_step(&ctx).await.unwrap();
        assert_eq!(result.outcome, StepOutcome::Suspended);
        assert_eq!(
            result.suspended_until,
            Some(fixed_now() + Duration::seconds(30))
        );
    }

    #[tokio::test]
    async fn test_resumption_completes_without_rescheduling() {
        let harness = MockHarness::new();
        let resume_state = HashMap::from([(
            "wake_token".to_string(),
            Value::String("t-old".into()),
        )]);
        let ctx = harness.make_context(descriptor(), seconds_input(90.0), Some(resume_state));

        let result = WaitExecutor.execute_step(&ctx).await.unwrap();
        assert_eq!(result.outcome, StepOutcome::Succeeded);
        assert_eq!(
            result.outputs.get("waited_seconds").unwrap().as_number(),
            Some(90.0)
        );
        assert!(harness.scheduler.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_missing_and_negative_duration() {
        let harness = MockHarness::new();

        let ctx = harness.make_context(descriptor(), HashMap::new(), None);
        let err = WaitExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::MissingInput { .. }));

        let ctx = harness.make_context(descriptor(), seconds_input(-5.0), None);
        let err = WaitExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(err.is_bad_input());
    }

    #[tokio::test]
    async fn test_rejects_duration_beyond_representable_deadline() {
        let harness = MockHarness::new();
        let ctx = harness.make_context(descriptor(), seconds_input(1e18), None);

        let err = WaitExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput { ref key, .. } if key == "seconds"));
        assert!(harness.scheduler.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispose_cancels_pending_wake() {
        let harness = MockHarness::new();
        let resume_state = HashMap::from([(
            "wake_token".to_string(),
            Value::String("t-123".into()),
        )]);
        let ctx = harness.make_context(descriptor(), seconds_input(90.0), Some(resume_state));

        WaitExecutor.dispose_suspended_step(&ctx).await.unwrap();
        assert_eq!(
            harness.scheduler.cancelled_tokens(),
            vec![WakeToken::new("t-123")]
        );
    }

    #[tokio::test]
    async fn test_dispose_without_token_is_noop() {
        let harness = MockHarness::new();
        let ctx = harness.make_context(descriptor(), seconds_input(90.0), Some(HashMap::new()));

        WaitExecutor.dispose_suspended_step(&ctx).await.unwrap();
        assert!(harness.scheduler.cancelled.lock().unwrap().is_empty());
    }
}

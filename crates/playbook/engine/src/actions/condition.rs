//! `system.condition` — branch on a comparison
//!
//! Thin adapter over the shared condition evaluator: resolve the
//! operands, evaluate, select the `true` or `false` branch, and emit
//! the verdict as a `result` output. Non-suspending and trivially
//! idempotent.

use crate::condition::{evaluate, Comparison, ConditionOptions};
use crate::context::StepContext;
use crate::executor::ActionExecutor;
use async_trait::async_trait;
use playbook_types::{
    ActionError, ActionTypeDescriptor, BranchDefinition, InputDefinition, InputKind,
    OutputDefinition, PlaybookResult, StepResult, Value,
};

pub fn descriptor() -> ActionTypeDescriptor {
    ActionTypeDescriptor::new("system.condition", "system", "Condition")
        .with_description("Branch on a comparison between two values")
        .with_input(InputDefinition::new("left", "Left value", InputKind::String))
        .with_input(
            InputDefinition::new("comparison", "Comparison", InputKind::String).required(),
        )
        .with_input(
            InputDefinition::new("right", "Right value", InputKind::String)
                .with_old_name("value"),
        )
        .with_input(
            InputDefinition::new(
                "case_sensitive_regex",
                "Case-sensitive regular expression",
                InputKind::Bool,
            )
            .with_default(false),
        )
        .with_output(OutputDefinition::new("result", "Result"))
        .with_branch(BranchDefinition::new("true", "Condition held"))
        .with_branch(BranchDefinition::new("false", "Condition did not hold"))
}

/// The evaluator takes strings; collections are passed as their JSON
/// serialization so array-aware comparison rules apply.
fn left_operand(ctx: &StepContext) -> Option<String> {
    match ctx.input("left")? {
        collection @ (Value::List(_) | Value::Map(_)) => serde_json::to_string(collection).ok(),
        scalar => Some(scalar.to_display_string()),
    }
}

pub struct ConditionExecutor;

#[async_trait]
impl ActionExecutor for ConditionExecutor {
    async fn execute_step(&self, ctx: &StepContext) -> PlaybookResult<StepResult> {
        let name: String = ctx.expect("comparison")?;
        let comparison: Comparison = name
            .parse()
            .map_err(|_| ActionError::invalid_input("comparison", "a known comparison name"))?;

        let left = left_operand(ctx);
        // Existence checks ignore the right side, so it may be absent.
        let right = ctx.get::<String>("right").unwrap_or_default();
        let options = ConditionOptions {
            case_sensitive_regex: ctx.get("case_sensitive_regex").unwrap_or(false),
        };

        let verdict = evaluate(left.as_deref(), comparison, &right, &options);
        tracing::debug!(
            step_id = %ctx.step().step_id,
            comparison = %comparison,
            verdict,
            "Condition evaluated"
        );

        Ok(StepResult::succeeded()
            .with_output("result", verdict)
            .with_branch(if verdict { "true" } else { "false" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_context;
    use playbook_types::StepOutcome;
    use std::collections::HashMap;

    async fn run(pairs: &[(&str, Value)]) -> StepResult {
        let inputs: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let ctx = make_context(descriptor(), inputs, None);
        ConditionExecutor.execute_step(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_true_branch_selected() {
        let result = run(&[
            ("left", Value::String("production".into())),
            ("comparison", Value::String("starts_with".into())),
            ("right", Value::String("prod".into())),
        ])
        .await;

        assert_eq!(result.outcome, StepOutcome::Succeeded);
        assert_eq!(result.call_branch.unwrap().name, "true");
        assert_eq!(result.outputs.get("result").unwrap().as_bool(), Some(true));
    }

    #[tokio::test]
    async fn test_false_branch_selected() {
        let result = run(&[
            ("left", Value::String("staging".into())),
            ("comparison", Value::String("exact_match".into())),
            ("right", Value::String("production".into())),
        ])
        .await;

        assert_eq!(result.call_branch.unwrap().name, "false");
        assert_eq!(result.outputs.get("result").unwrap().as_bool(), Some(false));
    }

    #[tokio::test]
    async fn test_missing_left_with_existence_checks() {
        let exists = run(&[("comparison", Value::String("exists".into()))]).await;
        assert_eq!(exists.call_branch.unwrap().name, "false");

        let not_exists = run(&[("comparison", Value::String("not_exists".into()))]).await;
        assert_eq!(not_exists.call_branch.unwrap().name, "true");
    }

    #[tokio::test]
    async fn test_list_left_matches_any_element() {
        let result = run(&[
            (
                "left",
                Value::List(vec![
                    Value::String("alpha".into()),
                    Value::String("beta".into()),
                ]),
            ),
            ("comparison", Value::String("exact_match".into())),
            ("right", Value::String("beta".into())),
        ])
        .await;
        assert_eq!(result.call_branch.unwrap().name, "true");
    }

    #[tokio::test]
    async fn test_numeric_left_displays_bare() {
        // A whole number renders without a trailing ".0", so numeric
        // comparison against the authored literal succeeds.
        let result = run(&[
            ("left", Value::Number(4.0)),
            ("comparison", Value::String("equals".into())),
            ("right", Value::String("4".into())),
        ])
        .await;
        assert_eq!(result.call_branch.unwrap().name, "true");
    }

    #[tokio::test]
    async fn test_legacy_value_alias_for_right() {
        let result = run(&[
            ("left", Value::String("abc".into())),
            ("comparison", Value::String("contains".into())),
            ("value", Value::String("b".into())),
        ])
        .await;
        assert_eq!(result.call_branch.unwrap().name, "true");
    }

    #[tokio::test]
    async fn test_case_sensitive_regex_option() {
        let insensitive = run(&[
            ("left", Value::String("ALERT".into())),
            ("comparison", Value::String("regular_expression".into())),
            ("right", Value::String("^alert$".into())),
        ])
        .await;
        assert_eq!(insensitive.call_branch.unwrap().name, "true");

        let sensitive = run(&[
            ("left", Value::String("ALERT".into())),
            ("comparison", Value::String("regular_expression".into())),
            ("right", Value::String("^alert$".into())),
            ("case_sensitive_regex", Value::Bool(true)),
        ])
        .await;
        assert_eq!(sensitive.call_branch.unwrap().name, "false");
    }

    #[tokio::test]
    async fn test_unknown_comparison_is_bad_input() {
        let ctx = make_context(
            descriptor(),
            HashMap::from([
                ("comparison".to_string(), Value::String("resembles".into())),
                ("right".to_string(), Value::String("x".into())),
            ]),
            None,
        );

        let err = ConditionExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput { ref key, .. } if key == "comparison"));
    }

    #[tokio::test]
    async fn test_missing_comparison_is_bad_input() {
        let ctx = make_context(descriptor(), HashMap::new(), None);
        let err = ConditionExecutor.execute_step(&ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::MissingInput { ref key } if key == "comparison"));
    }
}

//! `chat.prompt` — ask an operator to pick a branch
//!
//! Opens an interactive prompt and suspends with the prompt id as the
//! external wake key; the chat-events consumer resumes the step with a
//! `choice` payload when the operator responds. The resumption entry
//! retracts the prompt, emits the choice as an output, and selects the
//! matching branch.

use crate::context::StepContext;
use crate::executor::ActionExecutor;
use async_trait::async_trait;
use playbook_types::{
    ActionError, ActionTypeDescriptor, BranchDefinition, InputDefinition, InputKind,
    OutputDefinition, PlaybookResult, StepResult, Value,
};
use std::collections::HashMap;

pub const BRANCH_CONFIRMED: &str = "confirmed";
pub const BRANCH_DISMISSED: &str = "dismissed";

pub fn descriptor() -> ActionTypeDescriptor {
    ActionTypeDescriptor::new("chat.prompt", "chat", "Prompt")
        .with_description("Ask an operator to confirm or dismiss before continuing")
        .with_capability("chat")
        .with_input(
            InputDefinition::new("target", "Target", InputKind::Map).required(),
        )
        .with_input(
            InputDefinition::new("text", "Text", InputKind::String)
                .required()
                .with_old_name("message"),
        )
        .with_output(OutputDefinition::new("choice", "Choice"))
        .with_branch(BranchDefinition::new(BRANCH_CONFIRMED, "Operator confirmed"))
        .with_branch(BranchDefinition::new(BRANCH_DISMISSED, "Operator dismissed"))
}

pub struct PromptExecutor;

impl PromptExecutor {
    async fn resume(&self, ctx: &StepContext) -> PlaybookResult<StepResult> {
        // The prompt may already be gone (operator answered from a
        // retracted view, or a previous retraction raced); a failed
        // retraction never blocks the decision already made.
        if let Some(prompt_id) = ctx.resume_get::<String>("prompt_id") {
            if let Err(err) = ctx.messenger().retract_prompt(&prompt_id).await {
                tracing::warn!(
                    step_id = %ctx.step().step_id,
                    prompt_id = %prompt_id,
                    error = %err,
                    "Prompt retraction failed; continuing"
                );
            }
        }

        let choice = ctx.require(ctx.resume_get::<String>("choice"), "choice in wake payload")?;
        if !ctx.descriptor().declares_branch(&choice) {
            return Err(ActionError::invalid_input(
                "choice",
                "one of the declared branch names",
            ));
        }

        Ok(StepResult::succeeded()
            .with_output("choice", choice.clone())
            .with_branch(choice))
    }
}

#[async_trait]
impl ActionExecutor for PromptExecutor {
    async fn execute_step(&self, ctx: &StepContext) -> PlaybookResult<StepResult> {
        if ctx.is_resumption() {
            return self.resume(ctx).await;
        }

        let target = ctx.expect_target("target")?;
        let text: String = ctx.expect("text")?;

        let choices: Vec<_> = ctx
            .descriptor()
            .branches
            .iter()
            .map(|branch| {
                crate::collaborators::PromptChoice::new(&branch.name, &branch.description)
            })
            .collect();

        let handle = ctx.messenger().open_prompt(&target, &text, &choices).await?;
        tracing::debug!(
            step_id = %ctx.step().step_id,
            prompt_id = %handle.prompt_id,
            channel = %target.channel,
            "Prompt opened"
        );

        let state = HashMap::from([(
            "prompt_id".to_string(),
            Value::String(handle.prompt_id),
        )]);
        Ok(StepResult::suspended(state))
    }

    async fn dispose_suspended_step(&self, ctx: &StepContext) -> PlaybookResult<()> {
        let Some(prompt_id) = ctx.resume_get::<String>("prompt_id") else {
            return Ok(());
        };
        ctx.messenger().retract_prompt(&prompt_id).await
    }
}

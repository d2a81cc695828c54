//! Step context: the per-invocation execution environment
//!
//! A context is created by the run driver immediately before invoking
//! an executor and discarded after the call returns. It carries the
//! step's resolved inputs (immutable, captured at construction), the
//! resume state when this invocation is a resumption, and handles to
//! the clock/scheduling/messaging collaborators.
//!
//! Input resolution is read-only and side-effect free. A key is tried
//! under its canonical name first, then under each `old_names` alias
//! in declaration order (first match wins), then falls back to the
//! declared default.

use crate::clock::Clock;
use crate::collaborators::{MessageTarget, Messenger, WakeScheduler};
use playbook_types::{ActionError, ActionTypeDescriptor, FromValue, PlaybookResult, Value};
use std::collections::HashMap;
use std::sync::Arc;

// ── References ───────────────────────────────────────────────────────

/// The parent run an invocation belongs to
#[derive(Clone, Debug)]
pub struct RunRef {
    pub run_id: String,
    /// Correlation id scheduled wakes and external events carry back
    pub correlation_id: String,
}

impl RunRef {
    pub fn new(run_id: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            correlation_id: correlation_id.into(),
        }
    }
}

/// The step being executed within the run
#[derive(Clone, Debug)]
pub struct StepRef {
    pub step_id: String,
}

impl StepRef {
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
        }
    }
}

/// Collaborator handles bundled for context construction
#[derive(Clone)]
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn WakeScheduler>,
    pub messenger: Arc<dyn Messenger>,
}

// ── Step context ─────────────────────────────────────────────────────

/// Transient execution environment for one executor invocation.
///
/// Exclusively owned by that invocation; never shared across
/// concurrent executions.
pub struct StepContext {
    descriptor: Arc<ActionTypeDescriptor>,
    run: RunRef,
    step: StepRef,
    inputs: HashMap<String, Value>,
    /// None on first entry; populated from the persisted suspend
    /// state (plus any wake payload merged in) on resumption. The
    /// same map is supplied when a suspended step is disposed.
    resume_state: Option<HashMap<String, Value>>,
    collaborators: Collaborators,
}

impl StepContext {
    pub fn new(
        descriptor: Arc<ActionTypeDescriptor>,
        run: RunRef,
        step: StepRef,
        inputs: HashMap<String, Value>,
        resume_state: Option<HashMap<String, Value>>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            descriptor,
            run,
            step,
            inputs,
            resume_state,
            collaborators,
        }
    }

    pub fn descriptor(&self) -> &ActionTypeDescriptor {
        &self.descriptor
    }

    pub fn action_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn run(&self) -> &RunRef {
        &self.run
    }

    pub fn step(&self) -> &StepRef {
        &self.step
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.collaborators.clock.now()
    }

    pub fn scheduler(&self) -> &dyn WakeScheduler {
        self.collaborators.scheduler.as_ref()
    }

    pub fn messenger(&self) -> &dyn Messenger {
        self.collaborators.messenger.as_ref()
    }

    // ── Input resolution ─────────────────────────────────────────────

    /// Raw lookup: canonical key, then declared old-name aliases in
    /// order, then the declared default.
    pub fn input(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.inputs.get(key) {
            return Some(value);
        }
        let declaration = self.descriptor.input(key)?;
        for old_name in &declaration.old_names {
            if let Some(value) = self.inputs.get(old_name) {
                return Some(value);
            }
        }
        declaration.default.as_ref()
    }

    /// Typed lookup; None when the input is absent or wrong-shaped
    pub fn get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.input(key).and_then(T::from_value)
    }

    /// Typed lookup that fails with a validation error naming the key
    pub fn expect<T: FromValue>(&self, key: &str) -> PlaybookResult<T> {
        match self.input(key) {
            None => Err(ActionError::missing_input(key)),
            Some(value) => {
                T::from_value(value).ok_or_else(|| ActionError::invalid_input(key, T::expected()))
            }
        }
    }

    /// Assert an invariant over an arbitrary nested value, producing
    /// a validation error describing what was expected
    pub fn require<T>(&self, value: Option<T>, what: &str) -> PlaybookResult<T> {
        value.ok_or_else(|| ActionError::invalid_input(what, "a well-formed value"))
    }

    /// Resolve a structured message-target input: either a map with
    /// `channel` (and optional `thread`) or a bare channel string.
    pub fn expect_target(&self, key: &str) -> PlaybookResult<MessageTarget> {
        let value = self
            .input(key)
            .ok_or_else(|| ActionError::missing_input(key))?;
        match value {
            Value::String(channel) => Ok(MessageTarget::channel(channel.clone())),
            Value::Map(entries) => {
                let channel = entries
                    .get("channel")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ActionError::invalid_input(key, "a message target with a channel")
                    })?;
                let mut target = MessageTarget::channel(channel);
                if let Some(thread) = entries.get("thread").and_then(Value::as_str) {
                    target = target.in_thread(thread);
                }
                Ok(target)
            }
            _ => Err(ActionError::invalid_input(
                key,
                "a channel string or message-target map",
            )),
        }
    }

    // ── Resume state ─────────────────────────────────────────────────

    /// Whether this invocation re-enters a previously suspended step
    pub fn is_resumption(&self) -> bool {
        self.resume_state.is_some()
    }

    pub fn resume_state(&self) -> Option<&HashMap<String, Value>> {
        self.resume_state.as_ref()
    }

    pub fn resume_value(&self, key: &str) -> Option<&Value> {
        self.resume_state.as_ref()?.get(key)
    }

    pub fn resume_get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.resume_value(key).and_then(T::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_context;
    use playbook_types::{InputDefinition, InputKind};

    fn make_descriptor() -> ActionTypeDescriptor {
        ActionTypeDescriptor::new("test.echo", "test", "Echo")
            .with_input(
                InputDefinition::new("seconds", "Seconds", InputKind::Number)
                    .required()
                    .with_old_name("duration_seconds")
                    .with_old_name("delay"),
            )
            .with_input(
                InputDefinition::new("quiet", "Quiet", InputKind::Bool).with_default(false),
            )
    }

    fn inputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_canonical_key_wins_over_aliases() {
        let ctx = make_context(
            make_descriptor(),
            inputs(&[
                ("seconds", Value::Number(10.0)),
                ("duration_seconds", Value::Number(99.0)),
            ]),
            None,
        );
        assert_eq!(ctx.get::<f64>("seconds"), Some(10.0));
    }

    #[test]
    fn test_old_names_tried_in_declaration_order() {
        let ctx = make_context(
            make_descriptor(),
            inputs(&[
                ("delay", Value::Number(7.0)),
                ("duration_seconds", Value::Number(42.0)),
            ]),
            None,
        );
        // duration_seconds is declared before delay; first match wins.
        assert_eq!(ctx.get::<f64>("seconds"), Some(42.0));
    }

    #[test]
    fn test_declared_default_applies() {
        let ctx = make_context(make_descriptor(), HashMap::new(), None);
        assert_eq!(ctx.get::<bool>("quiet"), Some(false));
        assert_eq!(ctx.get::<f64>("seconds"), None);
    }

    #[test]
    fn test_expect_classifies_errors() {
        let ctx = make_context(
            make_descriptor(),
            inputs(&[("seconds", Value::String("soon".into()))]),
            None,
        );

        let missing = ctx.expect::<String>("nonexistent").unwrap_err();
        assert!(matches!(missing, ActionError::MissingInput { .. }));
        assert!(missing.to_string().contains("nonexistent"));

        let invalid = ctx.expect::<f64>("seconds").unwrap_err();
        assert!(matches!(invalid, ActionError::InvalidInput { .. }));
        assert!(invalid.is_bad_input());
    }

    #[test]
    fn test_expect_target_from_string_and_map() {
        let ctx = make_context(
            make_descriptor(),
            inputs(&[
                ("plain", Value::String("#ops".into())),
                (
                    "threaded",
                    Value::Map(
                        [
                            ("channel".to_string(), Value::String("#ops".into())),
                            ("thread".to_string(), Value::String("1234.5678".into())),
                        ]
                        .into_iter()
                        .collect(),
                    ),
                ),
                ("broken", Value::Number(5.0)),
            ]),
            None,
        );

        let plain = ctx.expect_target("plain").unwrap();
        assert_eq!(plain.channel, "#ops");
        assert_eq!(plain.thread, None);

        let threaded = ctx.expect_target("threaded").unwrap();
        assert_eq!(threaded.thread.as_deref(), Some("1234.5678"));

        assert!(ctx.expect_target("broken").unwrap_err().is_bad_input());
        assert!(matches!(
            ctx.expect_target("absent"),
            Err(ActionError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_resume_state_accessors() {
        let ctx = make_context(make_descriptor(), HashMap::new(), None);
        assert!(!ctx.is_resumption());
        assert_eq!(ctx.resume_get::<String>("choice"), None);

        let resumed = make_context(
            make_descriptor(),
            HashMap::new(),
            Some(inputs(&[("choice", Value::String("confirmed".into()))])),
        );
        assert!(resumed.is_resumption());
        assert_eq!(
            resumed.resume_get::<String>("choice").as_deref(),
            Some("confirmed")
        );
    }

    #[test]
    fn test_require() {
        let ctx = make_context(make_descriptor(), HashMap::new(), None);
        assert_eq!(ctx.require(Some(5), "anything").unwrap(), 5);
        let err = ctx.require::<i64>(None, "choice in resume state").unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("choice in resume state"));
    }
}

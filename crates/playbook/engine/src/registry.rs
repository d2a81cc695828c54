//! Action registry: the catalog of action types
//!
//! Each action type contributes exactly one descriptor plus one
//! executor factory, registered explicitly at startup. The type set
//! is closed and auditable — no runtime discovery. A duplicate name
//! is a fatal configuration error.

use crate::executor::ActionExecutor;
use playbook_types::{ActionError, ActionTypeDescriptor, PlaybookResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh executor for one invocation
pub type ExecutorFactory = Arc<dyn Fn() -> Arc<dyn ActionExecutor> + Send + Sync>;

#[derive(Clone)]
struct ActionEntry {
    descriptor: Arc<ActionTypeDescriptor>,
    factory: ExecutorFactory,
}

/// Registry mapping action type names to (descriptor, executor factory)
#[derive(Clone, Default)]
pub struct ActionRegistry {
    entries: HashMap<String, ActionEntry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an action type.
    ///
    /// Names identify action types forever; re-registering one is a
    /// fatal startup error, not a replacement.
    pub fn register<F>(&mut self, descriptor: ActionTypeDescriptor, factory: F) -> PlaybookResult<()>
    where
        F: Fn() -> Arc<dyn ActionExecutor> + Send + Sync + 'static,
    {
        let name = descriptor.name.clone();
        if self.entries.contains_key(&name) {
            return Err(ActionError::DuplicateActionType(name));
        }

        self.entries.insert(
            name.clone(),
            ActionEntry {
                descriptor: Arc::new(descriptor),
                factory: Arc::new(factory),
            },
        );

        tracing::info!(action_type = %name, "Action type registered");
        Ok(())
    }

    /// Get the descriptor for an action type
    pub fn descriptor(&self, name: &str) -> PlaybookResult<Arc<ActionTypeDescriptor>> {
        self.entries
            .get(name)
            .map(|entry| Arc::clone(&entry.descriptor))
            .ok_or_else(|| ActionError::UnknownActionType(name.to_string()))
    }

    /// Build an executor for an action type
    pub fn executor(&self, name: &str) -> PlaybookResult<Arc<dyn ActionExecutor>> {
        self.entries
            .get(name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| ActionError::UnknownActionType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// All registered descriptors
    pub fn list(&self) -> Vec<Arc<ActionTypeDescriptor>> {
        self.entries
            .values()
            .map(|entry| Arc::clone(&entry.descriptor))
            .collect()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ActionRegistry").field("names", &names).finish()
    }
}

//! Error types for the playbook engine

/// Errors that can occur while registering or executing actions
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Missing required input: {key}")]
    MissingInput { key: String },

    #[error("Invalid input '{key}': expected {expected}")]
    InvalidInput { key: String, expected: String },

    #[error("Duplicate action type registered: {0}")]
    DuplicateActionType(String),

    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    #[error("Action '{action}' selected undeclared branch: {branch}")]
    UndeclaredBranch { action: String, branch: String },

    #[error("Suspended result carries no suspend state")]
    MissingSuspendState,

    #[error("Invalid step transition: {0}")]
    InvalidTransition(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Internal action failure: {0}")]
    Internal(String),
}

impl ActionError {
    /// Missing/malformed declared input. The run driver may choose to
    /// halt only the current step for this class, versus the whole run.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            ActionError::MissingInput { .. } | ActionError::InvalidInput { .. }
        )
    }

    pub fn missing_input(key: impl Into<String>) -> Self {
        ActionError::MissingInput { key: key.into() }
    }

    pub fn invalid_input(key: impl Into<String>, expected: impl Into<String>) -> Self {
        ActionError::InvalidInput {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

/// Result type alias for playbook operations
pub type PlaybookResult<T> = Result<T, ActionError>;

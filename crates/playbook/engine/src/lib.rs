//! Playbook Step-Execution Runtime
//!
//! This crate is the contract by which one playbook step runs, may
//! suspend for an arbitrary duration or external event, and later
//! resumes exactly where it left off — across process restarts,
//! without holding live resources while suspended.
//!
//! # Key Principle
//!
//! **Executors never sequence steps.** An executor returns a
//! [`playbook_types::StepResult`]; advancing the run — branch, default
//! successor, failure policy — is exclusively the run driver's job.
//! That is what makes branch selection pure data.
//!
//! # Architecture
//!
//! - [`ActionRegistry`] — Maps action type names to (descriptor,
//!   executor factory); duplicates are a fatal startup error
//! - [`StepContext`] — Per-invocation environment: resolved inputs,
//!   resume state, collaborator handles
//! - [`ActionExecutor`] — The behavior for one action type, with an
//!   optional suspended-step cleanup capability
//! - [`StepRunner`] — Invokes executors and maps their errors onto
//!   the failure taxonomy
//! - [`condition`] — The shared comparison engine conditional action
//!   types rely on
//! - [`actions`] — The built-in action type catalog
//!
//! # Example
//!
//! ```rust
//! use playbook_engine::ActionRegistry;
//! use playbook_engine::actions::register_builtin_actions;
//!
//! let mut registry = ActionRegistry::new();
//! register_builtin_actions(&mut registry).unwrap();
//!
//! assert!(registry.contains("system.wait"));
//! assert!(registry.contains("system.condition"));
//! ```

#![deny(unsafe_code)]

pub mod actions;
pub mod clock;
pub mod collaborators;
pub mod condition;
pub mod context;
pub mod executor;
pub mod registry;
pub mod runner;
pub mod testing;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use collaborators::{
    MessageReceipt, MessageTarget, Messenger, PromptChoice, PromptHandle, ResumptionMessage,
    WakeScheduler,
};
pub use condition::{Comparison, ConditionOptions};
pub use context::{Collaborators, RunRef, StepContext, StepRef};
pub use executor::ActionExecutor;
pub use registry::ActionRegistry;
pub use runner::StepRunner;

//! Playbook Domain Types
//!
//! A playbook is a multi-step operational workflow triggered by an
//! external event. The engine executes one step at a time; a step may
//! pause ("suspend") for an arbitrary duration or external event and
//! later resume exactly where it left off, across process restarts.
//! This crate holds the pure data contracts that make that possible.
//!
//! # Key Concepts
//!
//! - **ActionTypeDescriptor**: Static declarative metadata for one
//!   kind of step — its inputs, outputs, branches, and capabilities.
//! - **StepResult**: The outcome an executor returns — succeeded,
//!   failed, suspended, or complete-playbook — with outputs, notices,
//!   and (when suspended) the state blob to persist.
//! - **StepPhase**: The per-step lifecycle persisted by the run
//!   driver, with at-most-once resume semantics keyed by a wake token.
//! - **Value**: The loosely-typed union flowing through step inputs
//!   and outputs.
//!
//! # Design Principles
//!
//! 1. Descriptors are pure data, never behavior. A descriptor's name
//!    is stable forever — historical runs reference it.
//! 2. Suspension holds no live resources. Only the persisted suspend
//!    state and an optional externally scheduled wake remain.
//! 3. A duplicate wake is a no-op, never a second transition.

#![deny(unsafe_code)]

mod descriptor;
mod errors;
mod lifecycle;
mod result;
mod value;

pub use descriptor::*;
pub use errors::*;
pub use lifecycle::*;
pub use result::*;
pub use value::*;

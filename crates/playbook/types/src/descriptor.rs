//! Action type descriptors: static declarative metadata for one kind of step
//!
//! Every action type contributes exactly one descriptor. Descriptors
//! are pure data — no executable behavior — registered at process
//! startup and read-only thereafter.
//!
//! The name is the identity of the type across versions. Historical
//! runs reference it, so it is stable forever. Renaming an input key
//! is backward compatible only by appending the previous key to
//! `old_names`; removing a key from a type with production history is
//! a breaking change and must never be done.

use crate::Value;
use serde::{Deserialize, Serialize};

// ── Input / output schema ────────────────────────────────────────────

/// Declared shape of a single input value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    String,
    Number,
    Bool,
    List,
    Map,
}

/// One declared input of an action type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputDefinition {
    /// Canonical key the executor resolves the value by
    pub key: String,
    /// Authoring-surface label
    pub label: String,
    /// Declared value shape
    pub kind: InputKind,
    /// Whether the input must be present for the step to run
    pub required: bool,
    /// Default used when the input is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Hidden from authoring surfaces (internal plumbing inputs)
    #[serde(default)]
    pub hidden: bool,
    /// Previous keys this input was known by, tried in order.
    /// Append-only: steps authored before a rename still resolve.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub old_names: Vec<String>,
}

impl InputDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: InputKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            default: None,
            hidden: false,
            old_names: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_old_name(mut self, old_name: impl Into<String>) -> Self {
        self.old_names.push(old_name.into());
        self
    }
}

/// One declared output of an action type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputDefinition {
    /// Key the value is merged under in the run-wide variable scope
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl OutputDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A named continuation point a successful step may select
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BranchDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl BranchDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

// ── Presentation ─────────────────────────────────────────────────────

/// Authoring-surface presentation for an action type
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Presentation {
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

// ── Descriptor ───────────────────────────────────────────────────────

/// Static declarative metadata for one action type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionTypeDescriptor {
    /// Globally unique, stable identifier (e.g. `"system.wait"`)
    pub name: String,
    /// Grouping category for authoring surfaces
    pub category: String,
    pub presentation: Presentation,
    /// Ordered input declarations
    pub inputs: Vec<InputDefinition>,
    pub outputs: Vec<OutputDefinition>,
    /// Declared continuation points; empty for linear action types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchDefinition>,
    /// Integration or feature gates required before this type is offered
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_capabilities: Vec<String>,
    /// Only offered to staff operators
    #[serde(default)]
    pub staff_only: bool,
}

impl ActionTypeDescriptor {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            presentation: Presentation {
                label: label.into(),
                ..Presentation::default()
            },
            inputs: Vec::new(),
            outputs: Vec::new(),
            branches: Vec::new(),
            required_capabilities: Vec::new(),
            staff_only: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.presentation.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.presentation.icon = icon.into();
        self
    }

    pub fn with_input(mut self, input: InputDefinition) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: OutputDefinition) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_branch(mut self, branch: BranchDefinition) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.push(capability.into());
        self
    }

    pub fn staff_only(mut self) -> Self {
        self.staff_only = true;
        self
    }

    /// Look up an input declaration by its canonical key
    pub fn input(&self, key: &str) -> Option<&InputDefinition> {
        self.inputs.iter().find(|i| i.key == key)
    }

    /// Whether this type declares a branch with the given name
    pub fn declares_branch(&self, name: &str) -> bool {
        self.branches.iter().any(|b| b.name == name)
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }

    /// Whether this type declares any branches at all
    pub fn has_branches(&self) -> bool {
        !self.branches.is_empty()
    }
}

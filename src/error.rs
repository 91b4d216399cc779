//! Error kinds for the state/approval core
//!
//! A corrupt state record is indistinguishable from an absent one at the
//! API boundary: both surface as `ProjectNotFound`. The parse failure is
//! logged to stderr at the point of detection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No project state record at the storage location (or it failed to parse)
    #[error("No project found at '{location}'. Run 'planforge init' first.")]
    ProjectNotFound { location: String },

    /// Refusing to overwrite an existing project on initialize
    #[error("A project already exists at '{location}'. Delete .planforge/ to start over.")]
    ProjectExists { location: String },

    /// Document is missing required sections; recoverable via --force
    #[error("Document '{document}' is missing required sections: {}", missing_sections.join(", "))]
    ValidationFailed {
        document: String,
        missing_sections: Vec<String>,
    },

    /// Validation failed and strict mode is on; blocks approval unless forced
    #[error("Strict mode blocked approval of '{document}':\n{}", errors.join("\n"))]
    StrictModeBlocked {
        document: String,
        errors: Vec<String>,
    },

    /// Generation capability not configured; fatal for generation-dependent ops
    #[error("Provider '{provider}' is not configured.\n\n{instructions}")]
    ProviderUnavailable {
        provider: String,
        instructions: String,
    },

    /// The generation provider ran but produced unusable output
    #[error("Provider '{provider}' failed: {message}")]
    ProviderFailed { provider: String, message: String },

    /// Durable read/write failure; propagated, never retried here
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// State record serialization failure
    #[error("Failed to serialize project state: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkflowError {
    /// True for errors the caller may recover from by passing --force
    pub fn is_forceable(&self) -> bool {
        matches!(
            self,
            WorkflowError::ValidationFailed { .. } | WorkflowError::StrictModeBlocked { .. }
        )
    }
}

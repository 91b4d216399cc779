// Planforge - Checkpointed planning document pipeline
// Drives an RFC → Plan → Rollout → Prompts workflow with approval gating

pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod hash;
pub mod models;
pub mod render;
pub mod state;
pub mod steps;
pub mod validator;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use error::WorkflowError;
pub use models::{Approval, CheckpointResponse, DocumentType, ProjectState};
pub use state::ProjectStore;
pub use steps::{Phase, StepId};

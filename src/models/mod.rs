pub mod project;
pub mod validation;

pub use project::{
    Approval, CheckpointResponse, DocumentProgress, DocumentType, Milestone, PlanProgress,
    ProjectMetadata, ProjectState, PromptsProgress, RfcProgress, Risk, RolloutProgress, Stage,
    StagePrompt, StateUpdate, STATE_SCHEMA_VERSION,
};
pub use validation::{DocumentValidation, SectionRequirement};

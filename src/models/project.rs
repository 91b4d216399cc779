//! Persisted project state
//!
//! One JSON record per project under `.planforge/state.json`. The root
//! aggregate owns everything: metadata, pipeline position, checkpoint
//! feedback history, the approval ledger, and accumulated document
//! content. Serialization must round-trip field-for-field.

use crate::steps::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Current state record schema version
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// The three approvable document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Rfc,
    Plan,
    Rollout,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [DocumentType::Rfc, DocumentType::Plan, DocumentType::Rollout];

    pub fn name(&self) -> &'static str {
        match self {
            DocumentType::Rfc => "rfc",
            DocumentType::Plan => "plan",
            DocumentType::Rollout => "rollout",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable project metadata, set once at creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub stack: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One checkpoint interaction. Append-only; a revisited step
/// accumulates multiple entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointResponse {
    pub step_id: StepId,
    #[serde(default)]
    pub disagreements: Option<String>,
    #[serde(default)]
    pub clarifications: Option<String>,
    #[serde(default)]
    pub missed_constraints: Option<String>,
    pub responded_at: DateTime<Utc>,
}

impl CheckpointResponse {
    /// True when the operator had nothing to say at this checkpoint
    pub fn is_empty(&self) -> bool {
        self.disagreements.is_none()
            && self.clarifications.is_none()
            && self.missed_constraints.is_none()
    }
}

/// Recorded acceptance of a specific content hash. At most one live
/// entry per document type; approving replaces the prior entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Approval {
    pub document_type: DocumentType,
    /// Hash of the literal rendered content at approval time
    pub content_hash: String,
    pub approved_at: DateTime<Utc>,
}

/// One stage of the implementation plan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// A rollout risk with its mitigation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Risk {
    pub description: String,
    #[serde(default)]
    pub mitigation: Option<String>,
}

/// A rollout milestone, optionally tied to a plan stage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub name: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub criteria: Vec<String>,
}

/// Generated implementation prompt for one plan stage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StagePrompt {
    pub stage: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RfcProgress {
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub non_goals: Vec<String>,
    #[serde(default)]
    pub approach: Option<String>,
    #[serde(default)]
    pub open_questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanProgress {
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RolloutProgress {
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub rollback: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptsProgress {
    #[serde(default)]
    pub stage_prompts: Vec<StagePrompt>,
}

/// Accumulated generated content per phase; the renderer turns this
/// into document text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentProgress {
    #[serde(default)]
    pub rfc: RfcProgress,
    #[serde(default)]
    pub plan: PlanProgress,
    #[serde(default)]
    pub rollout: RolloutProgress,
    #[serde(default)]
    pub prompts: PromptsProgress,
}

/// Root aggregate, one instance per project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectState {
    pub version: u32,
    pub project: ProjectMetadata,
    pub current_step: StepId,
    #[serde(default)]
    pub checkpoint_responses: Vec<CheckpointResponse>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    /// documentType -> normalized hash of the last-approved content,
    /// kept in sync with the approval ledger for the drift check
    #[serde(default)]
    pub document_hashes: HashMap<DocumentType, String>,
    #[serde(default)]
    pub document_progress: DocumentProgress,
    #[serde(default)]
    pub strict_mode: bool,
}

impl ProjectState {
    /// Fresh state positioned at the first step of the graph
    pub fn new(project: ProjectMetadata) -> Self {
        Self {
            version: STATE_SCHEMA_VERSION,
            project,
            current_step: crate::steps::first_step(),
            checkpoint_responses: Vec::new(),
            approvals: Vec::new(),
            document_hashes: HashMap::new(),
            document_progress: DocumentProgress::default(),
            strict_mode: false,
        }
    }

    /// The live approval for a document type, if any
    pub fn approval_for(&self, document_type: DocumentType) -> Option<&Approval> {
        self.approvals.iter().find(|a| a.document_type == document_type)
    }
}

/// Partial update applied by `ProjectStore::update`.
///
/// Merge is shallow: a field present here replaces the stored field
/// wholesale. In particular a `document_progress` update overwrites
/// every phase's progress, not just the one the caller touched.
/// Callers that need a field-level change must load, mutate, save.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub current_step: Option<StepId>,
    pub checkpoint_responses: Option<Vec<CheckpointResponse>>,
    pub approvals: Option<Vec<Approval>>,
    pub document_hashes: Option<HashMap<DocumentType, String>>,
    pub document_progress: Option<DocumentProgress>,
    pub strict_mode: Option<bool>,
}

impl StateUpdate {
    /// Apply this partial over a loaded state, shallow-merge semantics
    pub fn apply(self, state: &mut ProjectState) {
        if let Some(step) = self.current_step {
            state.current_step = step;
        }
        if let Some(responses) = self.checkpoint_responses {
            state.checkpoint_responses = responses;
        }
        if let Some(approvals) = self.approvals {
            state.approvals = approvals;
        }
        if let Some(hashes) = self.document_hashes {
            state.document_hashes = hashes;
        }
        if let Some(progress) = self.document_progress {
            state.document_progress = progress;
        }
        if let Some(strict) = self.strict_mode {
            state.strict_mode = strict;
        }
    }
}

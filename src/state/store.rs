//! ProjectStore - durable load/save/update of the project state record
//!
//! One JSON record per project at `<root>/.planforge/state.json`. Every
//! operation is a full load-modify-save cycle; there is no locking and
//! no optimistic token, so two concurrent operators race and the last
//! writer wins. Saves serialize to a complete buffer and go through a
//! temp file plus rename, so an interrupted write leaves the prior
//! record intact.

use crate::error::WorkflowError;
use crate::hash::{content_hash, normalized_hash};
use crate::models::{
    Approval, CheckpointResponse, DocumentType, ProjectMetadata, ProjectState, StateUpdate,
};
use crate::steps::{self, Phase, StepId};
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Hidden subdirectory holding the state record and config
pub const STORE_DIR: &str = ".planforge";
const STATE_FILE: &str = "state.json";

/// Store for a single project's state record. The storage location is
/// explicit; nothing here reads the process working directory.
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root this store reads and writes under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.store_dir().join(STATE_FILE)
    }

    /// True iff a state record is present. Never errors on absence.
    pub fn exists(&self) -> bool {
        self.state_path().is_file()
    }

    /// Create a fresh project. Fails if a record already exists; never
    /// silently overwrites.
    pub fn initialize(&self, metadata: ProjectMetadata) -> Result<ProjectState, WorkflowError> {
        if self.exists() {
            return Err(WorkflowError::ProjectExists {
                location: self.root.display().to_string(),
            });
        }

        std::fs::create_dir_all(self.store_dir())?;
        let state = ProjectState::new(metadata);
        self.save(&state)?;
        Ok(state)
    }

    /// Load the state record. An absent record and an unparsable one are
    /// the same error to the caller; the parse failure is only logged.
    pub fn load(&self) -> Result<ProjectState, WorkflowError> {
        let path = self.state_path();
        let not_found = || WorkflowError::ProjectNotFound {
            location: self.root.display().to_string(),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(WorkflowError::Io(e)),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                eprintln!(
                    "warning: state record at {} is corrupt: {}",
                    path.display(),
                    e
                );
                Err(not_found())
            }
        }
    }

    /// Overwrite the durable record with the given state. Serializes to
    /// a complete buffer first; the write is temp-file + atomic rename.
    pub fn save(&self, state: &ProjectState) -> Result<(), WorkflowError> {
        let dir = self.store_dir();
        std::fs::create_dir_all(&dir)?;

        let buffer = serde_json::to_string_pretty(state)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(buffer.as_bytes())?;
        tmp.flush()?;
        tmp.persist(self.state_path())
            .map_err(|e| WorkflowError::Io(e.error))?;
        Ok(())
    }

    /// Load, shallow-merge the partial over the loaded state, save.
    /// Fields present in the partial replace stored fields wholesale;
    /// see `StateUpdate` for the merge contract.
    pub fn update(&self, partial: StateUpdate) -> Result<ProjectState, WorkflowError> {
        let mut state = self.load()?;
        partial.apply(&mut state);
        self.save(&state)?;
        Ok(state)
    }

    /// Advance the pipeline to the successor of the current step.
    /// Returns the saved state; a no-op on the terminal step.
    pub fn advance(&self) -> Result<ProjectState, WorkflowError> {
        let mut state = self.load()?;
        if let Some(next) = steps::next_step(state.current_step) {
            state.current_step = next;
            self.save(&state)?;
        }
        Ok(state)
    }

    // =========================================================================
    // Checkpoint recorder
    // =========================================================================

    /// Append one checkpoint interaction. Never deduplicates; revisiting
    /// a step accumulates entries.
    pub fn record_checkpoint_response(
        &self,
        step_id: StepId,
        disagreements: Option<String>,
        clarifications: Option<String>,
        missed_constraints: Option<String>,
    ) -> Result<ProjectState, WorkflowError> {
        let mut state = self.load()?;
        state.checkpoint_responses.push(CheckpointResponse {
            step_id,
            disagreements,
            clarifications,
            missed_constraints,
            responded_at: Utc::now(),
        });
        self.save(&state)?;
        Ok(state)
    }

    /// All checkpoint feedback recorded for steps of a phase, oldest
    /// first. Concatenates every matching entry, not just the latest.
    pub fn feedback_for_phase(state: &ProjectState, phase: Phase) -> Vec<&CheckpointResponse> {
        state
            .checkpoint_responses
            .iter()
            .filter(|r| steps::phase(r.step_id) == phase)
            .collect()
    }

    // =========================================================================
    // Approval ledger
    // =========================================================================

    /// Record approval of the given content. Replaces any prior entry
    /// for the document type (delete-then-insert) and syncs the
    /// normalized hash used by the drift check.
    pub fn record_approval(
        &self,
        document_type: DocumentType,
        content: &str,
    ) -> Result<ProjectState, WorkflowError> {
        let mut state = self.load()?;

        state.approvals.retain(|a| a.document_type != document_type);
        state.approvals.push(Approval {
            document_type,
            content_hash: content_hash(content),
            approved_at: Utc::now(),
        });
        state
            .document_hashes
            .insert(document_type, normalized_hash(content));

        self.save(&state)?;
        Ok(state)
    }

    /// True iff a live approval exists for the type, any hash
    pub fn is_document_approved(state: &ProjectState, document_type: DocumentType) -> bool {
        state.approval_for(document_type).is_some()
    }

    /// True if no live approval exists for the type, or the current
    /// content's normalized hash differs from the one recorded at
    /// approval. The ledger is authoritative: a stale hash left behind
    /// by a removed approval does not count as approved content.
    pub fn has_document_changed(
        state: &ProjectState,
        document_type: DocumentType,
        current_content: &str,
    ) -> bool {
        if state.approval_for(document_type).is_none() {
            return true;
        }
        match state.document_hashes.get(&document_type) {
            Some(approved) => normalized_hash(current_content) != *approved,
            None => true,
        }
    }

    /// True iff rfc, plan, and rollout all carry a live approval
    pub fn are_all_documents_approved(state: &ProjectState) -> bool {
        DocumentType::ALL
            .iter()
            .all(|t| Self::is_document_approved(state, *t))
    }
}

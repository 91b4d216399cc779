//! Cross-document consistency checks
//!
//! Run before `approve --all`: catches structural disagreement between
//! the plan and rollout documents that per-document validation cannot
//! see. Findings do not block approval on their own; the caller decides
//! (and may skip the check entirely).

use crate::models::ProjectState;

#[derive(Debug, Clone)]
pub struct ConsistencyFinding {
    pub message: String,
}

impl ConsistencyFinding {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Check structural agreement across the accumulated documents
pub fn check_consistency(state: &ProjectState) -> Vec<ConsistencyFinding> {
    let mut findings = Vec::new();
    let progress = &state.document_progress;

    if progress.plan.stages.is_empty() {
        findings.push(ConsistencyFinding::new(
            "Plan has no stages; rollout milestones have nothing to track",
        ));
    }

    for stage in &progress.plan.stages {
        if stage.tasks.is_empty() {
            findings.push(ConsistencyFinding::new(format!(
                "Plan stage '{}' has no tasks",
                stage.name
            )));
        }
        for dep in &stage.depends_on {
            if !progress.plan.stages.iter().any(|s| &s.name == dep) {
                findings.push(ConsistencyFinding::new(format!(
                    "Plan stage '{}' depends on unknown stage '{}'",
                    stage.name, dep
                )));
            }
        }
    }

    // Every milestone that names a stage must name a real one
    for milestone in &progress.rollout.milestones {
        if let Some(stage) = &milestone.stage {
            if !progress.plan.stages.iter().any(|s| &s.name == stage) {
                findings.push(ConsistencyFinding::new(format!(
                    "Rollout milestone '{}' references unknown plan stage '{}'",
                    milestone.name, stage
                )));
            }
        }
    }

    if !progress.rollout.milestones.is_empty() && progress.rollout.risks.is_empty() {
        findings.push(ConsistencyFinding::new(
            "Rollout defines milestones but no risks",
        ));
    }

    findings
}

//! Static step graph for the planning pipeline
//!
//! Steps form a single linear chain across four phases. The table is
//! constructed once and never mutated; traversal is a pure function of
//! the current step, so it is safe to share freely.
//!
//! Each phase ends in a `*.complete` sentinel step. A phase does not
//! count as complete while the pipeline is still inside it, even past
//! its last substantive step, until the sentinel is reached.

use serde::{Deserialize, Serialize};

/// Phase grouping, in fixed pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Rfc,
    Plan,
    Rollout,
    Prompts,
}

pub const PHASE_ORDER: &[Phase] = &[Phase::Rfc, Phase::Plan, Phase::Rollout, Phase::Prompts];

impl Phase {
    /// Index in the fixed phase order
    pub fn index(&self) -> usize {
        PHASE_ORDER.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Rfc => "rfc",
            Phase::Plan => "plan",
            Phase::Rollout => "rollout",
            Phase::Prompts => "prompts",
        }
    }
}

/// One unit of work in the fixed workflow sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepId {
    #[serde(rename = "rfc.problem")]
    RfcProblem,
    #[serde(rename = "rfc.goals")]
    RfcGoals,
    #[serde(rename = "rfc.approach")]
    RfcApproach,
    #[serde(rename = "rfc.review")]
    RfcReview,
    #[serde(rename = "rfc.complete")]
    RfcComplete,
    #[serde(rename = "plan.stages")]
    PlanStages,
    #[serde(rename = "plan.dependencies")]
    PlanDependencies,
    #[serde(rename = "plan.review")]
    PlanReview,
    #[serde(rename = "plan.complete")]
    PlanComplete,
    #[serde(rename = "rollout.risks")]
    RolloutRisks,
    #[serde(rename = "rollout.milestones")]
    RolloutMilestones,
    #[serde(rename = "rollout.review")]
    RolloutReview,
    #[serde(rename = "rollout.complete")]
    RolloutComplete,
    #[serde(rename = "prompts.generate")]
    PromptsGenerate,
    #[serde(rename = "prompts.complete")]
    PromptsComplete,
}

/// Immutable definition of one step
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub id: StepId,
    pub phase: Phase,
    pub label: &'static str,
    pub is_checkpoint: bool,
    pub next: Option<StepId>,
}

/// The full pipeline, in execution order. One terminal step, acyclic,
/// exactly one edge crossing each phase boundary.
const STEPS: &[StepDefinition] = &[
    StepDefinition {
        id: StepId::RfcProblem,
        phase: Phase::Rfc,
        label: "Draft problem statement",
        is_checkpoint: false,
        next: Some(StepId::RfcGoals),
    },
    StepDefinition {
        id: StepId::RfcGoals,
        phase: Phase::Rfc,
        label: "Define goals and non-goals",
        is_checkpoint: false,
        next: Some(StepId::RfcApproach),
    },
    StepDefinition {
        id: StepId::RfcApproach,
        phase: Phase::Rfc,
        label: "Propose technical approach",
        is_checkpoint: false,
        next: Some(StepId::RfcReview),
    },
    StepDefinition {
        id: StepId::RfcReview,
        phase: Phase::Rfc,
        label: "Review RFC draft",
        is_checkpoint: true,
        next: Some(StepId::RfcComplete),
    },
    StepDefinition {
        id: StepId::RfcComplete,
        phase: Phase::Rfc,
        label: "RFC complete",
        is_checkpoint: false,
        next: Some(StepId::PlanStages),
    },
    StepDefinition {
        id: StepId::PlanStages,
        phase: Phase::Plan,
        label: "Break work into stages",
        is_checkpoint: false,
        next: Some(StepId::PlanDependencies),
    },
    StepDefinition {
        id: StepId::PlanDependencies,
        phase: Phase::Plan,
        label: "Map stage dependencies",
        is_checkpoint: false,
        next: Some(StepId::PlanReview),
    },
    StepDefinition {
        id: StepId::PlanReview,
        phase: Phase::Plan,
        label: "Review implementation plan",
        is_checkpoint: true,
        next: Some(StepId::PlanComplete),
    },
    StepDefinition {
        id: StepId::PlanComplete,
        phase: Phase::Plan,
        label: "Plan complete",
        is_checkpoint: false,
        next: Some(StepId::RolloutRisks),
    },
    StepDefinition {
        id: StepId::RolloutRisks,
        phase: Phase::Rollout,
        label: "Assess rollout risks",
        is_checkpoint: false,
        next: Some(StepId::RolloutMilestones),
    },
    StepDefinition {
        id: StepId::RolloutMilestones,
        phase: Phase::Rollout,
        label: "Define rollout milestones",
        is_checkpoint: false,
        next: Some(StepId::RolloutReview),
    },
    StepDefinition {
        id: StepId::RolloutReview,
        phase: Phase::Rollout,
        label: "Review rollout strategy",
        is_checkpoint: true,
        next: Some(StepId::RolloutComplete),
    },
    StepDefinition {
        id: StepId::RolloutComplete,
        phase: Phase::Rollout,
        label: "Rollout complete",
        is_checkpoint: false,
        next: Some(StepId::PromptsGenerate),
    },
    StepDefinition {
        id: StepId::PromptsGenerate,
        phase: Phase::Prompts,
        label: "Generate per-stage prompts",
        is_checkpoint: false,
        next: Some(StepId::PromptsComplete),
    },
    StepDefinition {
        id: StepId::PromptsComplete,
        phase: Phase::Prompts,
        label: "Pipeline complete",
        is_checkpoint: false,
        next: None,
    },
];

/// First step of the pipeline
pub fn first_step() -> StepId {
    STEPS[0].id
}

/// Look up a step's definition
pub fn step(id: StepId) -> &'static StepDefinition {
    STEPS
        .iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| unreachable!("step table is total over StepId"))
}

/// Successor of a step, None for the terminal step
pub fn next_step(id: StepId) -> Option<StepId> {
    step(id).next
}

pub fn is_checkpoint(id: StepId) -> bool {
    step(id).is_checkpoint
}

pub fn phase(id: StepId) -> Phase {
    step(id).phase
}

pub fn label(id: StepId) -> &'static str {
    step(id).label
}

/// The sentinel step closing a phase
pub fn phase_sentinel(phase: Phase) -> StepId {
    match phase {
        Phase::Rfc => StepId::RfcComplete,
        Phase::Plan => StepId::PlanComplete,
        Phase::Rollout => StepId::RolloutComplete,
        Phase::Prompts => StepId::PromptsComplete,
    }
}

/// All steps belonging to a phase, in order
pub fn phase_steps(target: Phase) -> Vec<&'static StepDefinition> {
    STEPS.iter().filter(|s| s.phase == target).collect()
}

/// Position of a step in the full linear ordering
pub fn step_index(id: StepId) -> usize {
    STEPS.iter().position(|s| s.id == id).unwrap_or(0)
}

/// A phase is complete once the pipeline has moved past it, or is sitting
/// exactly on its `*.complete` sentinel. Being inside the phase past its
/// last substantive step does not count until the sentinel is reached.
pub fn is_phase_complete(current: StepId, target: Phase) -> bool {
    phase(current).index() > target.index() || current == phase_sentinel(target)
}

/// Percentage of steps passed over the full linear ordering.
/// Deliberately unweighted; every step counts equally.
pub fn progress_percentage(current: StepId) -> u8 {
    let idx = step_index(current) as f64;
    let total = (STEPS.len() - 1) as f64;
    (idx / total * 100.0).round() as u8
}

/// Steps remaining after the current one
pub fn remaining_steps(current: StepId) -> usize {
    STEPS.len() - 1 - step_index(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_chain_is_finite_acyclic_and_terminates() {
        let mut visited = HashSet::new();
        let mut current = Some(first_step());

        while let Some(id) = current {
            assert!(visited.insert(id), "step {:?} visited twice", id);
            current = next_step(id);
        }

        assert_eq!(visited.len(), STEPS.len(), "chain must visit every step");
        // Exactly one terminal step
        let terminals: Vec<_> = STEPS.iter().filter(|s| s.next.is_none()).collect();
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].id, StepId::PromptsComplete);
    }

    #[test]
    fn test_exactly_one_cross_phase_edge_per_boundary() {
        for window in PHASE_ORDER.windows(2) {
            let (from, to) = (window[0], window[1]);
            let crossing: Vec<_> = STEPS
                .iter()
                .filter(|s| {
                    s.phase == from
                        && s.next.map(|n| phase(n) == to).unwrap_or(false)
                })
                .collect();
            assert_eq!(crossing.len(), 1, "{:?} -> {:?}", from, to);
            // The crossing step is always the phase sentinel
            assert_eq!(crossing[0].id, phase_sentinel(from));
        }
    }

    #[test]
    fn test_checkpoints_are_the_review_steps() {
        let checkpoints: Vec<_> = STEPS.iter().filter(|s| s.is_checkpoint).map(|s| s.id).collect();
        assert_eq!(
            checkpoints,
            vec![StepId::RfcReview, StepId::PlanReview, StepId::RolloutReview]
        );
    }

    #[test]
    fn test_phase_complete_requires_sentinel() {
        // Past the last substantive RFC step, but not at the sentinel
        assert!(!is_phase_complete(StepId::RfcReview, Phase::Rfc));
        // On the sentinel
        assert!(is_phase_complete(StepId::RfcComplete, Phase::Rfc));
        // Past the phase entirely
        assert!(is_phase_complete(StepId::PlanStages, Phase::Rfc));
        // Not yet there
        assert!(!is_phase_complete(StepId::RfcProblem, Phase::Plan));
    }

    #[test]
    fn test_progress_percentage_endpoints() {
        assert_eq!(progress_percentage(first_step()), 0);
        assert_eq!(progress_percentage(StepId::PromptsComplete), 100);
        // rfc.review is index 3 of 14 -> round(21.43) = 21
        assert_eq!(progress_percentage(StepId::RfcReview), 21);
    }

    #[test]
    fn test_remaining_steps() {
        assert_eq!(remaining_steps(first_step()), STEPS.len() - 1);
        assert_eq!(remaining_steps(StepId::PromptsComplete), 0);
    }

    #[test]
    fn test_step_id_serde_tokens() {
        let json = serde_json::to_string(&StepId::RfcProblem).unwrap();
        assert_eq!(json, "\"rfc.problem\"");
        let back: StepId = serde_json::from_str("\"plan.complete\"").unwrap();
        assert_eq!(back, StepId::PlanComplete);
    }

    #[test]
    fn test_phase_steps_ordering() {
        let rfc: Vec<_> = phase_steps(Phase::Rfc).iter().map(|s| s.id).collect();
        assert_eq!(rfc.first(), Some(&StepId::RfcProblem));
        assert_eq!(rfc.last(), Some(&StepId::RfcComplete));
        assert_eq!(rfc.len(), 5);
    }
}

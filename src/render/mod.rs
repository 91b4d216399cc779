//! Markdown rendering of documents from accumulated progress
//!
//! Pure functions of the state: no I/O, no side effects. The rendered
//! text is what gets validated and hashed for approval, so the output
//! for a given state must be byte-stable.

use crate::models::{DocumentType, ProjectState};

/// Render one document type from the state's accumulated progress
pub fn render(document_type: DocumentType, state: &ProjectState) -> String {
    match document_type {
        DocumentType::Rfc => render_rfc(state),
        DocumentType::Plan => render_plan(state),
        DocumentType::Rollout => render_rollout(state),
    }
}

fn render_rfc(state: &ProjectState) -> String {
    let rfc = &state.document_progress.rfc;
    let mut out = String::new();

    out.push_str(&format!("# RFC: {}\n\n", state.project.name));

    out.push_str("## Problem\n\n");
    if let Some(problem) = &rfc.problem {
        out.push_str(problem.trim());
        out.push('\n');
    } else {
        out.push_str("_Not yet drafted._\n");
    }

    if !rfc.goals.is_empty() {
        out.push_str("\n## Goals\n\n");
        for goal in &rfc.goals {
            out.push_str(&format!("- {}\n", goal));
        }
    }

    if !rfc.non_goals.is_empty() {
        out.push_str("\n## Non-Goals\n\n");
        for non_goal in &rfc.non_goals {
            out.push_str(&format!("- {}\n", non_goal));
        }
    }

    if let Some(approach) = &rfc.approach {
        out.push_str("\n## Approach\n\n");
        out.push_str(approach.trim());
        out.push('\n');
    }

    if !rfc.open_questions.is_empty() {
        out.push_str("\n## Open Questions\n\n");
        for question in &rfc.open_questions {
            out.push_str(&format!("- {}\n", question));
        }
    }

    out
}

fn render_plan(state: &ProjectState) -> String {
    let plan = &state.document_progress.plan;
    let mut out = String::new();

    out.push_str(&format!("# Implementation Plan: {}\n\n", state.project.name));
    out.push_str("## Stages\n\n");

    if plan.stages.is_empty() {
        out.push_str("_No stages defined yet._\n");
    }

    for (i, stage) in plan.stages.iter().enumerate() {
        out.push_str(&format!("### Stage {}: {}\n\n", i + 1, stage.name));
        if let Some(description) = &stage.description {
            out.push_str(description.trim());
            out.push_str("\n\n");
        }
        for task in &stage.tasks {
            out.push_str(&format!("- [ ] {}\n", task));
        }
        if !stage.tasks.is_empty() {
            out.push('\n');
        }
    }

    let has_deps = plan.stages.iter().any(|s| !s.depends_on.is_empty());
    if has_deps {
        out.push_str("## Dependencies\n\n");
        for stage in &plan.stages {
            if !stage.depends_on.is_empty() {
                out.push_str(&format!(
                    "- {} depends on: {}\n",
                    stage.name,
                    stage.depends_on.join(", ")
                ));
            }
        }
    }

    out
}

fn render_rollout(state: &ProjectState) -> String {
    let rollout = &state.document_progress.rollout;
    let mut out = String::new();

    out.push_str(&format!("# Rollout Strategy: {}\n\n", state.project.name));

    out.push_str("## Risks\n\n");
    if rollout.risks.is_empty() {
        out.push_str("_No risks recorded yet._\n");
    }
    for risk in &rollout.risks {
        match &risk.mitigation {
            Some(mitigation) => out.push_str(&format!(
                "- **{}** — mitigation: {}\n",
                risk.description, mitigation
            )),
            None => out.push_str(&format!("- **{}**\n", risk.description)),
        }
    }

    out.push_str("\n## Milestones\n\n");
    if rollout.milestones.is_empty() {
        out.push_str("_No milestones defined yet._\n");
    }
    for milestone in &rollout.milestones {
        match &milestone.stage {
            Some(stage) => out.push_str(&format!("### {} ({})\n\n", milestone.name, stage)),
            None => out.push_str(&format!("### {}\n\n", milestone.name)),
        }
        for criterion in &milestone.criteria {
            out.push_str(&format!("- {}\n", criterion));
        }
        if !milestone.criteria.is_empty() {
            out.push('\n');
        }
    }

    if let Some(rollback) = &rollout.rollback {
        out.push_str("## Rollback\n\n");
        out.push_str(rollback.trim());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Milestone, ProjectMetadata, Risk, Stage};
    use chrono::Utc;

    fn populated_state() -> ProjectState {
        let mut state = ProjectState::new(ProjectMetadata {
            name: "checkout-revamp".to_string(),
            stack: vec!["rust".to_string()],
            constraints: vec![],
            created_at: Utc::now(),
        });
        let progress = &mut state.document_progress;
        progress.rfc.problem = Some("Checkout p99 exceeds 2s under peak load.".to_string());
        progress.rfc.goals = vec!["p99 under 400ms".to_string()];
        progress.rfc.approach = Some("Split payment capture into an async worker.".to_string());
        progress.plan.stages = vec![Stage {
            name: "Extract worker".to_string(),
            description: Some("Move capture out of the request path.".to_string()),
            tasks: vec!["Define queue contract".to_string()],
            depends_on: vec![],
        }];
        progress.rollout.risks = vec![Risk {
            description: "Double capture".to_string(),
            mitigation: Some("Idempotency keys".to_string()),
        }];
        progress.rollout.milestones = vec![Milestone {
            name: "Shadow mode".to_string(),
            stage: Some("Extract worker".to_string()),
            criteria: vec!["Zero capture diffs for a week".to_string()],
        }];
        state
    }

    #[test]
    fn test_render_is_deterministic() {
        let state = populated_state();
        assert_eq!(
            render(DocumentType::Rfc, &state),
            render(DocumentType::Rfc, &state)
        );
    }

    #[test]
    fn test_rendered_rfc_passes_validation() {
        let state = populated_state();
        let text = render(DocumentType::Rfc, &state);
        let result = crate::validator::validate(DocumentType::Rfc, &text);
        assert!(result.valid, "missing: {:?}", result.missing_sections);
    }

    #[test]
    fn test_rendered_plan_and_rollout_pass_validation() {
        let state = populated_state();
        for doc in [DocumentType::Plan, DocumentType::Rollout] {
            let text = render(doc, &state);
            let result = crate::validator::validate(doc, &text);
            assert!(result.valid, "{}: missing {:?}", doc, result.missing_sections);
        }
    }

    #[test]
    fn test_empty_rfc_renders_placeholder_without_goals_heading() {
        let state = ProjectState::new(ProjectMetadata {
            name: "empty".to_string(),
            stack: vec![],
            constraints: vec![],
            created_at: Utc::now(),
        });
        let text = render(DocumentType::Rfc, &state);
        assert!(text.contains("_Not yet drafted._"));
        // Empty goal list renders no Goals heading, so validation flags it
        let result = crate::validator::validate(DocumentType::Rfc, &text);
        assert!(result.missing_sections.contains(&"Goals".to_string()));
    }
}

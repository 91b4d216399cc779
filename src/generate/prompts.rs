//! Per-step prompt construction and output folding
//!
//! Every generating step owns a prompt, a JSON schema the provider
//! output must satisfy, and a fold that merges the validated output
//! into the accumulated document progress. Review and sentinel steps
//! generate nothing.

use crate::error::WorkflowError;
use crate::models::{Milestone, ProjectState, Risk, Stage, StagePrompt};
use crate::state::ProjectStore;
use crate::steps::{self, StepId};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{GenerationRequest, Message};

const SYSTEM_PROMPT: &str = "You are a senior engineer drafting planning documents. \
Respond with a single JSON object matching the requested schema. \
No prose outside the JSON.";

/// Build the generation request for a step, or None when the step
/// produces no content (review checkpoints, phase sentinels).
pub fn request_for_step(state: &ProjectState, step: StepId) -> Option<GenerationRequest> {
    let schema = schema_for_step(step)?;
    let prompt = format!("{}\n\n{}", project_context(state, step), instruction_for_step(step));

    // Temperature and token limits are left unset: the CLI-backed
    // providers have no flags to forward them to.
    Some(GenerationRequest {
        messages: vec![Message::user(prompt)],
        system_prompt: Some(SYSTEM_PROMPT.to_string()),
        json_schema: Some(schema),
        ..Default::default()
    })
}

/// Shared context block: metadata, prior progress, checkpoint feedback
/// for the step's phase (all entries, oldest first).
fn project_context(state: &ProjectState, step: StepId) -> String {
    let mut out = String::new();
    out.push_str(&format!("Project: {}\n", state.project.name));
    if !state.project.stack.is_empty() {
        out.push_str(&format!("Stack: {}\n", state.project.stack.join(", ")));
    }
    if !state.project.constraints.is_empty() {
        out.push_str("Constraints:\n");
        for constraint in &state.project.constraints {
            out.push_str(&format!("- {}\n", constraint));
        }
    }

    let progress_json = serde_json::to_string_pretty(&state.document_progress)
        .unwrap_or_else(|_| "{}".to_string());
    out.push_str(&format!("\nProgress so far:\n{}\n", progress_json));

    let feedback = ProjectStore::feedback_for_phase(state, steps::phase(step));
    if !feedback.is_empty() {
        out.push_str("\nOperator feedback for this phase:\n");
        for response in feedback {
            if let Some(d) = &response.disagreements {
                out.push_str(&format!("- Disagreement: {}\n", d));
            }
            if let Some(c) = &response.clarifications {
                out.push_str(&format!("- Clarification: {}\n", c));
            }
            if let Some(m) = &response.missed_constraints {
                out.push_str(&format!("- Missed constraint: {}\n", m));
            }
        }
    }

    out
}

fn instruction_for_step(step: StepId) -> &'static str {
    match step {
        StepId::RfcProblem => {
            "Write the problem statement for this project's RFC. \
             Return {\"problem\": \"...\"} with two or three concise paragraphs."
        }
        StepId::RfcGoals => {
            "List the goals and non-goals for this RFC. \
             Return {\"goals\": [...], \"non_goals\": [...]} with short declarative bullets."
        }
        StepId::RfcApproach => {
            "Propose the technical approach and list open questions. \
             Return {\"approach\": \"...\", \"open_questions\": [...]}."
        }
        StepId::PlanStages => {
            "Break the approved approach into sequential implementation stages. \
             Return {\"stages\": [{\"name\", \"description\", \"tasks\": [...]}]}."
        }
        StepId::PlanDependencies => {
            "Map dependencies between the plan stages. \
             Return {\"dependencies\": [{\"stage\": \"...\", \"depends_on\": [...]}]} \
             using exact stage names from the progress."
        }
        StepId::RolloutRisks => {
            "Assess rollout risks with mitigations. \
             Return {\"risks\": [{\"description\", \"mitigation\"}]}."
        }
        StepId::RolloutMilestones => {
            "Define rollout milestones tied to plan stages, plus a rollback plan. \
             Return {\"milestones\": [{\"name\", \"stage\", \"criteria\": [...]}], \"rollback\": \"...\"}."
        }
        StepId::PromptsGenerate => {
            "Write one self-contained implementation prompt per plan stage. \
             Return {\"stage_prompts\": [{\"stage\": \"...\", \"prompt\": \"...\"}]}."
        }
        _ => "",
    }
}

/// JSON schema the provider output must satisfy for a step
pub fn schema_for_step(step: StepId) -> Option<Value> {
    let schema = match step {
        StepId::RfcProblem => json!({
            "type": "object",
            "properties": {"problem": {"type": "string", "minLength": 1}},
            "required": ["problem"]
        }),
        StepId::RfcGoals => json!({
            "type": "object",
            "properties": {
                "goals": {"type": "array", "items": {"type": "string"}, "minItems": 1},
                "non_goals": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["goals"]
        }),
        StepId::RfcApproach => json!({
            "type": "object",
            "properties": {
                "approach": {"type": "string", "minLength": 1},
                "open_questions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["approach"]
        }),
        StepId::PlanStages => json!({
            "type": "object",
            "properties": {
                "stages": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "description": {"type": "string"},
                            "tasks": {"type": "array", "items": {"type": "string"}}
                        },
                        "required": ["name"]
                    }
                }
            },
            "required": ["stages"]
        }),
        StepId::PlanDependencies => json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "stage": {"type": "string"},
                            "depends_on": {"type": "array", "items": {"type": "string"}}
                        },
                        "required": ["stage", "depends_on"]
                    }
                }
            },
            "required": ["dependencies"]
        }),
        StepId::RolloutRisks => json!({
            "type": "object",
            "properties": {
                "risks": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "description": {"type": "string"},
                            "mitigation": {"type": "string"}
                        },
                        "required": ["description"]
                    }
                }
            },
            "required": ["risks"]
        }),
        StepId::RolloutMilestones => json!({
            "type": "object",
            "properties": {
                "milestones": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "stage": {"type": "string"},
                            "criteria": {"type": "array", "items": {"type": "string"}}
                        },
                        "required": ["name"]
                    }
                },
                "rollback": {"type": "string"}
            },
            "required": ["milestones"]
        }),
        StepId::PromptsGenerate => json!({
            "type": "object",
            "properties": {
                "stage_prompts": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "stage": {"type": "string"},
                            "prompt": {"type": "string"}
                        },
                        "required": ["stage", "prompt"]
                    }
                }
            },
            "required": ["stage_prompts"]
        }),
        _ => return None,
    };
    Some(schema)
}

#[derive(Debug, Deserialize)]
struct DependencyEntry {
    stage: String,
    depends_on: Vec<String>,
}

/// Fold schema-validated provider output into the state's progress.
/// Mutates only the fields the step owns.
pub fn fold_step_output(
    state: &mut ProjectState,
    step: StepId,
    output: &Value,
) -> Result<(), WorkflowError> {
    let provider_failed = |message: String| WorkflowError::ProviderFailed {
        provider: "generation".to_string(),
        message,
    };
    let progress = &mut state.document_progress;

    match step {
        StepId::RfcProblem => {
            progress.rfc.problem = output
                .get("problem")
                .and_then(Value::as_str)
                .map(|s| s.to_string());
        }
        StepId::RfcGoals => {
            progress.rfc.goals = string_array(output, "goals");
            progress.rfc.non_goals = string_array(output, "non_goals");
        }
        StepId::RfcApproach => {
            progress.rfc.approach = output
                .get("approach")
                .and_then(Value::as_str)
                .map(|s| s.to_string());
            progress.rfc.open_questions = string_array(output, "open_questions");
        }
        StepId::PlanStages => {
            let stages: Vec<Stage> = serde_json::from_value(
                output.get("stages").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| provider_failed(format!("malformed stages: {}", e)))?;
            progress.plan.stages = stages;
        }
        StepId::PlanDependencies => {
            let entries: Vec<DependencyEntry> = serde_json::from_value(
                output.get("dependencies").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| provider_failed(format!("malformed dependencies: {}", e)))?;
            for entry in entries {
                if let Some(stage) = progress
                    .plan
                    .stages
                    .iter_mut()
                    .find(|s| s.name == entry.stage)
                {
                    stage.depends_on = entry.depends_on;
                }
            }
        }
        StepId::RolloutRisks => {
            let risks: Vec<Risk> =
                serde_json::from_value(output.get("risks").cloned().unwrap_or(Value::Null))
                    .map_err(|e| provider_failed(format!("malformed risks: {}", e)))?;
            progress.rollout.risks = risks;
        }
        StepId::RolloutMilestones => {
            let milestones: Vec<Milestone> = serde_json::from_value(
                output.get("milestones").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| provider_failed(format!("malformed milestones: {}", e)))?;
            progress.rollout.milestones = milestones;
            progress.rollout.rollback = output
                .get("rollback")
                .and_then(Value::as_str)
                .map(|s| s.to_string());
        }
        StepId::PromptsGenerate => {
            let prompts: Vec<StagePrompt> = serde_json::from_value(
                output.get("stage_prompts").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| provider_failed(format!("malformed stage_prompts: {}", e)))?;
            progress.prompts.stage_prompts = prompts;
        }
        _ => {}
    }

    Ok(())
}

fn string_array(output: &Value, key: &str) -> Vec<String> {
    output
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectMetadata;
    use chrono::Utc;

    fn base_state() -> ProjectState {
        ProjectState::new(ProjectMetadata {
            name: "checkout-revamp".to_string(),
            stack: vec!["rust".to_string()],
            constraints: vec!["no downtime".to_string()],
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_review_and_sentinel_steps_have_no_request() {
        let state = base_state();
        for step in [StepId::RfcReview, StepId::RfcComplete, StepId::PromptsComplete] {
            assert!(request_for_step(&state, step).is_none());
        }
    }

    #[test]
    fn test_generating_steps_carry_schema_and_context() {
        let state = base_state();
        let request = request_for_step(&state, StepId::RfcProblem).unwrap();
        assert!(request.json_schema.is_some());
        assert!(request.messages[0].content.contains("checkout-revamp"));
        assert!(request.messages[0].content.contains("no downtime"));
        // No generation knobs the providers cannot forward
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn test_prompt_includes_phase_feedback() {
        let mut state = base_state();
        state.checkpoint_responses.push(crate::models::CheckpointResponse {
            step_id: StepId::RfcReview,
            disagreements: Some("Caching is missing".to_string()),
            clarifications: None,
            missed_constraints: None,
            responded_at: Utc::now(),
        });
        let request = request_for_step(&state, StepId::RfcApproach).unwrap();
        assert!(request.messages[0].content.contains("Caching is missing"));
    }

    #[test]
    fn test_fold_problem_output() {
        let mut state = base_state();
        fold_step_output(&mut state, StepId::RfcProblem, &json!({"problem": "Checkout is slow"}))
            .unwrap();
        assert_eq!(
            state.document_progress.rfc.problem.as_deref(),
            Some("Checkout is slow")
        );
    }

    #[test]
    fn test_fold_stages_and_dependencies() {
        let mut state = base_state();
        fold_step_output(
            &mut state,
            StepId::PlanStages,
            &json!({"stages": [
                {"name": "Stage 1", "tasks": ["a"]},
                {"name": "Stage 2", "tasks": ["b"]}
            ]}),
        )
        .unwrap();
        assert_eq!(state.document_progress.plan.stages.len(), 2);

        fold_step_output(
            &mut state,
            StepId::PlanDependencies,
            &json!({"dependencies": [{"stage": "Stage 2", "depends_on": ["Stage 1"]}]}),
        )
        .unwrap();
        assert_eq!(
            state.document_progress.plan.stages[1].depends_on,
            vec!["Stage 1".to_string()]
        );
    }

    #[test]
    fn test_fold_rejects_malformed_payload() {
        let mut state = base_state();
        let err = fold_step_output(
            &mut state,
            StepId::RolloutRisks,
            &json!({"risks": "not an array"}),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::ProviderFailed { .. }));
    }

    #[test]
    fn test_every_schema_accepts_its_example_output() {
        let cases = [
            (StepId::RfcProblem, json!({"problem": "p"})),
            (StepId::RfcGoals, json!({"goals": ["g"], "non_goals": []})),
            (StepId::RfcApproach, json!({"approach": "a", "open_questions": ["q"]})),
            (StepId::PlanStages, json!({"stages": [{"name": "S", "tasks": ["t"]}]})),
            (StepId::PlanDependencies, json!({"dependencies": [{"stage": "S", "depends_on": []}]})),
            (StepId::RolloutRisks, json!({"risks": [{"description": "d"}]})),
            (StepId::RolloutMilestones, json!({"milestones": [{"name": "M"}], "rollback": "r"})),
            (StepId::PromptsGenerate, json!({"stage_prompts": [{"stage": "S", "prompt": "p"}]})),
        ];
        for (step, instance) in cases {
            let schema = schema_for_step(step).unwrap();
            let violations = super::super::schema_violations(&schema, &instance);
            assert!(violations.is_empty(), "{:?}: {:?}", step, violations);
        }
    }
}

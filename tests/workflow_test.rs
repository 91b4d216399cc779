//! End-to-end workflow: initialize, advance through phases, validate,
//! and gate approval behind strict mode.

use chrono::Utc;
use planforge::models::{DocumentType, ProjectMetadata};
use planforge::state::ProjectStore;
use planforge::steps::{self, Phase, StepId};
use planforge::{render, validator, WorkflowError};
use tempfile::TempDir;

fn init_project(store: &ProjectStore) {
    store
        .initialize(ProjectMetadata {
            name: "P".to_string(),
            stack: vec!["TS".to_string()],
            constraints: vec![],
            created_at: Utc::now(),
        })
        .unwrap();
}

#[test]
fn full_rfc_phase_walkthrough() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());
    init_project(&store);

    // Fresh project sits on the first RFC step
    let state = store.load().unwrap();
    assert_eq!(state.current_step, StepId::RfcProblem);
    assert_eq!(steps::phase(state.current_step), Phase::Rfc);
    assert!(!steps::is_phase_complete(state.current_step, Phase::Rfc));

    // Advance through all RFC steps; simulate generation by writing
    // progress directly between advances
    let mut state = store.load().unwrap();
    state.document_progress.rfc.problem = Some("Build times exceed 30 minutes.".to_string());
    state.document_progress.rfc.approach = Some("Incremental compilation cache.".to_string());
    store.save(&state).unwrap();

    while steps::phase(store.load().unwrap().current_step) == Phase::Rfc {
        store.advance().unwrap();
    }

    let state = store.load().unwrap();
    assert_eq!(state.current_step, StepId::PlanStages);
    assert!(steps::is_phase_complete(state.current_step, Phase::Rfc));
    assert!(!steps::is_phase_complete(state.current_step, Phase::Plan));
}

#[test]
fn rfc_missing_goals_fails_validation_and_strict_approval() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());
    init_project(&store);

    // Problem and approach present, goals left empty: the rendered RFC
    // has no Goals heading
    let mut state = store.load().unwrap();
    state.document_progress.rfc.problem = Some("Slow builds.".to_string());
    state.document_progress.rfc.approach = Some("Cache.".to_string());
    state.strict_mode = true;
    store.save(&state).unwrap();

    let state = store.load().unwrap();
    let text = render::render(DocumentType::Rfc, &state);
    let validation = validator::validate(DocumentType::Rfc, &text);
    assert!(!validation.valid);
    assert!(validation.missing_sections.contains(&"Goals".to_string()));

    // Strict mode blocks approval without force
    let err = validator::strict_mode_check(&state, DocumentType::Rfc, &text).unwrap_err();
    assert!(matches!(err, WorkflowError::StrictModeBlocked { .. }));

    // Forcing records the approval despite valid = false
    let state = store.record_approval(DocumentType::Rfc, &text).unwrap();
    assert!(ProjectStore::is_document_approved(&state, DocumentType::Rfc));
    assert!(!ProjectStore::has_document_changed(
        &state,
        DocumentType::Rfc,
        &text
    ));
}

#[test]
fn approval_drift_and_all_approved_lifecycle() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());
    init_project(&store);

    let state = store.load().unwrap();
    assert!(!ProjectStore::are_all_documents_approved(&state));

    for doc in DocumentType::ALL {
        let text = render::render(doc, &store.load().unwrap());
        store.record_approval(doc, &text).unwrap();
    }
    let state = store.load().unwrap();
    assert!(ProjectStore::are_all_documents_approved(&state));

    // Editing the plan content causes drift for the plan only
    let mut state = store.load().unwrap();
    state.document_progress.plan.stages.push(planforge::models::Stage {
        name: "Stage 1".to_string(),
        description: None,
        tasks: vec!["task".to_string()],
        depends_on: vec![],
    });
    store.save(&state).unwrap();

    let state = store.load().unwrap();
    let plan_text = render::render(DocumentType::Plan, &state);
    let rfc_text = render::render(DocumentType::Rfc, &state);
    assert!(ProjectStore::has_document_changed(
        &state,
        DocumentType::Plan,
        &plan_text
    ));
    assert!(!ProjectStore::has_document_changed(
        &state,
        DocumentType::Rfc,
        &rfc_text
    ));

    // Still approved: drift does not expire the ledger entry
    assert!(ProjectStore::are_all_documents_approved(&state));
}

#[test]
fn state_survives_reload_across_store_instances() {
    let temp = TempDir::new().unwrap();

    {
        let store = ProjectStore::new(temp.path());
        init_project(&store);
        store
            .record_checkpoint_response(
                StepId::RfcReview,
                Some("disagreement".to_string()),
                None,
                Some("missed a constraint".to_string()),
            )
            .unwrap();
        store.advance().unwrap();
    }

    // A brand-new store handle sees the same record
    let store = ProjectStore::new(temp.path());
    let state = store.load().unwrap();
    assert_eq!(state.current_step, StepId::RfcGoals);
    assert_eq!(state.checkpoint_responses.len(), 1);
    assert_eq!(
        state.checkpoint_responses[0].missed_constraints.as_deref(),
        Some("missed a constraint")
    );
}

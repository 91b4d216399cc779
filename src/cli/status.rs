//! `planforge status` - show pipeline position and approval health

use crate::models::DocumentType;
use crate::render;
use crate::state::ProjectStore;
use crate::steps::{self, Phase, PHASE_ORDER};
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let store = ProjectStore::new(root);
    let state = store.load()?;
    let step = state.current_step;

    if json {
        let approvals: Vec<_> = DocumentType::ALL
            .iter()
            .map(|doc| {
                let text = render::render(*doc, &state);
                serde_json::json!({
                    "document": doc.name(),
                    "approved": ProjectStore::is_document_approved(&state, *doc),
                    "changed_since_approval": ProjectStore::has_document_changed(&state, *doc, &text),
                })
            })
            .collect();

        let payload = serde_json::json!({
            "project": state.project.name,
            "current_step": step,
            "phase": steps::phase(step).name(),
            "progress_percentage": steps::progress_percentage(step),
            "remaining_steps": steps::remaining_steps(step),
            "strict_mode": state.strict_mode,
            "all_approved": ProjectStore::are_all_documents_approved(&state),
            "documents": approvals,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", format!("Project: {}", state.project.name).cyan().bold());
    println!();
    println!(
        "   Step:     {} ({})",
        steps::label(step),
        steps::phase(step).name()
    );
    println!(
        "   Progress: {}% — {} steps remaining",
        steps::progress_percentage(step),
        steps::remaining_steps(step)
    );
    println!(
        "   Strict:   {}",
        if state.strict_mode { "on".yellow() } else { "off".bright_black() }
    );
    println!();

    println!("   Phases:");
    for phase in PHASE_ORDER {
        let marker = if steps::is_phase_complete(step, *phase) {
            "✅".to_string()
        } else if steps::phase(step) == *phase {
            "▶".to_string()
        } else {
            "·".to_string()
        };
        println!("     {} {}", marker, phase.name());
    }
    println!();

    println!("   Documents:");
    for doc in DocumentType::ALL {
        let line = if ProjectStore::is_document_approved(&state, doc) {
            let text = render::render(doc, &state);
            if ProjectStore::has_document_changed(&state, doc, &text) {
                format!("⚠ {} approved, but changed since", doc).yellow()
            } else {
                format!("✅ {} approved", doc).green()
            }
        } else {
            format!("· {} not approved", doc).bright_black()
        };
        println!("     {}", line);
    }

    if !state.checkpoint_responses.is_empty() {
        println!();
        println!(
            "   Checkpoint feedback: {} entries across {}",
            state.checkpoint_responses.len(),
            summarize_feedback_phases(&state.checkpoint_responses)
        );
    }

    Ok(())
}

fn summarize_feedback_phases(responses: &[crate::CheckpointResponse]) -> String {
    let phases: Vec<&str> = PHASE_ORDER
        .iter()
        .filter(|p| has_feedback_for(responses, **p))
        .map(|p| p.name())
        .collect();
    match phases.len() {
        0 => "no phases".to_string(),
        1 => format!("1 phase ({})", phases[0]),
        n => format!("{} phases ({})", n, phases.join(", ")),
    }
}

fn has_feedback_for(responses: &[crate::CheckpointResponse], phase: Phase) -> bool {
    responses.iter().any(|r| steps::phase(r.step_id) == phase)
}

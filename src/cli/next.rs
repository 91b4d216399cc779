//! `planforge next` - run the current step and advance
//!
//! Generation steps call the configured provider and fold its validated
//! output into the document progress. Checkpoint steps collect operator
//! feedback instead (skippable with --skip-checkpoint). Sentinel steps
//! just move the pipeline forward.

use crate::config::PlanforgeConfig;
use crate::generate::{self, prompts};
use crate::state::ProjectStore;
use crate::steps;
use crate::{Result, WorkflowError};
use colored::Colorize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub async fn run(root: &Path, skip_checkpoint: bool) -> Result<()> {
    let store = ProjectStore::new(root);
    let state = store.load()?;
    let step = state.current_step;

    if steps::next_step(step).is_none() {
        println!("{}", "✅ Pipeline already complete.".green());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "▶ {} ({}, {}%)",
            steps::label(step),
            steps::phase(step).name(),
            steps::progress_percentage(step)
        )
        .cyan()
    );

    if steps::is_checkpoint(step) {
        if skip_checkpoint {
            println!("{}", "   (checkpoint skipped)".bright_black());
        } else {
            collect_checkpoint_feedback(&store, step)?;
        }
    } else if let Some(request) = prompts::request_for_step(&state, step) {
        let config = PlanforgeConfig::load(root)?;
        let provider = generate::provider_for(&config.provider)?;

        if !provider.is_configured() {
            return Err(WorkflowError::ProviderUnavailable {
                provider: provider.name().to_string(),
                instructions: provider.config_instructions(),
            }
            .into());
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Generating with {}...", provider.name()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let response = provider.generate(request).await;
        spinner.finish_and_clear();
        let response = response?;

        let parsed = response.parsed.ok_or_else(|| WorkflowError::ProviderFailed {
            provider: provider.name().to_string(),
            message: "no structured output returned".to_string(),
        })?;

        // Re-load before mutating: the provider call is the long pole,
        // keep the read-modify-write window tight.
        let mut state = store.load()?;
        prompts::fold_step_output(&mut state, step, &parsed)?;
        store.save(&state)?;

        if let Some(usage) = response.usage {
            println!(
                "{}",
                format!(
                    "   tokens: {} in / {} out",
                    usage.input_tokens, usage.output_tokens
                )
                .bright_black()
            );
        }
    }

    let state = store.advance()?;
    match steps::next_step(state.current_step) {
        Some(_) => println!(
            "{}",
            format!(
                "   → next: {} ({} steps remaining)",
                steps::label(state.current_step),
                steps::remaining_steps(state.current_step) + 1
            )
            .green()
        ),
        None => println!("{}", "🏁 Pipeline complete. Run 'planforge approve --all'.".green()),
    }

    Ok(())
}

/// Prompt the operator for checkpoint feedback and append it to the
/// history. Empty answers are stored as absent fields, not empty strings.
fn collect_checkpoint_feedback(store: &ProjectStore, step: crate::StepId) -> Result<()> {
    println!("{}", "📋 Checkpoint: review the draft, then answer (empty to skip)".yellow());

    let disagreements = optional_answer("Anything you disagree with?");
    let clarifications = optional_answer("Anything that needs clarifying?");
    let missed_constraints = optional_answer("Any constraints the draft missed?");

    store.record_checkpoint_response(step, disagreements, clarifications, missed_constraints)?;
    println!("{}", "   ✓ feedback recorded".green());
    Ok(())
}

fn optional_answer(prompt: &str) -> Option<String> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

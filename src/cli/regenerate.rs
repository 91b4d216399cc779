//! `planforge regenerate` - rebuild per-stage implementation prompts
//!
//! Re-runs the prompts.generate step against the current plan without
//! moving the pipeline. Useful after the plan changed post-approval.

use crate::config::PlanforgeConfig;
use crate::generate::{self, prompts};
use crate::state::ProjectStore;
use crate::steps::StepId;
use crate::{Result, WorkflowError};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub async fn run(root: &Path) -> Result<()> {
    let store = ProjectStore::new(root);
    let state = store.load()?;

    if state.document_progress.plan.stages.is_empty() {
        anyhow::bail!("No plan stages to generate prompts for. Advance through the plan phase first.");
    }

    let config = PlanforgeConfig::load(root)?;
    let provider = generate::provider_for(&config.provider)?;
    if !provider.is_configured() {
        return Err(WorkflowError::ProviderUnavailable {
            provider: provider.name().to_string(),
            instructions: provider.config_instructions(),
        }
        .into());
    }

    let request = prompts::request_for_step(&state, StepId::PromptsGenerate)
        .unwrap_or_else(|| unreachable!("prompts.generate is a generating step"));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Regenerating prompts for {} stages...",
        state.document_progress.plan.stages.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let response = provider.generate(request).await;
    spinner.finish_and_clear();
    let response = response?;

    let parsed = response.parsed.ok_or_else(|| WorkflowError::ProviderFailed {
        provider: provider.name().to_string(),
        message: "no structured output returned".to_string(),
    })?;

    let mut state = store.load()?;
    prompts::fold_step_output(&mut state, StepId::PromptsGenerate, &parsed)?;
    store.save(&state)?;

    println!(
        "{}",
        format!(
            "✅ regenerated {} stage prompts",
            state.document_progress.prompts.stage_prompts.len()
        )
        .green()
    );

    Ok(())
}

//! `planforge init` - create a new project at the given root

use crate::config::PlanforgeConfig;
use crate::models::ProjectMetadata;
use crate::state::ProjectStore;
use crate::{Result, StepId};
use chrono::Utc;
use colored::Colorize;
use dialoguer::Input;
use std::path::Path;

pub fn run(
    root: &Path,
    name: Option<&str>,
    stack: Vec<String>,
    constraints: Vec<String>,
    strict: bool,
) -> Result<()> {
    let store = ProjectStore::new(root);

    let name = match name {
        Some(n) => n.to_string(),
        None => prompt_for_name(root),
    };

    println!("{}", format!("🔨 Initializing project '{}'...", name).cyan());

    let mut state = store.initialize(ProjectMetadata {
        name: name.clone(),
        stack,
        constraints,
        created_at: Utc::now(),
    })?;

    if strict {
        state.strict_mode = true;
        store.save(&state)?;
    }

    let config = PlanforgeConfig {
        strict_mode: strict,
        ..PlanforgeConfig::load(root)?
    };
    config.save(root)?;

    println!("   ✓ .planforge/state.json");
    println!("   ✓ .planforge/config.toml");
    println!();
    println!(
        "{}",
        format!(
            "Ready. First step: {} — run 'planforge next'",
            crate::steps::label(StepId::RfcProblem)
        )
        .green()
    );

    Ok(())
}

/// Ask for a project name, defaulting to the directory name. Falls back
/// to the default silently when no terminal is available.
fn prompt_for_name(root: &Path) -> String {
    let default = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string());

    Input::new()
        .with_prompt("Project name")
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
}

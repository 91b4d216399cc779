//! Project-level configuration
//!
//! Lives next to the state record at `.planforge/config.toml`. Holds
//! operator preferences, not pipeline state: which generation provider
//! to drive and whether new approvals default to strict mode.

use crate::error::WorkflowError;
use crate::state::store::STORE_DIR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanforgeConfig {
    /// Generation provider name: "claude" or "gemini"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Enable strict-mode approval gating for new projects
    #[serde(default)]
    pub strict_mode: bool,
}

fn default_provider() -> String {
    "claude".to_string()
}

impl Default for PlanforgeConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            strict_mode: false,
        }
    }
}

impl PlanforgeConfig {
    fn path(root: &Path) -> PathBuf {
        root.join(STORE_DIR).join(CONFIG_FILE)
    }

    /// Load config from the project root, defaults when absent
    pub fn load(root: &Path) -> Result<Self, WorkflowError> {
        let path = Self::path(root);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("warning: ignoring malformed config at {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Persist config under the project root
    pub fn save(&self, root: &Path) -> Result<(), WorkflowError> {
        let path = Self::path(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            WorkflowError::Io(std::io::Error::other(e))
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

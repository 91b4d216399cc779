//! Claude CLI provider
//!
//! Drives the `claude` binary in non-interactive print mode with JSON
//! output, the prompt passed on stdin.

use super::{
    binary_on_path, finish_response, GenerationProvider, GenerationRequest, GenerationResponse,
    TokenUsage,
};
use crate::error::WorkflowError;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const BINARY: &str = "claude";

/// Top-level result envelope from `claude --print --output-format json`
#[derive(Debug, Deserialize)]
struct ClaudeResult {
    result: Option<String>,
    #[serde(default)]
    usage: Option<ClaudeUsage>,
    #[serde(default)]
    is_error: bool,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

pub struct ClaudeProvider {
    binary: String,
}

impl ClaudeProvider {
    pub fn new() -> Self {
        Self { binary: BINARY.to_string() }
    }
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn is_configured(&self) -> bool {
        binary_on_path(&self.binary)
    }

    fn config_instructions(&self) -> String {
        [
            "The Claude CLI was not found on PATH.",
            "",
            "  1. Install it: npm install -g @anthropic-ai/claude-code",
            "  2. Authenticate: run `claude` once and follow the login flow",
            "  3. Re-run this command",
        ]
        .join("\n")
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, WorkflowError> {
        if !self.is_configured() {
            return Err(WorkflowError::ProviderUnavailable {
                provider: self.name().to_string(),
                instructions: self.config_instructions(),
            });
        }

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--print").arg("--output-format").arg("json");
        if let Some(system) = &request.system_prompt {
            cmd.arg("--append-system-prompt").arg(system);
        }
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(WorkflowError::ProviderFailed {
                provider: self.name().to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let envelope: ClaudeResult = serde_json::from_str(stdout.trim()).map_err(|e| {
            WorkflowError::ProviderFailed {
                provider: self.name().to_string(),
                message: format!("unexpected output format: {}", e),
            }
        })?;

        if envelope.is_error {
            return Err(WorkflowError::ProviderFailed {
                provider: self.name().to_string(),
                message: envelope.result.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let content = envelope.result.unwrap_or_default();
        let usage = envelope.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });

        finish_response(self.name(), &request, content, usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_envelope_parsing() {
        let raw = r###"{"result": "## Problem\n\nSlow checkout", "usage": {"input_tokens": 120, "output_tokens": 45}, "is_error": false}"###;
        let parsed: ClaudeResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.as_deref(), Some("## Problem\n\nSlow checkout"));
        assert_eq!(parsed.usage.unwrap().input_tokens, 120);
        assert!(!parsed.is_error);
    }

    #[test]
    fn test_config_instructions_mention_install() {
        let provider = ClaudeProvider::new();
        assert!(provider.config_instructions().contains("npm install"));
    }
}

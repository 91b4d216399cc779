//! Gemini CLI provider

use super::{
    binary_on_path, finish_response, GenerationProvider, GenerationRequest, GenerationResponse,
    TokenUsage,
};
use crate::error::WorkflowError;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

const BINARY: &str = "gemini";

#[derive(Debug, Deserialize)]
struct GeminiResult {
    response: Option<String>,
    #[serde(default)]
    stats: Option<GeminiStats>,
}

#[derive(Debug, Deserialize)]
struct GeminiStats {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

pub struct GeminiProvider {
    binary: String,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self { binary: BINARY.to_string() }
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        binary_on_path(&self.binary)
    }

    fn config_instructions(&self) -> String {
        [
            "The Gemini CLI was not found on PATH.",
            "",
            "  1. Install it: npm install -g @google/gemini-cli",
            "  2. Authenticate: run `gemini` once and follow the login flow",
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

        // Gemini takes the whole prompt as one argument; fold the system
        // prompt in front since there is no separate flag for it.
        let mut prompt = String::new();
        if let Some(system) = &request.system_prompt {
            prompt.push_str(system);
            prompt.push_str("\n\n");
        }
        for message in &request.messages {
            prompt.push_str(&message.content);
            prompt.push_str("\n\n");
        }

        let output = Command::new(&self.binary)
            .arg("--prompt")
            .arg(prompt.trim_end())
            .arg("--output-format")
            .arg("json")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(WorkflowError::ProviderFailed {
                provider: self.name().to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let envelope: GeminiResult = serde_json::from_str(stdout.trim()).map_err(|e| {
            WorkflowError::ProviderFailed {
                provider: self.name().to_string(),
                message: format!("unexpected output format: {}", e),
            }
        })?;

        let content = envelope.response.unwrap_or_default();
        let usage = envelope.stats.map(|s| TokenUsage {
            input_tokens: s.input_tokens,
            output_tokens: s.output_tokens,
        });

        finish_response(self.name(), &request, content, usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_envelope_parsing() {
        let raw = r#"{"response": "{\"risks\": []}", "stats": {"input_tokens": 10, "output_tokens": 5}}"#;
        let parsed: GeminiResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.response.as_deref(), Some("{\"risks\": []}"));
        assert_eq!(parsed.stats.unwrap().output_tokens, 5);
    }
}

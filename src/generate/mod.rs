//! Generation collaborators
//!
//! The workflow core never talks to a model directly; it goes through a
//! `GenerationProvider`, selected by configuration. Providers drive the
//! vendor CLI over a subprocess, the same way an operator would.

pub mod claude;
pub mod gemini;
pub mod prompts;

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;

use crate::error::WorkflowError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Request passed to a provider
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub json_schema: Option<serde_json::Value>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Token accounting reported by the provider, when available
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Provider output. `parsed` is present when the request carried a
/// JSON schema and the output validated against it.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub content: String,
    pub parsed: Option<serde_json::Value>,
    pub usage: Option<TokenUsage>,
}

/// A pluggable generation capability. Implementations wrap different
/// backing services; callers check `is_configured` before generating
/// and surface `config_instructions` when it is not.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap, synchronous readiness probe
    fn is_configured(&self) -> bool;

    /// User-facing setup guidance shown when the provider is unavailable
    fn config_instructions(&self) -> String;

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, WorkflowError>;
}

/// Select a provider by configured name
pub fn provider_for(name: &str) -> Result<Box<dyn GenerationProvider>, WorkflowError> {
    match name {
        "claude" => Ok(Box::new(ClaudeProvider::new())),
        "gemini" => Ok(Box::new(GeminiProvider::new())),
        other => Err(WorkflowError::ProviderUnavailable {
            provider: other.to_string(),
            instructions: "Supported providers: claude, gemini. Set `provider` in .planforge/config.toml.".to_string(),
        }),
    }
}

/// Check a binary is reachable on PATH
pub(crate) fn binary_on_path(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file()
    })
}

/// Extract a JSON object from model output, tolerating markdown fences
/// and prose around the payload.
pub(crate) fn extract_json(content: &str) -> Option<serde_json::Value> {
    // Fenced block first
    if let Some(start) = content.find("```json") {
        let rest = &content[start + 7..];
        if let Some(end) = rest.find("```") {
            if let Ok(value) = serde_json::from_str(rest[..end].trim()) {
                return Some(value);
            }
        }
    }
    // Whole output
    if let Ok(value) = serde_json::from_str(content.trim()) {
        return Some(value);
    }
    // First '{' to last '}'
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}

/// Validate parsed output against the request schema. Returns the
/// schema violations, empty when valid.
pub(crate) fn schema_violations(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    match jsonschema::validator_for(schema) {
        Ok(validator) => validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect(),
        Err(e) => vec![format!("invalid schema: {}", e)],
    }
}

/// Shared post-processing: attach parsed output when a schema was
/// requested, failing if the output does not conform.
pub(crate) fn finish_response(
    provider: &'static str,
    request: &GenerationRequest,
    content: String,
    usage: Option<TokenUsage>,
) -> Result<GenerationResponse, WorkflowError> {
    let parsed = match &request.json_schema {
        Some(schema) => {
            let Some(instance) = extract_json(&content) else {
                return Err(WorkflowError::ProviderFailed {
                    provider: provider.to_string(),
                    message: "output contained no parsable JSON".to_string(),
                });
            };
            let violations = schema_violations(schema, &instance);
            if !violations.is_empty() {
                return Err(WorkflowError::ProviderFailed {
                    provider: provider.to_string(),
                    message: format!("output failed schema validation: {}", violations.join("; ")),
                });
            }
            Some(instance)
        }
        None => None,
    };

    Ok(GenerationResponse { content, parsed, usage })
}

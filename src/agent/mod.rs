//! LLM-driven triage of static-analysis findings
//!
//! The agent validates one finding at a time by letting an
//! OpenAI-compatible model call the analysis tools (code context, taint
//! trace, sink and sanitizer detection) and then demanding a structured
//! JSON verdict. BYOK model — API keys come from environment variables.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: OpenAI backend (default)
//! - `OPENROUTER_API_KEY`: OpenRouter backend
//! - `DEEPINFRA_API_KEY`: Deepinfra backend
//! - `OLLAMA_MODEL`: local Ollama, no key needed

mod client;
mod prompts;
mod tools;

pub use client::{ChatMessage, FunctionCall, LlmBackend, LlmClient, LlmConfig, Role, ToolCall};
pub use prompts::{system_prompt, user_prompt};
pub use tools::ToolRegistry;

use crate::models::{VulnerabilityAnalysis, VulnerabilityReport};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while driving the triage agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Protocol(String),

    #[error("Model returned an invalid verdict: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Analysis(#[from] crate::analysis::AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Orchestrates vulnerability validation through LLM tool calling.
pub struct SecurityAgent {
    client: LlmClient,
    registry: ToolRegistry,
}

impl SecurityAgent {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            registry: ToolRegistry::new(),
        }
    }

    /// Build an agent whose API key comes from the backend's env var.
    pub fn from_env(config: LlmConfig) -> AgentResult<Self> {
        Ok(Self::new(LlmClient::from_env_with_config(config)?))
    }

    /// Triage one finding against its source file.
    ///
    /// Round one offers the analysis tools; every requested call is
    /// executed and fed back. Round two forces a JSON object response,
    /// which must validate as a [`VulnerabilityAnalysis`].
    pub fn analyze(
        &self,
        finding: &VulnerabilityReport,
        source_file: &Path,
    ) -> AgentResult<VulnerabilityAnalysis> {
        let mut messages = vec![
            ChatMessage::system(system_prompt()),
            ChatMessage::user(user_prompt(finding, source_file)),
        ];
        let tool_defs = self.registry.definitions();

        let first = self.client.chat(&messages, Some(&tool_defs), false)?;

        let tool_calls = first.tool_calls.clone().unwrap_or_default();
        let final_content = if tool_calls.is_empty() {
            first.content.unwrap_or_default()
        } else {
            messages.push(first);
            for call in &tool_calls {
                debug!(tool = %call.function.name, "model requested tool");
                let result = self
                    .registry
                    .execute(&call.function.name, &call.function.arguments);
                messages.push(ChatMessage::tool(&call.id, &call.function.name, result));
            }
            let second = self.client.chat(&messages, None, true)?;
            second.content.unwrap_or_default()
        };

        if final_content.trim().is_empty() {
            return Err(AgentError::InvalidResponse(
                "empty model response".to_string(),
            ));
        }

        let cleaned = strip_code_fences(&final_content);
        let analysis: VulnerabilityAnalysis = serde_json::from_str(&cleaned)
            .map_err(|e| AgentError::InvalidResponse(format!("verdict failed validation: {e}")))?;

        info!(
            id = %analysis.id,
            classification = %analysis.classification,
            "finding triaged"
        );
        Ok(analysis)
    }
}

/// Strip markdown code fences the model may wrap its JSON in.
fn strip_code_fences(content: &str) -> String {
    content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

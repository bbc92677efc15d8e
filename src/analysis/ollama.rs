//! Ollama-backed analysis adapters.
//!
//! One struct implements both adapter contracts: `analyze` sends the
//! role-specific instruction plus the code sample to `/api/chat`, and
//! `extract_findings` makes a second call asking the model to emit a
//! strict JSON array of findings.

use crate::analysis::error::{AnalysisError, ErrorKind};
use crate::analysis::provider::{AnalysisProvider, FindingExtractor};
use crate::models::{AgentRole, Finding};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the Ollama adapters.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 300,
        }
    }
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Ollama client implementing both adapter contracts.
pub struct OllamaAnalyst {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaAnalyst {
    /// Create a new adapter. Fails if the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AnalysisError::new(ErrorKind::Unknown, format!("http client init: {}", e))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Role-specific analyst instruction.
    fn role_instruction(role: AgentRole) -> &'static str {
        match role {
            AgentRole::Security => {
                "You are a senior Security Engineer. Analyze the code for vulnerabilities \
                 (SQLi, XSS, RCE, etc.). Focus on high-risk issues."
            }
            AgentRole::Reviewer => {
                "You are a meticulous Code Reviewer. Check for complexity, style violations, \
                 and potential bugs. Suggest improvements."
            }
            AgentRole::Performance => {
                "You are a Performance Engineer. Analyze the code for runtime bottlenecks, \
                 memory overhead, and inefficient loops. Suggest optimizations."
            }
            AgentRole::Compliance => {
                "You are a Compliance Officer. Evaluate if the code handles data safely and \
                 follows standard corporate policies."
            }
            AgentRole::Refactor => {
                "You are an expert Software Architect. Provide the final refactored, secure \
                 version of the code snippet based on the findings."
            }
            AgentRole::Integration => {
                "You are a DevOps and Release Engineer. Analyze if the code changes are safe \
                 for the build pipeline and evaluate deployment readiness."
            }
        }
    }

    /// Send one chat request and return the completion text.
    async fn chat(&self, system: &str, user: String) -> Result<String, AnalysisError> {
        let url = format!("{}/api/chat", self.config.base_url);

        let request = ChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::from_transport(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::classify(
                Some(status),
                format!("Ollama API error {}: {}", status, body),
            ));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AnalysisError::new(ErrorKind::Unknown, format!("malformed API response: {}", e))
        })?;

        if chat_response.message.content.trim().is_empty() {
            return Err(AnalysisError::new(
                ErrorKind::Empty,
                "the model returned a null or empty completion",
            ));
        }

        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl AnalysisProvider for OllamaAnalyst {
    async fn analyze(&self, role: AgentRole, source: &str) -> Result<String, AnalysisError> {
        debug!("Running {} analysis ({} bytes)", role, source.len());
        let prompt = format!("CODE TO ANALYZE:\n{}", source);
        self.chat(Self::role_instruction(role), prompt).await
    }
}

const EXTRACTION_PROMPT: &str = "Extract a JSON list of findings from this analysis text. \
Output a JSON array only, no markdown and no prose. Each element must have: \
\"severity\" (one of \"high\", \"medium\", \"low\", \"info\"), \"issue\" (string), \
\"location\" (string), \"remediation\" (string), and optionally \"fixedCode\" (string). \
If the analysis reports nothing actionable, output [].";

#[async_trait]
impl FindingExtractor for OllamaAnalyst {
    async fn extract_findings(&self, raw_text: &str) -> Result<Vec<Finding>, AnalysisError> {
        let content = self.chat(EXTRACTION_PROMPT, raw_text.to_string()).await?;
        Ok(parse_findings(&content))
    }
}

/// Parse a findings array out of model output. Parse failures are
/// absorbed to an empty list; losing some findings beats halting the bus.
pub fn parse_findings(content: &str) -> Vec<Finding> {
    let stripped = strip_code_fences(content);

    match serde_json::from_str::<Vec<Finding>>(stripped) {
        Ok(findings) => findings,
        Err(e) => {
            warn!("PARSING_FAILURE: could not parse structured findings: {}", e);
            Vec::new()
        }
    }
}

/// Trim surrounding markdown code fences if the model added them anyway.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

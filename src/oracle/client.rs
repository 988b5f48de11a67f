//! Ollama-backed rewrite oracle.
//!
//! Talks to a local Ollama instance over its generate API. Every call
//! carries a hard timeout; a timeout is an ordinary transient failure,
//! not a special case.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{OracleError, RewriteOracle, TransformLevel};

/// Prompt for rendering a sentence's structural skeleton.
///
/// Content words become runs of underscores, which is what the positional
/// scorer recognizes as placeholder tokens.
pub const BLEACH_PROMPT: &str = r#"Rewrite the sentence below as a structural skeleton.

Rules:
1. Replace every content word (noun, main verb, adjective, adverb) with four underscores: ____
2. Keep all function words exactly as written: articles, pronouns, prepositions, conjunctions, auxiliaries.
3. Keep every punctuation mark in its original position.
4. Keep the original word order and spacing. Do not add, remove, or reorder words.

Sentence:
{sentence}

Respond with ONLY the skeleton, no explanation or preamble."#;

const REWRITE_PROMPT_LIGHT: &str = r#"Rewrite the sentence below with small, natural wording changes. Preserve the sentence structure, tone, and meaning. Change at most a few words.

Sentence:
{sentence}

Respond with ONLY the rewritten sentence."#;

const REWRITE_PROMPT_MEDIUM: &str = r#"Rewrite the sentence below in different words while keeping its meaning and roughly its length. Vary word choice and phrasing freely, but keep the clause structure recognizable.

Sentence:
{sentence}

Respond with ONLY the rewritten sentence."#;

const REWRITE_PROMPT_HEAVY: &str = r#"Rewrite the sentence below from scratch: same meaning, completely different wording and rhythm. Restructure clauses if it reads more naturally.

Sentence:
{sentence}

Respond with ONLY the rewritten sentence."#;

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3.2:3b-instruct-q8_0".to_string()
}
fn default_max_tokens() -> u32 {
    256
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    25
}

/// Configuration for the Ollama oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ollama API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Hard per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ollama generate API request.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Rewrite oracle backed by Ollama.
pub struct OllamaOracle {
    config: OracleConfig,
    client: Client,
}

impl OllamaOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| OracleError::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Check whether the Ollama service responds at all.
    pub async fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn rewrite_prompt(level: TransformLevel) -> &'static str {
        match level {
            TransformLevel::Light => REWRITE_PROMPT_LIGHT,
            TransformLevel::Medium => REWRITE_PROMPT_MEDIUM,
            TransformLevel::Heavy => REWRITE_PROMPT_HEAVY,
        }
    }

    async fn generate(&self, prompt: String) -> Result<String, OracleError> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout())
                } else {
                    OracleError::Connection(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| OracleError::Response(e.to_string()))?;

        let text = body.response.trim().to_string();
        if text.is_empty() {
            return Err(OracleError::Response("empty generation".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl RewriteOracle for OllamaOracle {
    async fn rewrite(&self, text: &str, level: TransformLevel) -> Result<String, OracleError> {
        let prompt = Self::rewrite_prompt(level).replace("{sentence}", text);
        debug!(level = level.as_str(), "rewriting sentence");
        self.generate(prompt).await
    }

    async fn bleach(&self, text: &str) -> Result<String, OracleError> {
        let prompt = BLEACH_PROMPT.replace("{sentence}", text);
        debug!("bleaching sentence");
        let skeleton = self.generate(prompt).await?;
        // A skeleton with no placeholder runs means the model ignored the
        // instructions; that is a malformed response, not a transient one.
        if !skeleton.contains('_') {
            return Err(OracleError::Response(format!(
                "no placeholders in skeleton: {skeleton}"
            )));
        }
        Ok(skeleton)
    }
}

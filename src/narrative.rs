//! AI-narrative backend.
//!
//! Produces human-readable prose layered on top of computed metrics. It is
//! never a source of numbers: every method returns `None` (or an empty PII
//! list) when the backend is disabled or the remote call fails, and the
//! report is built without it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use doc_compare_core::models::SentimentResult;

use crate::config::{NarrativeConfig, RemoteConfig};
use crate::remote::RemoteCaller;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const PII_SYSTEM_PROMPT: &str = "You are a data privacy assistant.";
const PLAIN_AUDIENCE: &str = "Format it in a way that is easy to understand for a non-technical audience.\n";

/// A chat request: system prompt, user prompt and sampling temperature
/// override.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeRequest {
    pub system: &'static str,
    pub prompt: String,
    pub temperature: Option<f64>,
}

impl NarrativeRequest {
    pub fn new(prompt: String) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            prompt,
            temperature: None,
        }
    }
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Generated text for the request, or `None` on any failure.
    async fn generate(&self, request: &NarrativeRequest) -> Option<String>;
}

/// Backend used when `narrative.provider = "disabled"`.
pub struct DisabledNarrative;

#[async_trait]
impl NarrativeGenerator for DisabledNarrative {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _request: &NarrativeRequest) -> Option<String> {
        None
    }
}

/// Azure OpenAI chat-completions deployment.
pub struct AzureOpenAiNarrative {
    caller: RemoteCaller,
    url: String,
    api_key: String,
    max_tokens: u32,
    temperature: f64,
}

impl AzureOpenAiNarrative {
    pub fn new(config: &NarrativeConfig, remote: &RemoteConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .context("narrative.endpoint required for Azure OpenAI provider")?;
        let api_key = config
            .api_key
            .clone()
            .context("narrative.api_key required for Azure OpenAI provider (or set DCMP_NARRATIVE_KEY)")?;
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version
        );
        Ok(Self {
            caller: RemoteCaller::new(remote)?,
            url,
            api_key,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

/// `choices[0].message.content`, trimmed; `None` when missing or blank.
fn parse_chat_content(payload: &Value) -> Option<String> {
    let content = payload
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();
    (!content.is_empty()).then(|| content.to_string())
}

#[async_trait]
impl NarrativeGenerator for AzureOpenAiNarrative {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn generate(&self, request: &NarrativeRequest) -> Option<String> {
        let body = json!({
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "max_tokens": self.max_tokens,
            "temperature": request.temperature.unwrap_or(self.temperature),
        });
        let outcome = self
            .caller
            .call(&self.url, &[("api-key", self.api_key.as_str())], &body)
            .await;
        let content = outcome.success_json().as_ref().and_then(parse_chat_content);
        if content.is_none() {
            warn!("narrative generation returned no usable content");
        }
        content
    }
}

/// Build the narrative backend selected by `narrative.provider`.
pub fn create_narrative(config: &NarrativeConfig, remote: &RemoteConfig) -> Result<Arc<dyn NarrativeGenerator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledNarrative)),
        "azure-openai" => Ok(Arc::new(AzureOpenAiNarrative::new(config, remote)?)),
        other => anyhow::bail!("Unknown narrative provider: {}", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Prompts
// ═══════════════════════════════════════════════════════════════════════

fn pair_prompt(instruction: &str, doc1: &str, doc2: &str) -> String {
    format!(
        "{}\n\nDocument 1:\n{}\n\nDocument 2:\n{}\n{}",
        instruction, doc1, doc2, PLAIN_AUDIENCE
    )
}

pub fn diff_explanation_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Compare the following two documents and explain the main differences in plain language. \
         Provide a concise summary of the key differences.",
        doc1,
        doc2,
    )
}

pub fn similarity_explanation_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Given the following two documents, explain in simple terms why they are similar or different. \
         Highlight any important similarities or differences in content, tone, or structure.",
        doc1,
        doc2,
    )
}

pub fn suggested_edits_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Suggest specific edits or changes to Document 1 so that it matches Document 2 as closely as possible. \
         List the edits as actionable steps.",
        doc1,
        doc2,
    )
}

pub fn structural_comparison_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Compare the structure of the following two documents. \
         Describe differences in sections, headings, and order of content.",
        doc1,
        doc2,
    )
}

pub fn section_alignment_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Analyze the following two documents and provide a mapping of corresponding sections or headings. \
         If sections do not align, explain the differences.",
        doc1,
        doc2,
    )
}

pub fn highlighted_changes_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Highlight the most important changes between the following two documents. \
         List the changes in order of significance.",
        doc1,
        doc2,
    )
}

pub fn risk_assessment_prompt(doc1: &str, doc2: &str) -> String {
    pair_prompt(
        "Review the differences between the following two documents and assess if any changes introduce risk, \
         compliance issues, or require urgent attention. Summarize your findings.",
        doc1,
        doc2,
    )
}

pub fn sentiment_explanation_prompt(doc: &str, result: &SentimentResult) -> String {
    let scores = serde_json::to_string(result).unwrap_or_default();
    format!(
        "Given the following document and its sentiment analysis result, explain in simple terms why this \
         sentiment was detected. Highlight any important phrases or sections that contributed to the \
         sentiment.\n\nDocument:\n{}\n\nSentiment Analysis Result: {}\n",
        doc, scores
    )
}

pub fn summarize_prompt(text: &str, language: &str) -> String {
    format!("Summarize the following text in {}:\n\n{}", language, text)
}

pub fn pii_prompt(text: &str) -> String {
    format!(
        "Extract all personally identifiable information (PII) such as names, addresses, phone numbers, \
         emails, government IDs, and any sensitive data from the following text. Return the PII as a JSON \
         list of strings. If none, return an empty list.\n\nText:\n{}",
        text
    )
}

/// JSON list of strings, or the whole reply as one entry when it is not
/// JSON. Non-string list items are rendered as JSON text.
pub fn parse_pii(content: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(_) => vec![content.to_string()],
    }
}

/// Prompt-level operations over any [`NarrativeGenerator`].
#[derive(Clone)]
pub struct Narrator {
    backend: Arc<dyn NarrativeGenerator>,
}

impl Narrator {
    pub fn new(backend: Arc<dyn NarrativeGenerator>) -> Self {
        Self { backend }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.name() != "disabled"
    }

    async fn ask(&self, prompt: String) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        self.backend.generate(&NarrativeRequest::new(prompt)).await
    }

    pub async fn diff_explanation(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(diff_explanation_prompt(doc1, doc2)).await
    }

    pub async fn similarity_explanation(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(similarity_explanation_prompt(doc1, doc2)).await
    }

    pub async fn suggested_edits(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(suggested_edits_prompt(doc1, doc2)).await
    }

    pub async fn structural_comparison(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(structural_comparison_prompt(doc1, doc2)).await
    }

    pub async fn section_alignment(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(section_alignment_prompt(doc1, doc2)).await
    }

    pub async fn highlighted_changes(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(highlighted_changes_prompt(doc1, doc2)).await
    }

    pub async fn risk_assessment(&self, doc1: &str, doc2: &str) -> Option<String> {
        self.ask(risk_assessment_prompt(doc1, doc2)).await
    }

    pub async fn sentiment_explanation(&self, doc: &str, result: &SentimentResult) -> Option<String> {
        self.ask(sentiment_explanation_prompt(doc, result)).await
    }

    pub async fn summarize(&self, text: &str, language: &str) -> Option<String> {
        self.ask(summarize_prompt(text, language)).await
    }

    /// PII strings found in `text`; empty when disabled or on failure.
    pub async fn detect_pii(&self, text: &str) -> Vec<String> {
        if !self.is_enabled() {
            return Vec::new();
        }
        let request = NarrativeRequest {
            system: PII_SYSTEM_PROMPT,
            prompt: pii_prompt(text),
            temperature: Some(0.0),
        };
        match self.backend.generate(&request).await {
            Some(content) => {
                let pii = parse_pii(&content);
                debug!(count = pii.len(), "pii detection finished");
                pii
            }
            None => Vec::new(),
        }
    }
}

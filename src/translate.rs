//! Translation adapter.
//!
//! Normalizes text to a common language before comparison. Two backends:
//! - **[`PassthroughTranslator`]**: returns the input unchanged; used when
//!   `translation.provider = "disabled"`.
//! - **[`AzureTranslator`]**: Azure Translator Text v3 over the
//!   [`RemoteCaller`], one request per chunk.
//!
//! Neither backend ever fails. A chunk whose call fails or whose payload
//! has an unexpected shape is kept in its original language, and the rest
//! of the document is still translated.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use doc_compare_core::chunk::chunk_text;

use crate::config::{Config, RemoteConfig, TranslationConfig};
use crate::remote::RemoteCaller;

/// Reported when a language cannot be detected.
pub const UNDETERMINED_LANGUAGE: &str = "undetermined";

#[async_trait]
pub trait Translator: Send + Sync {
    /// Backend identifier, e.g. `"disabled"` or `"azure"`.
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target_language: &str, source_language: Option<&str>) -> String;

    /// Language code of `text`, or `None` when no backend can tell.
    async fn detect_language(&self, text: &str) -> Option<String>;
}

/// Identity translation.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn translate(&self, text: &str, _target_language: &str, _source_language: Option<&str>) -> String {
        text.to_string()
    }

    async fn detect_language(&self, _text: &str) -> Option<String> {
        None
    }
}

/// Azure Translator Text API (v3).
pub struct AzureTranslator {
    caller: RemoteCaller,
    endpoint: String,
    api_key: String,
    region: String,
    chunk_chars: usize,
    detect_chunk_chars: usize,
}

impl AzureTranslator {
    pub fn new(config: &TranslationConfig, remote: &RemoteConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .context("translation.endpoint required for Azure provider")?;
        let api_key = config
            .api_key
            .clone()
            .context("translation.api_key required for Azure provider (or set DCMP_TRANSLATOR_KEY)")?;
        Ok(Self {
            caller: RemoteCaller::new(remote)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            region: config.region.clone().unwrap_or_else(|| "global".to_string()),
            chunk_chars: config.chunk_chars,
            detect_chunk_chars: config.detect_chunk_chars,
        })
    }

    fn headers(&self) -> [(&str, &str); 2] {
        [
            ("Ocp-Apim-Subscription-Key", self.api_key.as_str()),
            ("Ocp-Apim-Subscription-Region", self.region.as_str()),
        ]
    }
}

/// `[{"translations": [{"text": ...}]}]` → the first translation.
fn parse_translation(payload: &Value) -> Option<String> {
    payload
        .get(0)?
        .get("translations")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(String::from)
}

/// `[{"language": ...}]` → the language code.
fn parse_detection(payload: &Value) -> Option<String> {
    payload
        .get(0)?
        .get("language")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[async_trait]
impl Translator for AzureTranslator {
    fn name(&self) -> &str {
        "azure"
    }

    async fn translate(&self, text: &str, target_language: &str, source_language: Option<&str>) -> String {
        let mut url = format!(
            "{}/translate?api-version=3.0&to={}",
            self.endpoint, target_language
        );
        if let Some(source) = source_language {
            url.push_str("&from=");
            url.push_str(source);
        }

        let chunks = chunk_text(text, self.chunk_chars);
        let mut translated = String::with_capacity(text.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let outcome = self
                .caller
                .call(&url, &self.headers(), &json!([{ "text": chunk }]))
                .await;
            match outcome.ok_json().as_ref().and_then(parse_translation) {
                Some(t) => translated.push_str(&t),
                None => {
                    warn!(chunk = idx, "translation failed, keeping original chunk");
                    translated.push_str(chunk);
                }
            }
        }
        debug!(chunks = chunks.len(), target_language, "translated text");
        translated
    }

    async fn detect_language(&self, text: &str) -> Option<String> {
        let url = format!("{}/detect?api-version=3.0", self.endpoint);
        for (idx, chunk) in chunk_text(text, self.detect_chunk_chars).iter().enumerate() {
            let outcome = self
                .caller
                .call(&url, &self.headers(), &json!([{ "text": chunk }]))
                .await;
            if let Some(language) = outcome.ok_json().as_ref().and_then(parse_detection) {
                return Some(language);
            }
            debug!(chunk = idx, "language detection gave no result for chunk");
        }
        None
    }
}

/// Build the translator selected by `translation.provider`.
pub fn create_translator(config: &TranslationConfig, remote: &RemoteConfig) -> Result<Arc<dyn Translator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(PassthroughTranslator)),
        "azure" => Ok(Arc::new(AzureTranslator::new(config, remote)?)),
        other => anyhow::bail!("Unknown translation provider: {}", other),
    }
}

/// CLI entry point for `dcmp translate`.
pub async fn run_translate(
    config: &Config,
    text: &str,
    to: Option<&str>,
    from: Option<&str>,
) -> Result<()> {
    let translator = create_translator(&config.translation, &config.remote)?;
    if !config.translation.is_enabled() {
        eprintln!("No translation backend configured; printing input unchanged.");
    }
    let target = to.unwrap_or(&config.translation.target_language);
    println!("{}", translator.translate(text, target, from).await);
    Ok(())
}

/// CLI entry point for `dcmp detect`.
pub async fn run_detect(config: &Config, text: &str, json: bool) -> Result<()> {
    let translator = create_translator(&config.translation, &config.remote)?;
    let language = translator
        .detect_language(text)
        .await
        .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string());
    if json {
        println!("{}", json!({ "language": language }));
    } else {
        println!("{}", language);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_returns_input() {
        let t = PassthroughTranslator;
        assert_eq!(t.translate("hola", "en", None).await, "hola");
        assert_eq!(t.detect_language("hola").await, None);
    }

    #[test]
    fn test_parse_translation_shapes() {
        let ok = json!([{ "translations": [{ "text": "hello", "to": "en" }] }]);
        assert_eq!(parse_translation(&ok).as_deref(), Some("hello"));
        assert_eq!(parse_translation(&json!([])), None);
        assert_eq!(parse_translation(&json!({ "error": "x" })), None);
        assert_eq!(parse_translation(&json!([{ "translations": [] }])), None);
    }

    #[test]
    fn test_parse_detection_shapes() {
        assert_eq!(parse_detection(&json!([{ "language": "es", "score": 1.0 }])).as_deref(), Some("es"));
        assert_eq!(parse_detection(&json!([{ "language": "" }])), None);
        assert_eq!(parse_detection(&json!("es")), None);
    }

    #[test]
    fn test_factory_selects_backend() {
        let remote = RemoteConfig::default();
        let disabled = create_translator(&TranslationConfig::default(), &remote).unwrap();
        assert_eq!(disabled.name(), "disabled");

        let missing_key = TranslationConfig {
            provider: "azure".to_string(),
            endpoint: Some("http://localhost".to_string()),
            ..Default::default()
        };
        assert!(create_translator(&missing_key, &remote).is_err());
    }
}

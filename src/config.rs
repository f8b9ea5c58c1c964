//! Configuration loading and validation.
//!
//! Parsed from a TOML file. Every section and every field has a default,
//! so an empty file (or no file at all, via [`Config::minimal`]) yields a
//! working local-only setup: no translation backend, no narrative backend,
//! the built-in heuristic analyzer and the stock thresholds.
//!
//! ```toml
//! [remote]
//! max_retries = 5
//! timeout_secs = 10
//!
//! [translation]
//! provider = "azure"
//! endpoint = "https://api.cognitive.microsofttranslator.com"
//! region = "westeurope"
//!
//! [narrative]
//! provider = "azure-openai"
//! endpoint = "https://example.openai.azure.com"
//! deployment = "gpt-4"
//!
//! [thresholds]
//! controversy = 0.15
//!
//! [diff]
//! context_lines = 2
//! ```
//!
//! Credentials are plain fields here. Filling them from the process
//! environment is the binary's job.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use doc_compare_core::chunk::{DETECT_CHUNK_CHARS, TRANSLATE_CHUNK_CHARS};
use doc_compare_core::sentiment::SentimentThresholds;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub narrative: NarrativeConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub diff: DiffConfig,
}

impl Config {
    /// Everything at its default; used when no config file is given.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Retry and timeout policy for every remote call.
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Wait used for a 429 response that carries no `Retry-After` header.
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
    /// Upper bound on any single rate-limit wait, whatever the server asks.
    #[serde(default = "default_max_retry_after_secs")]
    pub max_retry_after_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            default_retry_after_secs: default_retry_after_secs(),
            max_retry_after_secs: default_max_retry_after_secs(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_retry_after_secs() -> u64 {
    2
}
fn default_max_retry_after_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_disabled")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    #[serde(default = "default_detect_chunk_chars")]
    pub detect_chunk_chars: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: default_disabled(),
            endpoint: None,
            region: None,
            api_key: None,
            target_language: default_target_language(),
            chunk_chars: default_chunk_chars(),
            detect_chunk_chars: default_detect_chunk_chars(),
        }
    }
}

impl TranslationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_disabled() -> String {
    "disabled".to_string()
}
fn default_target_language() -> String {
    "en".to_string()
}
fn default_chunk_chars() -> usize {
    TRANSLATE_CHUNK_CHARS
}
fn default_detect_chunk_chars() -> usize {
    DETECT_CHUNK_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct NarrativeConfig {
    #[serde(default = "default_disabled")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_deployment")]
    pub deployment: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            provider: default_disabled(),
            endpoint: None,
            deployment: default_deployment(),
            api_key: None,
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl NarrativeConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_deployment() -> String {
    "gpt-4".to_string()
}
fn default_api_version() -> String {
    "2024-02-15-preview".to_string()
}
fn default_max_tokens() -> u32 {
    256
}
fn default_temperature() -> f64 {
    0.3
}

/// Decision thresholds used by the comparators.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ThresholdsConfig {
    #[serde(default = "default_risk_high_negative")]
    pub risk_high_negative: f64,
    #[serde(default = "default_risk_medium_neutral")]
    pub risk_medium_neutral: f64,
    #[serde(default = "default_controversy")]
    pub controversy: f64,
    #[serde(default = "default_tone_emotion")]
    pub tone_emotion: f64,
    #[serde(default = "default_semantic_alert")]
    pub semantic_alert: f64,
    #[serde(default = "default_semantic_change")]
    pub semantic_change: f64,
    #[serde(default = "default_semantic_outlier")]
    pub semantic_outlier: f64,
    #[serde(default = "default_sentiment_alert")]
    pub sentiment_alert: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            risk_high_negative: default_risk_high_negative(),
            risk_medium_neutral: default_risk_medium_neutral(),
            controversy: default_controversy(),
            tone_emotion: default_tone_emotion(),
            semantic_alert: default_semantic_alert(),
            semantic_change: default_semantic_change(),
            semantic_outlier: default_semantic_outlier(),
            sentiment_alert: default_sentiment_alert(),
        }
    }
}

impl ThresholdsConfig {
    pub fn sentiment(&self) -> SentimentThresholds {
        SentimentThresholds {
            risk_high_negative: self.risk_high_negative,
            risk_medium_neutral: self.risk_medium_neutral,
            controversy: self.controversy,
            alert: self.sentiment_alert,
        }
    }

    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("risk_high_negative", self.risk_high_negative),
            ("risk_medium_neutral", self.risk_medium_neutral),
            ("controversy", self.controversy),
            ("tone_emotion", self.tone_emotion),
            ("semantic_alert", self.semantic_alert),
            ("semantic_change", self.semantic_change),
            ("semantic_outlier", self.semantic_outlier),
            ("sentiment_alert", self.sentiment_alert),
        ]
    }
}

fn default_risk_high_negative() -> f64 {
    0.7
}
fn default_risk_medium_neutral() -> f64 {
    0.5
}
fn default_controversy() -> f64 {
    0.15
}
fn default_tone_emotion() -> f64 {
    0.2
}
fn default_semantic_alert() -> f64 {
    0.3
}
fn default_semantic_change() -> f64 {
    0.3
}
fn default_semantic_outlier() -> f64 {
    0.4
}
fn default_sentiment_alert() -> f64 {
    0.7
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiffConfig {
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
        }
    }
}

fn default_context_lines() -> usize {
    2
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    for (name, value) in config.thresholds.named() {
        if !(0.0..=1.0).contains(&value) {
            bail!("thresholds.{} must be in [0.0, 1.0]", name);
        }
    }

    if config.translation.chunk_chars == 0 {
        bail!("translation.chunk_chars must be > 0");
    }
    if config.translation.detect_chunk_chars == 0 {
        bail!("translation.detect_chunk_chars must be > 0");
    }

    match config.translation.provider.as_str() {
        "disabled" => {}
        "azure" => {
            if config.translation.endpoint.is_none() {
                bail!("translation.endpoint must be specified when provider is 'azure'");
            }
        }
        other => bail!(
            "Unknown translation provider: '{}'. Must be disabled or azure.",
            other
        ),
    }

    match config.narrative.provider.as_str() {
        "disabled" => {}
        "azure-openai" => {
            if config.narrative.endpoint.is_none() {
                bail!("narrative.endpoint must be specified when provider is 'azure-openai'");
            }
        }
        other => bail!(
            "Unknown narrative provider: '{}'. Must be disabled or azure-openai.",
            other
        ),
    }

    if !(0.0..=2.0).contains(&config.narrative.temperature) {
        bail!("narrative.temperature must be in [0.0, 2.0]");
    }
    if config.remote.timeout_secs == 0 {
        bail!("remote.timeout_secs must be > 0");
    }
    if config.remote.max_retry_after_secs < config.remote.default_retry_after_secs {
        bail!("remote.max_retry_after_secs must be >= remote.default_retry_after_secs");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        validate(&config).unwrap();
        assert_eq!(config.remote.max_retries, 5);
        assert_eq!(config.remote.default_retry_after_secs, 2);
        assert_eq!(config.remote.max_retry_after_secs, 60);
        assert_eq!(config.translation.chunk_chars, 4000);
        assert_eq!(config.translation.detect_chunk_chars, 1000);
        assert!(!config.translation.is_enabled());
        assert!(!config.narrative.is_enabled());
        assert_eq!(config.thresholds, ThresholdsConfig::default());
        assert_eq!(config.diff.context_lines, 2);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config: Config = toml::from_str("[thresholds]\ncontroversy = 1.5\n").unwrap();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("thresholds.controversy"));
    }

    #[test]
    fn test_retry_after_cap_below_default_rejected() {
        let config: Config =
            toml::from_str("[remote]\ndefault_retry_after_secs = 10\nmax_retry_after_secs = 5\n")
                .unwrap();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("remote.max_retry_after_secs"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config: Config = toml::from_str("[translation]\nprovider = \"deepl\"\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let config: Config = toml::from_str("[narrative]\nprovider = \"azure-openai\"\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: Config = toml::from_str(include_str!("../config/dcmp.example.toml")).unwrap();
        validate(&config).unwrap();
        assert_eq!(config.thresholds, ThresholdsConfig::default());
    }

    #[test]
    fn test_sentiment_thresholds_mapping() {
        let t = ThresholdsConfig::default().sentiment();
        assert_eq!(t, SentimentThresholds::default());
    }
}

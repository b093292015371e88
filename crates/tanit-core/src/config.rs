use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Languages whose first-pass output is trusted as-is.
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,

    /// Language forced on the second pass when detection falls outside the whitelist.
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,

    #[serde(default = "default_beam_size")]
    pub beam_size: u32,

    #[serde(default)]
    pub whisper: Option<WhisperConfig>,

    /// Raw table handed to the `null` engine (scripted segments for dry runs).
    #[serde(default)]
    pub null: Option<toml::Value>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            whitelist: default_whitelist(),
            fallback_language: default_fallback_language(),
            beam_size: default_beam_size(),
            whisper: None,
            null: None,
        }
    }
}

impl TranscriptionConfig {
    /// Engine-specific table passed to `SpeechEngine::initialize`.
    pub fn engine_config(&self) -> Result<toml::Value, ConfigError> {
        let value = match self.engine.as_str() {
            "whisper" => match self.whisper {
                Some(ref whisper) => toml::Value::try_from(whisper)?,
                None => toml::Value::try_from(WhisperConfig::default())?,
            },
            "null" => self
                .null
                .clone()
                .unwrap_or_else(|| toml::Value::Table(Default::default())),
            _ => toml::Value::Table(Default::default()),
        };
        Ok(value)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WhisperConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,

    #[serde(default)]
    pub use_gpu: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            use_gpu: false,
            threads: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_placeholder_backend")]
    pub image: String,

    #[serde(default = "default_placeholder_backend")]
    pub pdf: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            image: default_placeholder_backend(),
            pdf: default_placeholder_backend(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_backend")]
    pub backend: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: default_retrieval_backend(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTurnMode {
    #[default]
    Placeholder,
    Skip,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default)]
    pub empty_turn: EmptyTurnMode,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            empty_turn: EmptyTurnMode::default(),
            placeholder: default_placeholder(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Text-to-speech backend for assistant replies.
    #[serde(default = "default_synthesizer")]
    pub synthesizer: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            synthesizer: default_synthesizer(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_engine() -> String {
    "whisper".to_string()
}

fn default_whitelist() -> Vec<String> {
    vec!["fr".to_string(), "en".to_string()]
}

fn default_fallback_language() -> String {
    "fr".to_string()
}

fn default_beam_size() -> u32 {
    5
}

// q8_0 weights: the reduced-precision counterpart of an int8 compute mode.
fn default_model_path() -> String {
    "./models/ggml-medium-q8_0.bin".to_string()
}

fn default_placeholder_backend() -> String {
    "placeholder".to_string()
}

fn default_retrieval_backend() -> String {
    "keyword".to_string()
}

fn default_synthesizer() -> String {
    "silent".to_string()
}

fn default_placeholder() -> String {
    "[empty message]".to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = input.to_string();
    for cap in ENV_VAR_PATTERN.captures_iter(input) {
        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }
    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}

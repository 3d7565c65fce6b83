use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::language_utils::{FriendlyName, LanguageCodeRegistry};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Base model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Pipeline load retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Text chunking settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Translation backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Optional JSON file with extra manual overrides, merged over the built-in ones
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,

    /// Target language friendly name used when none is given
    #[serde(default = "default_target_language")]
    pub default_target_language: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Base model configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    /// Remote model identifier
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Local directory preferred over the remote identifier when it holds complete weights
    #[serde(default = "default_local_model_dir")]
    pub local_model_dir: Option<PathBuf>,

    /// Maximum generated length per input
    #[serde(default = "default_max_output_length")]
    pub max_output_length: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            local_model_dir: default_local_model_dir(),
            max_output_length: default_max_output_length(),
        }
    }
}

/// Delay growth between retries
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles after each attempt
    Exponential,
}

/// Retry configuration for pipeline construction
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffKind,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff: BackoffKind::default(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Sentences grouped into one chunk
    #[serde(default = "default_sentences_per_chunk")]
    pub sentences_per_chunk: usize,

    /// Words per window when a single long sentence is split
    #[serde(default = "default_word_window")]
    pub word_window: usize,

    /// A lone sentence longer than this many words is split into windows
    #[serde(default = "default_long_sentence_words")]
    pub long_sentence_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            sentences_per_chunk: default_sentences_per_chunk(),
            word_window: default_word_window(),
            long_sentence_words: default_long_sentence_words(),
        }
    }
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendProvider {
    // @provider: built-in phrase table, works offline
    #[default]
    Phrasebook,
    // @provider: model server over HTTP
    InferenceServer,
}

impl BackendProvider {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Phrasebook => "Phrasebook",
            Self::InferenceServer => "Inference server",
        }
    }
}

impl std::fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phrasebook => write!(f, "phrasebook"),
            Self::InferenceServer => write!(f, "inference_server"),
        }
    }
}

impl std::str::FromStr for BackendProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "phrasebook" => Ok(Self::Phrasebook),
            "inference_server" => Ok(Self::InferenceServer),
            _ => Err(anyhow::anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// Backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    /// Backend to use
    #[serde(default)]
    pub provider: BackendProvider,

    /// Model server URL, used by `inference_server`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::default(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Equivalent `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model_id() -> String {
    "facebook/nllb-200-distilled-600M".to_string()
}

fn default_local_model_dir() -> Option<PathBuf> {
    Some(PathBuf::from("models/facebook/nllb-200-distilled-600M"))
}

fn default_max_output_length() -> usize {
    512
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_sentences_per_chunk() -> usize {
    3
}

fn default_word_window() -> usize {
    25
}

fn default_long_sentence_words() -> usize {
    30
}

fn default_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_target_language() -> String {
    "Hindi".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.model_id.trim().is_empty() {
            return Err(invalid("model.model_id", "must not be empty"));
        }
        if self.model.max_output_length == 0 {
            return Err(invalid("model.max_output_length", "must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.chunking.sentences_per_chunk == 0 {
            return Err(invalid("chunking.sentences_per_chunk", "must be greater than zero"));
        }
        if self.chunking.word_window == 0 {
            return Err(invalid("chunking.word_window", "must be greater than zero"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(invalid("backend.timeout_secs", "must be greater than zero"));
        }

        let target = FriendlyName::from(self.default_target_language.as_str());
        if LanguageCodeRegistry::standard()
            .model_code_for_friendly_name(&target)
            .is_none()
        {
            return Err(ConfigError::UnknownLanguage(self.default_target_language.clone()));
        }

        if self.backend.provider == BackendProvider::InferenceServer {
            url::Url::parse(&self.backend.endpoint)
                .map_err(|e| invalid("backend.endpoint", &e.to_string()))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig::default(),
            retry: RetryConfig::default(),
            chunking: ChunkingConfig::default(),
            backend: BackendConfig::default(),
            dictionary_path: None,
            default_target_language: default_target_language(),
            log_level: LogLevel::default(),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

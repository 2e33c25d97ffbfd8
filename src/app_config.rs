use anyhow::{anyhow, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::errors::TranslationError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and overriding configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Extraction, batching and output settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepSeek (OpenAI-compatible)
    #[default]
    DeepSeek,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepSeek => "DeepSeek",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepSeek => "deepseek".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Hosted providers refuse requests without a credential
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::DeepSeek | Self::OpenAI | Self::Anthropic)
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    // @field: Optional cap on in-flight requests, unlimited when absent
    #[serde(default)]
    pub concurrent_requests: Option<usize>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_ms: default_timeout_ms(),
            concurrent_requests: None,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// How a file's translation reacts when some batches fail
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchFailurePolicy {
    /// Any failed batch fails the whole file
    #[default]
    AllOrNothing,
    /// Merge whatever succeeded and continue
    Salvage,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base delay for exponential backoff (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Behaviour when a batch exhausts its retries
    #[serde(default)]
    pub batch_failure: BatchFailurePolicy,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            batch_failure: BatchFailurePolicy::default(),
        }
    }
}

/// What to do when two properties derive the same key
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyCollisionPolicy {
    /// Later value overwrites, first position is kept
    #[default]
    KeepLast,
    /// First value wins, later duplicates are ignored
    KeepFirst,
    /// Refuse the document
    Error,
}

/// What to do when the merged translations lack a key during reinjection
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingTranslationPolicy {
    /// Abort the file's output
    #[default]
    Fail,
    /// Leave the original literal in place
    KeepOriginal,
}

/// Extraction, batching and output settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Maximum entries per batch for TypeScript / JavaScript documents
    #[serde(default = "default_batch_size")]
    pub code_batch_size: usize,

    /// Maximum entries per batch for JSON documents
    #[serde(default = "default_batch_size")]
    pub json_batch_size: usize,

    /// Name of the output directory created next to (or inside) the input
    #[serde(default = "default_output_dir_name")]
    pub output_dir_name: String,

    #[serde(default)]
    pub key_collision: KeyCollisionPolicy,

    #[serde(default)]
    pub missing_translation: MissingTranslationPolicy,

    /// Copy an existing destination file aside before overwriting it
    #[serde(default = "default_true")]
    pub backup_existing: bool,

    /// Draw a progress bar while files are processed
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            code_batch_size: default_batch_size(),
            json_batch_size: default_batch_size(),
            output_dir_name: default_output_dir_name(),
            key_collision: KeyCollisionPolicy::default(),
            missing_translation: MissingTranslationPolicy::default(),
            backup_existing: true,
            show_progress: true,
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
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_ms() -> u64 {
    600_000
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_batch_size() -> usize {
    500
}

fn default_output_dir_name() -> String {
    "dist".to_string()
}

fn default_true() -> bool {
    true
}

fn default_endpoint(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::DeepSeek => "https://api.deepseek.com/v1".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::DeepSeek => "deepseek-chat".to_string(),
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        TranslationProvider::Ollama => "llama3.2:3b".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

impl Config {
    /// Load a configuration file, falling back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults.", path);
            return Ok(Config::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.pipeline.code_batch_size == 0 || self.pipeline.json_batch_size == 0 {
            return Err(TranslationError::Config(
                "Batch size must be greater than zero".to_string(),
            ));
        }

        if self.pipeline.output_dir_name.trim().is_empty() {
            return Err(TranslationError::Config(
                "Output directory name cannot be empty".to_string(),
            ));
        }

        self.translation.validate()
    }
}

impl TranslationConfig {
    /// Validate the active provider settings
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.provider.requires_api_key() && self.get_api_key().is_empty() {
            return Err(TranslationError::Config(format!(
                "Translation API key is required for {} provider",
                self.provider.display_name()
            )));
        }

        let endpoint = self.get_endpoint();
        Url::parse(&endpoint).map_err(|e| {
            TranslationError::Config(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;

        if self.get_timeout_ms() == 0 {
            return Err(TranslationError::Config(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        if self.get_concurrent_requests() == Some(0) {
            return Err(TranslationError::Config(
                "Concurrent request cap must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the active provider configuration, inserting a default one when absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str);

        let index = match position {
            Some(index) => index,
            None => {
                self.available_providers
                    .push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };

        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model(self.provider)
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint(self.provider)
    }

    /// Get the per-call timeout for the active provider
    pub fn get_timeout_ms(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_ms)
            .unwrap_or_else(default_timeout_ms)
    }

    /// Get the optional concurrency cap for the active provider
    pub fn get_concurrent_requests(&self) -> Option<usize> {
        self.get_active_provider_config()
            .and_then(|p| p.concurrent_requests)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::DeepSeek),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}

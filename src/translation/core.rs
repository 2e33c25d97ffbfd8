/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which sends
 * batches to the oracle concurrently, retries failed attempts with
 * exponential backoff, validates every answer and merges the results.
 */

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Oracle;

use super::batch::TranslationBatch;
use super::prompts::PromptTemplate;
use super::response::decode_response;
use super::TranslationMap;

/// Retry budget and backoff base for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry `retry` (0-indexed): `base_delay * 2^retry`
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Result of one batch after its retries
#[derive(Debug)]
pub struct BatchOutcome {
    /// Batch index
    pub index: usize,
    /// Keys the batch asked for
    pub keys: Vec<String>,
    /// Translations or the error that exhausted the retry budget
    pub result: Result<TranslationMap, TranslationError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of every batch of a document, ordered by batch index
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    /// Build a report, ordering outcomes by batch index
    pub fn new(mut outcomes: Vec<BatchOutcome>) -> Self {
        outcomes.sort_by_key(|outcome| outcome.index);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[BatchOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// Merge every batch, failing on the lowest-indexed failed batch
    ///
    /// Later batches override earlier ones on key collision.
    pub fn into_merged(self) -> Result<TranslationMap, TranslationError> {
        let mut merged = TranslationMap::new();
        for outcome in self.outcomes {
            match outcome.result {
                Ok(translations) => merged.extend(translations),
                Err(e) => return Err(TranslationError::batch(outcome.index, e)),
            }
        }
        Ok(merged)
    }

    /// Merge the successful batches and hand back the failures
    pub fn salvage(self) -> (TranslationMap, Vec<(usize, TranslationError)>) {
        let mut merged = TranslationMap::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome.result {
                Ok(translations) => merged.extend(translations),
                Err(e) => failures.push((outcome.index, e)),
            }
        }
        (merged, failures)
    }
}

/// Main translation service
pub struct TranslationService {
    /// The oracle answering translation requests
    oracle: Arc<dyn Oracle>,

    /// Retry budget per batch
    retry: RetryPolicy,

    /// Bound on a single oracle call
    timeout: Duration,

    /// Optional cap on batches in flight, unlimited when `None`
    max_concurrent_requests: Option<usize>,
}

impl TranslationService {
    /// Create a service with default retry, timeout and no concurrency cap
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            retry: RetryPolicy::default(),
            timeout: Duration::from_millis(600_000),
            max_concurrent_requests: None,
        }
    }

    /// Create a service talking to the provider selected in the configuration
    ///
    /// The configuration is expected to be validated already.
    pub fn from_config(config: &TranslationConfig) -> Self {
        let oracle = ProviderOracle::new(config);

        Self::new(Arc::new(oracle))
            .with_retry_policy(RetryPolicy::new(
                config.common.retry_count,
                Duration::from_millis(config.common.retry_backoff_ms),
            ))
            .with_timeout(Duration::from_millis(config.get_timeout_ms()))
            .with_concurrency_limit(config.get_concurrent_requests())
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_requests = limit;
        self
    }

    pub fn oracle(&self) -> &Arc<dyn Oracle> {
        &self.oracle
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Translate one batch, retrying with exponential backoff
    pub async fn translate_batch(
        &self,
        batch: &TranslationBatch,
        target_language: &str,
    ) -> Result<TranslationMap, TranslationError> {
        let payload = batch.to_payload()?;
        let mut retry = 0;

        loop {
            match self.attempt(&payload, target_language).await {
                Ok(translations) => {
                    report_key_mismatches(batch, &translations);
                    return Ok(translations);
                }
                Err(e) if retry < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        "Batch {} failed: {}. Retrying in {:?} ({}/{})",
                        batch.index,
                        e,
                        delay,
                        retry + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => {
                    error!(
                        "Batch {} failed after {} attempts: {}",
                        batch.index,
                        retry + 1,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Send every batch concurrently and collect the per-batch outcomes
    pub async fn translate_all(
        &self,
        batches: &[TranslationBatch],
        target_language: &str,
    ) -> BatchReport {
        let limit = self
            .max_concurrent_requests
            .unwrap_or(batches.len())
            .max(1);

        debug!(
            "Translating {} batches into {} via {} (up to {} in flight)",
            batches.len(),
            target_language,
            self.oracle.name(),
            limit
        );

        let outcomes: Vec<BatchOutcome> = stream::iter(batches)
            .map(|batch| async move {
                let result = self.translate_batch(batch, target_language).await;
                BatchOutcome {
                    index: batch.index,
                    keys: batch.keys(),
                    result,
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        BatchReport::new(outcomes)
    }

    /// Translate every batch, all or nothing
    pub async fn translate(
        &self,
        batches: &[TranslationBatch],
        target_language: &str,
    ) -> Result<TranslationMap, TranslationError> {
        self.translate_all(batches, target_language)
            .await
            .into_merged()
    }

    /// One oracle call, bounded by the timeout, with its answer validated
    async fn attempt(
        &self,
        payload: &str,
        target_language: &str,
    ) -> Result<TranslationMap, TranslationError> {
        let response = tokio::time::timeout(
            self.timeout,
            self.oracle.translate(payload, target_language),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout.as_millis() as u64))??;

        decode_response(&response)
    }
}

fn report_key_mismatches(batch: &TranslationBatch, translations: &TranslationMap) {
    for entry in &batch.entries {
        if !translations.contains_key(&entry.key) {
            warn!(
                "Batch {} response is missing key '{}'",
                batch.index, entry.key
            );
        }
    }

    for key in translations.keys() {
        if !batch.entries.iter().any(|entry| &entry.key == key) {
            debug!("Batch {} response has unexpected key '{}'", batch.index, key);
        }
    }
}

/// Translation provider implementation variants
enum TranslationProviderImpl {
    /// DeepSeek API (OpenAI-compatible)
    DeepSeek {
        /// Client instance
        client: OpenAI,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio {
        /// Client instance (OpenAI-compatible)
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },

    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },
}

/// Oracle backed by one of the configured LLM providers
pub struct ProviderOracle {
    provider: TranslationProviderImpl,
    provider_type: ConfigTranslationProvider,
    model: String,
    temperature: f32,
    system_prompt: PromptTemplate,
}

impl ProviderOracle {
    /// Build the client for the active provider
    pub fn new(config: &TranslationConfig) -> Self {
        let endpoint = config.get_endpoint();
        let timeout_ms = config.get_timeout_ms();

        let provider = match config.provider {
            ConfigTranslationProvider::DeepSeek => TranslationProviderImpl::DeepSeek {
                client: OpenAI::new(config.get_api_key(), endpoint, timeout_ms),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), endpoint, timeout_ms),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::new(api_key, endpoint, timeout_ms),
                }
            }
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), endpoint, timeout_ms),
            },
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::from_url(endpoint, timeout_ms),
            },
        };

        Self {
            provider,
            provider_type: config.provider,
            model: config.get_model(),
            temperature: config.common.temperature,
            system_prompt: PromptTemplate::default(),
        }
    }

    /// Get the maximum number of tokens for a given model
    fn max_tokens_for_model(&self) -> u32 {
        match self.model.as_str() {
            "deepseek-chat" => 8192,
            "gpt-4o" | "gpt-4o-mini" => 16384,
            "gpt-4" | "gpt-4-0613" => 8192,
            m if m.starts_with("claude-3-5") => 8192,
            m if m.starts_with("claude") => 4096,
            // Default for unknown models
            _ => 4096,
        }
    }
}

impl fmt::Debug for ProviderOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderOracle")
            .field("provider", &self.provider_type)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Oracle for ProviderOracle {
    async fn translate(
        &self,
        payload: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let system_prompt = self.system_prompt.render(target_language);
        let user_prompt = PromptTemplate::user_prompt(payload, target_language);

        match &self.provider {
            TranslationProviderImpl::DeepSeek { client }
            | TranslationProviderImpl::OpenAI { client }
            | TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(&self.model)
                    .add_message("system", system_prompt)
                    .add_message("assistant", PromptTemplate::ASSISTANT_EXAMPLE)
                    .add_message("user", user_prompt)
                    .temperature(self.temperature)
                    .max_tokens(self.max_tokens_for_model());

                let response = client.complete(request).await?;
                OpenAI::extract_text(&response)
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(&self.model, self.max_tokens_for_model())
                    .system(format!(
                        "{}\n\n{}",
                        system_prompt,
                        PromptTemplate::ASSISTANT_EXAMPLE
                    ))
                    .add_message("user", user_prompt)
                    .temperature(self.temperature);

                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
            TranslationProviderImpl::Ollama { client } => {
                let request = ChatRequest::new(&self.model)
                    .add_message("system", system_prompt)
                    .add_message("assistant", PromptTemplate::ASSISTANT_EXAMPLE)
                    .add_message("user", user_prompt)
                    .temperature(self.temperature)
                    .format("json");

                let response = client.chat(request).await?;
                Ok(response.message.content)
            }
        }
    }

    fn name(&self) -> &str {
        self.provider_type.display_name()
    }
}

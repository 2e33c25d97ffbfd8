/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI-compatible chat completions (OpenAI, DeepSeek, LM Studio)
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: scripted oracle used by the test suite
 */

use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// The translation oracle
///
/// Receives a flat JSON object of `key -> source text` and answers with raw
/// text that should hold the same object with translated values. Nothing about
/// the answer is trusted: callers sanitize and validate it.
#[async_trait]
pub trait Oracle: Send + Sync + Debug {
    /// Translate the values of a JSON payload into the target language
    ///
    /// # Arguments
    /// * `payload` - Flat JSON object whose values are to be translated
    /// * `target_language` - Language tag such as `en-US`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw response text or an error
    async fn translate(&self, payload: &str, target_language: &str)
    -> Result<String, ProviderError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Map a transport-level reqwest failure onto a provider error
pub(crate) fn map_request_error(error: reqwest::Error, timeout_ms: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_ms)
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status onto a provider error
pub(crate) fn map_status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

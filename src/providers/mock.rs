/*!
 * Mock oracle for testing.
 *
 * `MockProvider` answers translation payloads according to a scripted
 * behavior so the retry, validation and merge logic can be exercised without
 * a network:
 * - `MockProvider::echo()` - Returns the payload unchanged
 * - `MockProvider::tagged()` - Prefixes every value with the target language
 * - `MockProvider::fail_first(n)` - Fails `n` times, then tags
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::errors::ProviderError;
use crate::providers::Oracle;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Returns the payload unchanged
    Echo,
    /// Prefixes every value with `[<lang>] `
    Tagged,
    /// Fails the first `failures` requests, then behaves like `Tagged`
    FailFirst { failures: usize },
    /// Always fails with an error
    Failing,
    /// Fails any request whose payload contains `needle`, tags the rest
    FailMatching { needle: String },
    /// Wraps a tagged answer in a markdown code fence
    Fenced,
    /// Answers with prose instead of JSON
    Malformed,
    /// Tags the values but leaves `key` out of the answer
    DropKey { key: String },
    /// Sleeps before echoing (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock oracle for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// When each request arrived
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn tagged() -> Self {
        Self::new(MockBehavior::Tagged)
    }

    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_matching(needle: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailMatching {
            needle: needle.into(),
        })
    }

    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    pub fn drop_key(key: impl Into<String>) -> Self {
        Self::new(MockBehavior::DropKey { key: key.into() })
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Arrival time of every request, in arrival order
    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// The tag prepended by the `Tagged` behavior
    pub fn tag_value(value: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, value)
    }

    fn tag_payload(
        payload: &str,
        target_language: &str,
        skip_key: Option<&str>,
    ) -> Result<String, ProviderError> {
        let object: Map<String, Value> = serde_json::from_str(payload)
            .map_err(|e| ProviderError::ParseError(format!("Mock received invalid payload: {}", e)))?;

        let tagged: Map<String, Value> = object
            .into_iter()
            .filter(|(key, _)| Some(key.as_str()) != skip_key)
            .map(|(key, value)| {
                let text = value.as_str().unwrap_or_default();
                (key, Value::String(Self::tag_value(text, target_language)))
            })
            .collect();

        serde_json::to_string(&tagged).map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Oracle for MockProvider {
    async fn translate(
        &self,
        payload: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Instant::now());
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(payload.to_string()),

            MockBehavior::Tagged => Self::tag_payload(payload, target_language, None),

            MockBehavior::FailFirst { failures } => {
                if count < *failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated failure (request #{})",
                        count + 1
                    )))
                } else {
                    Self::tag_payload(payload, target_language, None)
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailMatching { needle } => {
                if payload.contains(needle.as_str()) {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated failure for payload containing {}", needle),
                        status_code: 503,
                    })
                } else {
                    Self::tag_payload(payload, target_language, None)
                }
            }

            MockBehavior::Fenced => {
                let body = Self::tag_payload(payload, target_language, None)?;
                Ok(format!("```json\n{}\n```\n", body))
            }

            MockBehavior::Malformed => {
                Ok("Sure! Here is your translation: hello world".to_string())
            }

            MockBehavior::DropKey { key } => {
                Self::tag_payload(payload, target_language, Some(key.as_str()))
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(payload.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

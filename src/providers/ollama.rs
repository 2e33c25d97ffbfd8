use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use super::{map_request_error, map_status_error};

/// Ollama client for interacting with Ollama API
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Request timeout in milliseconds
    timeout_ms: u64,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: None,
            format: None,
            stream: false,
        }
    }

    /// Add a message to the conversation
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }

    /// Set the format (`json` asks the server for a JSON answer)
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL such as `http://localhost:11434`
    pub fn from_url(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                // Ollama uses HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            timeout_ms,
        }
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(map_status_error(status, error_text));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| map_request_error(e, self.timeout_ms))?;

        parse_chat_response(&response_text)
    }
}

/// Parse a chat answer, accepting a streamed (JSON lines) body as well
fn parse_chat_response(response_text: &str) -> Result<ChatResponse, ProviderError> {
    let single_error = match serde_json::from_str::<ChatResponse>(response_text) {
        Ok(chat_response) => return Ok(chat_response),
        Err(e) => e,
    };

    // Some server versions stream even when asked not to
    let chunks: Vec<ChatResponse> = response_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<ChatResponse>(line).ok())
        .collect();

    if chunks.is_empty() {
        error!(
            "Failed to parse Ollama API chat response: {}. Raw response (first 500 chars): {}",
            single_error,
            response_text.chars().take(500).collect::<String>()
        );
        return Err(ProviderError::ParseError(single_error.to_string()));
    }

    let content: String = chunks
        .iter()
        .map(|chunk| chunk.message.content.as_str())
        .collect();
    let model = chunks
        .last()
        .map(|chunk| chunk.model.clone())
        .unwrap_or_default();

    Ok(ChatResponse {
        model,
        message: ChatMessage {
            role: "assistant".to_string(),
            content,
        },
        done: true,
    })
}

/*!
 * Error types for the yaltwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete in time
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised by the extract, translate and reinject pipeline
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The document (or an oracle response) is not valid JSON / valid source syntax
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid batch size or provider configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The oracle response is not a bare JSON object
    #[error("Invalid response format: {0}")]
    Format(String),

    /// Network or timeout failure while calling the oracle
    #[error("Transport error: {0}")]
    Transport(#[from] ProviderError),

    /// A key expected during reinjection is absent from the merged translations
    #[error("Missing translation for key '{0}'")]
    MissingTranslation(String),

    /// Two properties derive the same key and the collision policy forbids it
    #[error("Duplicate key '{0}' in document")]
    DuplicateKey(String),

    /// A batch exhausted its retry budget
    #[error("Batch {index} failed: {source}")]
    Batch {
        /// Zero-based batch index
        index: usize,
        /// Last error observed for the batch
        #[source]
        source: Box<TranslationError>,
    },
}

impl TranslationError {
    /// Wrap an error as the failure of a given batch
    pub fn batch(index: usize, source: TranslationError) -> Self {
        Self::Batch {
            index,
            source: Box::new(source),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<TranslationError>() {
            Ok(translation_error) => Self::Translation(translation_error),
            Err(error) => Self::Unknown(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

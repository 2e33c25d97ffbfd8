/*!
 * Tests for error types and conversions
 */

use std::error::Error;
use yaltwai::errors::{AppError, ProviderError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Service unavailable".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("Service unavailable"));
}

#[test]
fn test_providerError_timeout_shouldDisplayDuration() {
    let display = ProviderError::Timeout(250).to_string();
    assert!(display.contains("250 ms"));
}

#[test]
fn test_translationError_fromProviderError_shouldWrapAsTransport() {
    let error: TranslationError = ProviderError::ConnectionError("refused".to_string()).into();
    assert!(matches!(error, TranslationError::Transport(ProviderError::ConnectionError(_))));
    assert!(error.to_string().contains("refused"));
}

#[test]
fn test_translationError_batch_shouldKeepIndexAndSource() {
    let error = TranslationError::batch(3, TranslationError::Format("prose".to_string()));

    assert!(error.to_string().starts_with("Batch 3 failed"));
    let source = error.source().expect("batch error should expose its cause");
    assert!(source.to_string().contains("prose"));
}

#[test]
fn test_translationError_missingTranslation_shouldNameKey() {
    let error = TranslationError::MissingTranslation("greeting".to_string());
    assert!(error.to_string().contains("'greeting'"));
}

#[test]
fn test_appError_fromAnyhowTranslationError_shouldDowncast() {
    let error = anyhow::Error::new(TranslationError::Parse("line 1".to_string()));
    let app_error: AppError = error.into();
    assert!(matches!(app_error, AppError::Translation(TranslationError::Parse(_))));
}

#[test]
fn test_appError_fromOtherAnyhow_shouldBeUnknown() {
    let app_error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(app_error, AppError::Unknown(message) if message == "something odd"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}

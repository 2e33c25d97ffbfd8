/*!
 * Tests for translation service functionality
 */

use std::sync::Arc;
use std::time::Duration;
use yaltwai::errors::{ProviderError, TranslationError};
use yaltwai::providers::mock::MockProvider;
use yaltwai::structure::KeyValueEntry;
use yaltwai::translation::{split_entries, RetryPolicy, TranslationBatch, TranslationService};
use crate::common;

fn batches(count: usize, max_size: usize) -> Vec<TranslationBatch> {
    let entries: Vec<KeyValueEntry> = (0..count)
        .map(|i| KeyValueEntry::new(format!("key_{}", i), format!("Value {}", i)))
        .collect();
    split_entries(&entries, max_size).unwrap()
}

fn batch_source(error: &TranslationError) -> &TranslationError {
    match error {
        TranslationError::Batch { source, .. } => source,
        other => panic!("expected a batch error, got {}", other),
    }
}

/// Test the defaults of a freshly created service
#[test]
fn test_translationService_new_shouldUseDefaults() {
    let service = TranslationService::new(Arc::new(MockProvider::echo()));

    assert_eq!(service.retry_policy(), RetryPolicy::new(3, Duration::from_millis(1000)));
    assert_eq!(service.timeout(), Duration::from_millis(600_000));
    assert_eq!(service.oracle().name(), "mock");
}

/// Every value comes back translated and keyed as requested
#[tokio::test]
async fn test_translate_withTaggedOracle_shouldMergeAllBatches() {
    let mock = MockProvider::tagged();
    let service = common::mock_service(&mock, 0, 1);

    let merged = service.translate(&batches(7, 3), "fr-FR").await.unwrap();

    assert_eq!(merged.len(), 7);
    assert_eq!(merged["key_0"], "[fr-FR] Value 0");
    assert_eq!(merged["key_6"], "[fr-FR] Value 6");
    assert_eq!(mock.request_count(), 3);
}

/// Two failures then success: three calls spaced by the doubling backoff
#[tokio::test]
async fn test_translateBatch_withTransientFailures_shouldRetryWithBackoff() {
    let mock = MockProvider::fail_first(2);
    let service = common::mock_service(&mock, 3, 20);
    let all = batches(2, 10);

    let result = service.translate_batch(&all[0], "de-DE").await;

    assert!(result.is_ok());
    assert_eq!(mock.request_count(), 3);
    let calls = mock.call_instants();
    assert!(calls[1].duration_since(calls[0]) >= Duration::from_millis(20));
    assert!(calls[2].duration_since(calls[1]) >= Duration::from_millis(40));
}

/// A batch that never succeeds uses exactly 1 + max_retries attempts
#[tokio::test]
async fn test_translate_withPermanentFailure_shouldExhaustRetryBudget() {
    let mock = MockProvider::failing();
    let service = common::mock_service(&mock, 2, 1);

    let error = service.translate(&batches(1, 10), "it-IT").await.unwrap_err();

    assert_eq!(mock.request_count(), 3);
    assert!(matches!(error, TranslationError::Batch { index: 0, .. }));
    assert!(matches!(
        batch_source(&error),
        TranslationError::Transport(ProviderError::ApiError { status_code: 500, .. })
    ));
}

/// One failing batch fails the whole translation even when others succeed
#[tokio::test]
async fn test_translate_withOneFailingBatch_shouldFailAllOrNothing() {
    let mock = MockProvider::fail_matching("\"key_7\"");
    let service = common::mock_service(&mock, 1, 1);

    let error = service.translate(&batches(10, 5), "es-ES").await.unwrap_err();

    assert!(matches!(error, TranslationError::Batch { index: 1, .. }));
}

/// The report keeps the successful batches for the salvage policy
#[tokio::test]
async fn test_translateAll_withOneFailingBatch_shouldReportPerBatch() {
    let mock = MockProvider::fail_matching("\"key_7\"");
    let service = common::mock_service(&mock, 0, 1);

    let report = service.translate_all(&batches(10, 5), "es-ES").await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(report.outcomes()[0].is_success());
    assert_eq!(report.outcomes()[1].keys.len(), 5);

    let (merged, failures) = report.salvage();
    assert_eq!(merged.len(), 5);
    assert!(merged.contains_key("key_4"));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 1);
}

/// Fenced answers are accepted after sanitization
#[tokio::test]
async fn test_translate_withFencedAnswer_shouldSucceed() {
    let mock = MockProvider::fenced();
    let service = common::mock_service(&mock, 0, 1);

    let merged = service.translate(&batches(2, 10), "ja-JP").await.unwrap();

    assert_eq!(merged["key_1"], "[ja-JP] Value 1");
}

/// Prose answers consume the retry budget and end as a format error
#[tokio::test]
async fn test_translate_withMalformedAnswer_shouldFailWithFormatError() {
    let mock = MockProvider::malformed();
    let service = common::mock_service(&mock, 1, 1);

    let error = service.translate(&batches(2, 10), "ja-JP").await.unwrap_err();

    assert_eq!(mock.request_count(), 2);
    assert!(matches!(batch_source(&error), TranslationError::Format(_)));
}

/// A slow oracle is cut off by the per-call timeout
#[tokio::test]
async fn test_translate_withSlowOracle_shouldTimeOut() {
    let mock = MockProvider::slow(500);
    let service = common::mock_service(&mock, 0, 1).with_timeout(Duration::from_millis(20));

    let error = service.translate(&batches(1, 10), "ko-KR").await.unwrap_err();

    assert!(matches!(
        batch_source(&error),
        TranslationError::Transport(ProviderError::Timeout(20))
    ));
}

/// Missing keys in an answer are not an error at this stage
#[tokio::test]
async fn test_translate_withDroppedKey_shouldReturnPartialMap() {
    let mock = MockProvider::drop_key("key_1");
    let service = common::mock_service(&mock, 0, 1);

    let merged = service.translate(&batches(3, 10), "nl-NL").await.unwrap();

    assert_eq!(merged.len(), 2);
    assert!(!merged.contains_key("key_1"));
}

/// Without a cap every batch is sent at once
#[tokio::test]
async fn test_translateAll_withoutCap_shouldSendBatchesConcurrently() {
    let mock = MockProvider::slow(100);
    let service = common::mock_service(&mock, 0, 1);

    let report = service.translate_all(&batches(3, 1), "sv-SE").await;

    assert_eq!(report.failed_count(), 0);
    let calls = mock.call_instants();
    assert_eq!(calls.len(), 3);
    assert!(calls[2].duration_since(calls[0]) < Duration::from_millis(100));
}

/// A cap of one serializes the oracle calls
#[tokio::test]
async fn test_translateAll_withCapOfOne_shouldSendOneBatchAtATime() {
    let mock = MockProvider::slow(30);
    let service = common::mock_service(&mock, 0, 1).with_concurrency_limit(Some(1));

    let report = service.translate_all(&batches(3, 1), "sv-SE").await;

    assert_eq!(report.failed_count(), 0);
    let calls = mock.call_instants();
    assert!(calls[1].duration_since(calls[0]) >= Duration::from_millis(30));
    assert!(calls[2].duration_since(calls[1]) >= Duration::from_millis(30));
}

/*!
 * Integration tests for controller setup and run reports
 */

use anyhow::Result;
use yaltwai::app_config::{Config, TranslationProvider};
use yaltwai::app_controller::{Controller, ProcessStatus};
use yaltwai::errors::{AppError, TranslationError};
use yaltwai::providers::mock::MockProvider;
use crate::common;

/// Hosted providers need a key before a controller can be built
#[test]
fn test_controller_withDefaultConfig_shouldRequireApiKey() {
    let Err(error) = Controller::with_config(Config::default()) else {
        panic!("a hosted provider without a key must be rejected");
    };

    let app_error: AppError = error.into();
    assert!(matches!(app_error, AppError::Translation(TranslationError::Config(_))));
}

/// A key from any source is enough
#[test]
fn test_controller_withApiKey_shouldInitialize() -> Result<()> {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();

    let controller = Controller::with_config(config)?;

    assert_eq!(controller.config().translation.provider, TranslationProvider::DeepSeek);
    Ok(())
}

/// Local providers need no key
#[test]
fn test_controller_withOllama_shouldInitializeWithoutKey() -> Result<()> {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    Controller::with_config(config)?;
    Ok(())
}

/// A missing input directory is a run-level error and creates nothing
#[tokio::test]
async fn test_run_withMissingDirectory_shouldReportError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("locales");

    let controller = common::mock_controller(common::test_config(), &MockProvider::tagged());
    let report = controller.run(&missing).await;

    assert_eq!(report.status, ProcessStatus::Error);
    assert!(report.error.is_some());
    assert!(report.files.is_empty());
    assert!(!missing.exists());
    assert_eq!(
        report.message(),
        format!("Failed to translate {} to {}", missing.display(), missing.join("dist").display())
    );
    Ok(())
}

/// An empty directory is a successful run with nothing to do
#[test]
fn test_run_withEmptyDirectory_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::tagged());
    let report = tokio_test::block_on(controller.run(temp_dir.path()));

    assert!(report.is_success());
    assert!(report.files.is_empty());
    assert!(temp_dir.path().join("dist").is_dir());
    Ok(())
}

/// The JSON envelope carries message, success flag and per-file lines
#[tokio::test]
async fn test_runReport_toJson_shouldDescribeEveryFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_test_file(&dir, "en-US.ts", "export default { a: 'A' }\n")?;
    common::create_test_file(&dir, "notes.txt", "plain text")?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::tagged());
    let report = controller.run(&dir).await;
    let envelope = report.to_json();

    assert_eq!(envelope["success"], true);
    assert_eq!(
        envelope["message"],
        format!("Successfully translated {} to {}", dir.display(), dir.join("dist").display())
    );

    let files = envelope["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["status"], "translated");
    assert_eq!(files[0]["entries"], 1);
    assert!(files[0]["backup"].is_null());
    assert_eq!(files[1]["status"], "skipped");
    assert_eq!(files[1]["reason"], "unsupported_extension");
    Ok(())
}

/// Documents can be translated in memory without touching the disk
#[tokio::test]
async fn test_translateDocument_shouldReturnRegeneratedText() -> Result<()> {
    use yaltwai::document::{CodeDialect, DocumentKind, SourceDocument};

    let document = SourceDocument::new(
        "inline.pt-BR.ts",
        "export default { hi: 'Hi' }\n",
        DocumentKind::StructuredCode(CodeDialect::TypeScript),
        "pt-BR",
    );
    let controller = common::mock_controller(common::test_config(), &MockProvider::tagged());

    let translated = controller.translate_document(&document).await?.expect("one entry");

    assert_eq!(translated.entries, 1);
    assert_eq!(translated.content, "export default { hi: \"[pt-BR] Hi\" }\n");
    Ok(())
}

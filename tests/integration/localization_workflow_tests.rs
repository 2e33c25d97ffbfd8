/*!
 * End-to-end tests for locale file runs through a mock oracle
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use yaltwai::app_config::{BatchFailurePolicy, MissingTranslationPolicy};
use yaltwai::app_controller::{FileOutcome, RunReport};
use yaltwai::document::SkipReason;
use yaltwai::providers::mock::MockProvider;
use crate::common;

fn outcome_for<'a>(report: &'a RunReport, file_name: &str) -> &'a FileOutcome {
    report
        .files
        .iter()
        .find(|f| f.input.file_name().map(|n| n == file_name).unwrap_or(false))
        .map(|f| &f.outcome)
        .unwrap_or_else(|| panic!("{} missing from report", file_name))
}

fn dist(dir: &Path) -> PathBuf {
    dir.join("dist")
}

/// Every tagged locale file in a directory is translated into dist/
#[tokio::test]
async fn test_run_withLocaleDirectory_shouldTranslateTaggedFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_test_file(&dir, "en-US.ts", common::EN_US_MODULE)?;
    common::create_test_file(&dir, "en-US.variable.ts", common::EN_US_VARIABLE_MODULE)?;
    common::create_test_file(&dir, "fr-FR.json", common::FR_FR_JSON)?;
    common::create_test_file(&dir, "readme.md", "# Locales\n")?;
    common::create_test_file(&dir, "index.ts", "export const a = { b: 'c' }\n")?;

    let mock = MockProvider::tagged();
    let controller = common::mock_controller(common::test_config(), &mock);
    let report = controller.run(&dir).await;

    assert!(report.is_success());
    assert_eq!(report.files.len(), 5);
    assert_eq!(report.translated_count(), 3);
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(
        outcome_for(&report, "readme.md"),
        &FileOutcome::Skipped { reason: SkipReason::UnsupportedExtension }
    );
    assert_eq!(
        outcome_for(&report, "index.ts"),
        &FileOutcome::Skipped { reason: SkipReason::NoLanguageTag }
    );

    let variable = fs::read_to_string(dist(&dir).join("en-US.variable.ts"))?;
    assert!(variable.contains(r#"__前: "[en-US] {time} ago","#));
    assert!(variable.contains("'已绑定SSH密钥：__（非当前项目）':\n    \"[en-US] Bound SSH Key: {name} (not from current project)\","));
    assert!(variable.contains("\n\nexport default enUSVariable\n"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(dist(&dir).join("fr-FR.json"))?)?;
    assert_eq!(json["title"], "[fr-FR] Settings");
    assert_eq!(json["count"], 3);

    assert!(!dist(&dir).join("readme.md").exists());
    assert!(!dist(&dir).join("index.ts").exists());
    Ok(())
}

/// A single file lands next to it under dist/
#[tokio::test]
async fn test_run_withSingleFile_shouldWriteSiblingDist() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "messages.en-US.ts",
        "const messages = { greeting: 'Hello' }\n\nexport default messages\n",
    )?;

    let mock = MockProvider::tagged();
    let controller = common::mock_controller(common::test_config(), &mock);
    let report = controller.run(&input).await;

    let output = dist(temp_dir.path()).join("messages.en-US.ts");
    assert!(report.is_success());
    assert_eq!(report.output, output);
    assert_eq!(
        outcome_for(&report, "messages.en-US.ts"),
        &FileOutcome::Translated { output: output.clone(), entries: 1, backup: None }
    );
    assert_eq!(
        fs::read_to_string(&output)?,
        "const messages = { greeting: \"[en-US] Hello\" }\n\nexport default messages\n"
    );
    assert_eq!(mock.request_count(), 1);
    Ok(())
}

/// An identity oracle gives back a structurally equal JSON document
#[tokio::test]
async fn test_run_withEchoOracle_shouldRoundTripJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(&temp_dir.path().to_path_buf(), "zh-HK.json", common::FR_FR_JSON)?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::echo());
    let report = controller.run(&input).await;

    assert_eq!(report.translated_count(), 1);
    let original: serde_json::Value = serde_json::from_str(common::FR_FR_JSON)?;
    let regenerated: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dist(temp_dir.path()).join("zh-HK.json"))?)?;
    assert_eq!(original, regenerated);
    Ok(())
}

/// Number literals come back exactly as written
#[tokio::test]
async fn test_run_withEchoOracle_shouldKeepNumberLiteralsVerbatim() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "de-DE.json",
        r#"{"title": "Title", "big": 12345678901234567890123, "dec": 0.10000000000000000001, "e": 1e2}"#,
    )?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::echo());
    let report = controller.run(&input).await;

    assert_eq!(report.translated_count(), 1);
    let output = fs::read_to_string(dist(temp_dir.path()).join("de-DE.json"))?;
    assert!(output.contains("\"big\": 12345678901234567890123"), "{}", output);
    assert!(output.contains("\"dec\": 0.10000000000000000001"), "{}", output);
    assert!(output.contains("\"e\": 1e2"), "{}", output);
    Ok(())
}

/// An identity oracle leaves code text unchanged apart from quote normalization
#[tokio::test]
async fn test_run_withEchoOracle_shouldKeepCodeStructure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "zh-CN.ts",
        "export default {\n  // keep me\n  a: \"A\",\n  nested: { b: \"B\" },\n  n: 1,\n}\n",
    )?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::echo());
    controller.run(&input).await;

    assert_eq!(
        fs::read_to_string(dist(temp_dir.path()).join("zh-CN.ts"))?,
        "export default {\n  // keep me\n  a: \"A\",\n  nested: { b: \"B\" },\n  n: 1,\n}\n"
    );
    Ok(())
}

/// A file that does not parse fails alone
#[tokio::test]
async fn test_run_withBrokenFile_shouldNotAbortSiblings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_test_file(&dir, "broken.en-US.ts", "const a = { b: 'c' \n")?;
    common::create_test_file(&dir, "good.fr-FR.ts", "export default { b: 'c' }\n")?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::tagged());
    let report = controller.run(&dir).await;

    assert!(report.is_success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.translated_count(), 1);
    match outcome_for(&report, "broken.en-US.ts") {
        FileOutcome::Failed { error } => assert!(error.contains("Parse error"), "{}", error),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!dist(&dir).join("broken.en-US.ts").exists());
    assert!(dist(&dir).join("good.fr-FR.ts").exists());
    Ok(())
}

/// Documents without string properties produce no output
#[tokio::test]
async fn test_run_withoutStrings_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "de-DE.ts",
        "export default { count: 1, list: [] }\n",
    )?;

    let mock = MockProvider::tagged();
    let controller = common::mock_controller(common::test_config(), &mock);
    let report = controller.run(&input).await;

    assert_eq!(outcome_for(&report, "de-DE.ts"), &FileOutcome::NoEntries);
    assert!(!dist(temp_dir.path()).join("de-DE.ts").exists());
    assert_eq!(mock.request_count(), 0);
    Ok(())
}

/// A second run keeps the first output under a backup name
#[tokio::test]
async fn test_run_twice_shouldBackUpPreviousOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "en-US.ts",
        "export default { a: 'A' }\n",
    )?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::tagged());
    let first = controller.run(&input).await;
    let second = controller.run(&input).await;

    assert!(matches!(outcome_for(&first, "en-US.ts"), FileOutcome::Translated { backup: None, .. }));
    let backup = match outcome_for(&second, "en-US.ts") {
        FileOutcome::Translated { backup: Some(backup), .. } => backup.clone(),
        other => panic!("expected a backup, got {:?}", other),
    };
    assert_eq!(backup.parent(), Some(dist(temp_dir.path()).as_path()));
    assert_eq!(fs::read_to_string(&backup)?, "export default { a: \"[en-US] A\" }\n");
    Ok(())
}

/// Backups can be switched off
#[tokio::test]
async fn test_run_withBackupsDisabled_shouldOverwriteInPlace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(&temp_dir.path().to_path_buf(), "en-US.ts", "export default { a: 'A' }\n")?;
    let mut config = common::test_config();
    config.pipeline.backup_existing = false;

    let controller = common::mock_controller(config, &MockProvider::tagged());
    controller.run(&input).await;
    controller.run(&input).await;

    assert_eq!(fs::read_dir(dist(temp_dir.path()))?.count(), 1);
    Ok(())
}

/// One failing batch means no output for the file
#[tokio::test]
async fn test_run_withFailingBatch_shouldWriteNothingForFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "es-ES.ts",
        "export default { a: 'A', b: 'B', c: 'C', poison: 'P' }\n",
    )?;
    let mut config = common::test_config();
    config.pipeline.code_batch_size = 2;

    let mock = MockProvider::fail_matching("poison");
    let controller = common::mock_controller(config, &mock);
    let report = controller.run(&input).await;

    assert!(report.is_success());
    match outcome_for(&report, "es-ES.ts") {
        FileOutcome::Failed { error } => assert!(error.contains("Batch 1 failed"), "{}", error),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!dist(temp_dir.path()).join("es-ES.ts").exists());
    // Two batches: the good one once, the failing one twice (one retry)
    assert_eq!(mock.request_count(), 3);
    Ok(())
}

/// Salvage keeps what succeeded and leaves the rest untranslated
#[tokio::test]
async fn test_run_withSalvagePolicy_shouldKeepSuccessfulBatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "es-ES.ts",
        "export default { a: 'A', b: 'B', c: 'C', poison: 'P' }\n",
    )?;
    let mut config = common::test_config();
    config.pipeline.code_batch_size = 2;
    config.pipeline.missing_translation = MissingTranslationPolicy::KeepOriginal;
    config.translation.common.batch_failure = BatchFailurePolicy::Salvage;

    let controller = common::mock_controller(config, &MockProvider::fail_matching("poison"));
    let report = controller.run(&input).await;

    assert_eq!(report.translated_count(), 1);
    assert_eq!(
        fs::read_to_string(dist(temp_dir.path()).join("es-ES.ts"))?,
        "export default { a: \"[es-ES] A\", b: \"[es-ES] B\", c: 'C', poison: 'P' }\n"
    );
    Ok(())
}

/// A key the oracle forgot fails the file under the default policy
#[tokio::test]
async fn test_run_withDroppedKey_shouldFailUnderDefaultPolicy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "it-IT.json",
        r#"{"a": "A", "b": "B"}"#,
    )?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::drop_key("b"));
    let report = controller.run(&input).await;

    match outcome_for(&report, "it-IT.json") {
        FileOutcome::Failed { error } => assert!(error.contains("'b'"), "{}", error),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!dist(temp_dir.path()).join("it-IT.json").exists());
    Ok(())
}

/// The same forgotten key is kept as-is when the policy allows it
#[tokio::test]
async fn test_run_withDroppedKeyAndKeepOriginal_shouldWriteOriginalValue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "it-IT.json",
        r#"{"a": "A", "b": "B"}"#,
    )?;
    let mut config = common::test_config();
    config.pipeline.missing_translation = MissingTranslationPolicy::KeepOriginal;

    let controller = common::mock_controller(config, &MockProvider::drop_key("b"));
    controller.run(&input).await;

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dist(temp_dir.path()).join("it-IT.json"))?)?;
    assert_eq!(json["a"], "[it-IT] A");
    assert_eq!(json["b"], "B");
    Ok(())
}

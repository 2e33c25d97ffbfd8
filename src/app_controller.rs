use anyhow::{anyhow, Result};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::{BatchFailurePolicy, Config};
use crate::document::{self, Classification, SkipReason, SourceDocument};
use crate::errors::TranslationError;
use crate::file_utils::{FileManager, PathPlan};
use crate::structure;
use crate::translation::{split_entries, TranslationService};

// @module: Application controller for localization runs

/// Two-valued outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Success,
    Error,
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Output written
    Translated {
        output: PathBuf,
        entries: usize,
        backup: Option<PathBuf>,
    },
    /// Not a candidate (extension or file name)
    Skipped { reason: SkipReason },
    /// Candidate without any string-literal property; nothing written
    NoEntries,
    /// Parsing, translation or writing failed; nothing written
    Failed { error: String },
}

/// Per-file line of a run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Result of a run over a file or a directory
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: ProcessStatus,
    pub input: PathBuf,
    pub output: PathBuf,
    pub files: Vec<FileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    fn completed(plan: &PathPlan, files: Vec<FileReport>) -> Self {
        Self {
            status: ProcessStatus::Success,
            input: plan.input.clone(),
            output: plan.output.clone(),
            files,
            error: None,
        }
    }

    fn aborted(plan: &PathPlan, error: String) -> Self {
        Self {
            status: ProcessStatus::Error,
            input: plan.input.clone(),
            output: plan.output.clone(),
            files: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ProcessStatus::Success
    }

    /// Human-readable one-line summary
    pub fn message(&self) -> String {
        match self.status {
            ProcessStatus::Success => format!(
                "Successfully translated {} to {}",
                self.input.display(),
                self.output.display()
            ),
            ProcessStatus::Error => format!(
                "Failed to translate {} to {}",
                self.input.display(),
                self.output.display()
            ),
        }
    }

    /// The `{message, success, files}` envelope printed by `--json`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message(),
            "success": self.is_success(),
            "files": self.files,
        })
    }

    pub fn translated_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Translated { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. } | FileOutcome::NoEntries))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

/// Regenerated text of a translated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedDocument {
    pub content: String,
    /// Number of extracted entries
    pub entries: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared translation service
    service: TranslationService,
}

impl Controller {
    // @method: Create a controller talking to the configured provider
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let service = TranslationService::from_config(&config.translation);
        Ok(Self { config, service })
    }

    // @method: Create a controller around an existing service (any oracle)
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline on a file or a directory
    ///
    /// A failing file never aborts its siblings; the run status is `Error`
    /// only when the input or output location itself is unusable.
    pub async fn run(&self, input: &Path) -> RunReport {
        let start_time = Instant::now();
        let plan = FileManager::resolve_paths(input, &self.config.pipeline.output_dir_name);

        info!(
            "yaltwai: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        match self.run_plan(&plan).await {
            Ok(files) => {
                let report = RunReport::completed(&plan, files);
                info!(
                    "Processing completed in {}: {} translated, {} skipped, {} errors",
                    Self::format_duration(start_time.elapsed()),
                    report.translated_count(),
                    report.skipped_count(),
                    report.failed_count()
                );
                report
            }
            Err(e) => {
                error!("Run failed for {:?}: {:#}", plan.input, e);
                RunReport::aborted(&plan, format!("{:#}", e))
            }
        }
    }

    async fn run_plan(&self, plan: &PathPlan) -> Result<Vec<FileReport>> {
        if !plan.is_file && !FileManager::dir_exists(&plan.input) {
            return Err(anyhow!("Input path does not exist: {:?}", plan.input));
        }

        FileManager::ensure_dir(plan.output_dir())?;

        let jobs: Vec<(PathBuf, PathBuf)> = if plan.is_file {
            vec![(plan.input.clone(), plan.output.clone())]
        } else {
            FileManager::list_files(&plan.input)?
                .into_iter()
                .filter_map(|path| {
                    let output = plan.output.join(path.file_name()?);
                    Some((path, output))
                })
                .collect()
        };

        let progress_bar = self.progress_bar(jobs.len());
        progress_bar.set_message("Translating");

        let reports = join_all(jobs.iter().map(|(input, output)| {
            let progress_bar = progress_bar.clone();
            async move {
                let report = self.process_file(input, output).await;
                progress_bar.inc(1);
                report
            }
        }))
        .await;

        progress_bar.finish_and_clear();
        Ok(reports)
    }

    /// Classify, translate and write one file
    pub async fn process_file(&self, input: &Path, output: &Path) -> FileReport {
        let outcome = match document::classify(input) {
            Err(reason) => {
                debug!("Skipping {:?}: {}", input, reason);
                FileOutcome::Skipped { reason }
            }
            Ok(classification) => match self.translate_file(input, output, classification).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("File {:?} processing failed: {:#}", input, e);
                    FileOutcome::Failed {
                        error: format!("{:#}", e),
                    }
                }
            },
        };

        FileReport {
            input: input.to_path_buf(),
            outcome,
        }
    }

    async fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        classification: Classification,
    ) -> Result<FileOutcome> {
        let document = SourceDocument::read(input, classification)?;
        info!(
            "File {:?} is running ({}, target {})",
            input,
            document.kind(),
            document.language()
        );

        let Some(translated) = self.translate_document(&document).await? else {
            warn!("No translatable strings in {:?}, nothing written", input);
            return Ok(FileOutcome::NoEntries);
        };

        let backup = if self.config.pipeline.backup_existing {
            FileManager::write_with_backup(output, &translated.content)?
        } else {
            FileManager::write_to_file(output, &translated.content)?;
            None
        };

        if let Some(backup) = &backup {
            info!("Previous output backed up to {:?}", backup);
        }
        info!(
            "File {:?} processed successfully, output location {:?}",
            input, output
        );

        Ok(FileOutcome::Translated {
            output: output.to_path_buf(),
            entries: translated.entries,
            backup,
        })
    }

    /// Extract, translate and reinject one document in memory
    ///
    /// Returns `None` when the document has no string-literal property.
    pub async fn translate_document(
        &self,
        document: &SourceDocument,
    ) -> Result<Option<TranslatedDocument>, TranslationError> {
        let pipeline = &self.config.pipeline;
        let (representation, entries) = structure::extract(document, pipeline.key_collision)?;
        if entries.is_empty() {
            return Ok(None);
        }

        let batches = split_entries(entries.as_slice(), document.kind().batch_size(pipeline))?;
        debug!(
            "{:?}: {} entries in {} batches",
            document.path(),
            entries.len(),
            batches.len()
        );

        let report = self
            .service
            .translate_all(&batches, document.language())
            .await;

        let translations = match self.config.translation.common.batch_failure {
            BatchFailurePolicy::AllOrNothing => report.into_merged()?,
            BatchFailurePolicy::Salvage => {
                let total = report.len();
                let (merged, failures) = report.salvage();
                for (index, e) in &failures {
                    warn!("Batch {} of {:?} dropped: {}", index, document.path(), e);
                }
                if failures.len() == total {
                    if let Some((index, e)) = failures.into_iter().next() {
                        return Err(TranslationError::batch(index, e));
                    }
                }
                merged
            }
        };

        let content =
            structure::reinject(&representation, &translations, pipeline.missing_translation)?;

        Ok(Some(TranslatedDocument {
            content,
            entries: entries.len(),
        }))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.pipeline.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/*!
 * Source documents and their classification.
 *
 * A document is accepted when its extension is supported and its file name
 * carries a locale tag naming the language to translate into.
 */

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::app_config::PipelineConfig;
use crate::file_utils::FileManager;
use crate::language_utils;

/// Grammar used to parse an object-literal source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeDialect {
    TypeScript,
    JavaScript,
}

/// Kind of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Source file holding object literals
    StructuredCode(CodeDialect),
    /// Plain JSON file
    Json,
}

impl DocumentKind {
    /// Detect the kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" => Some(Self::StructuredCode(CodeDialect::TypeScript)),
            "js" => Some(Self::StructuredCode(CodeDialect::JavaScript)),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Batch size configured for this kind
    pub fn batch_size(&self, pipeline: &PipelineConfig) -> usize {
        match self {
            Self::StructuredCode(_) => pipeline.code_batch_size,
            Self::Json => pipeline.json_batch_size,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredCode(CodeDialect::TypeScript) => write!(f, "typescript"),
            Self::StructuredCode(CodeDialect::JavaScript) => write!(f, "javascript"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Why a file was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Extension other than `.ts`, `.js` or `.json`
    UnsupportedExtension,
    /// No locale tag in the file name
    NoLanguageTag,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension => write!(f, "unsupported extension"),
            Self::NoLanguageTag => write!(f, "no language tag in file name"),
        }
    }
}

/// Kind and target language of an accepted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: DocumentKind,
    pub language: String,
}

/// Decide whether a file takes part in a run
pub fn classify(path: &Path) -> Result<Classification, SkipReason> {
    let kind = DocumentKind::from_path(path).ok_or(SkipReason::UnsupportedExtension)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let language =
        language_utils::detect_language_tag(&file_name).ok_or(SkipReason::NoLanguageTag)?;

    Ok(Classification { kind, language })
}

/// Raw text of one input file with its detected kind and target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    text: String,
    kind: DocumentKind,
    language: String,
}

impl SourceDocument {
    /// Create a document from already-read text
    pub fn new(
        path: impl Into<PathBuf>,
        text: impl Into<String>,
        kind: DocumentKind,
        language: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            kind,
            language: language.into(),
        }
    }

    /// Read a classified file from disk
    pub fn read(path: &Path, classification: Classification) -> Result<Self> {
        let text = FileManager::read_to_string(path)?;
        Ok(Self::new(path, text, classification.kind, classification.language))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Target language tag, e.g. `en-US`
    pub fn language(&self) -> &str {
        &self.language
    }
}

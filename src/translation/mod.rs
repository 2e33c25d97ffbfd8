/*!
 * Translation of extracted key/value entries.
 *
 * This module turns extracted entries into oracle requests and merges the
 * answers. It is split into several submodules:
 *
 * - `batch`: Partitioning entries into size-bounded batches
 * - `core`: The translation service (fan-out, retry, merge) and provider-backed oracle
 * - `response`: Sanitizing and validating oracle answers
 * - `prompts`: Prompt templates sent to LLM providers
 */

use std::collections::HashMap;

/// Mapping from key to translated text
pub type TranslationMap = HashMap<String, String>;

// Re-export main types for easier usage
pub use self::batch::{split_entries, TranslationBatch};
pub use self::core::{BatchOutcome, BatchReport, ProviderOracle, RetryPolicy, TranslationService};
pub use self::prompts::PromptTemplate;
pub use self::response::{decode_response, parse_translations, sanitize_response};

// Submodules
pub mod batch;
pub mod core;
pub mod prompts;
pub mod response;

/*!
 * # yaltwai - Yet Another Locale Translation with AI
 *
 * A Rust library for translating locale files with AI while keeping their
 * structure intact.
 *
 * ## Features
 *
 * - Extract string-literal properties from TypeScript/JavaScript object
 *   literals and top-level string properties from JSON files
 * - Translate them in size-bounded batches using various AI providers:
 *   - DeepSeek, OpenAI and LM Studio (OpenAI-compatible)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Concurrent requests with per-batch retry and exponential backoff
 * - Reinject translations without touching keys, comments or layout
 * - Back up previous output before overwriting it
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Source documents and file classification
 * - `structure`: Structural extraction and reinjection:
 *   - `structure::code`: tree-sitter based object-literal handling
 *   - `structure::json`: JSON documents
 *   - `structure::quoting`: String literal quoting
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: Fan-out, retry and merge
 *   - `translation::batch`: Batch partitioning
 *   - `translation::response`: Oracle answer validation
 *   - `translation::prompts`: Prompt templates
 * - `file_utils`: File system operations and backups
 * - `app_controller`: Main application controller
 * - `language_utils`: Locale tag utilities
 * - `providers`: Client implementations for various LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod structure;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunReport};
pub use document::SourceDocument;
pub use errors::{AppError, ProviderError, TranslationError};
pub use providers::Oracle;
pub use translation::{TranslationMap, TranslationService};

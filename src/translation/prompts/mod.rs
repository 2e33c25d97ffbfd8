/*!
 * Prompt engineering for key/value translation.
 *
 * This module provides the system prompt, the worked assistant example and the
 * user message that carries a batch payload.
 */

pub mod templates;

// Re-export main types
pub use templates::PromptTemplate;

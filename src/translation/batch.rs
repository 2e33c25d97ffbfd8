/*!
 * Batch partitioning.
 *
 * The flattened key/value mapping of a document is split into size-bounded
 * batches, each of which becomes one oracle request.
 */

use serde_json::{Map, Value};

use crate::errors::TranslationError;
use crate::structure::KeyValueEntry;

/// An indexed, ordered group of entries sent as one oracle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBatch {
    /// Zero-based position among the batches of a document
    pub index: usize,
    /// Entries in document order
    pub entries: Vec<KeyValueEntry>,
}

impl TranslationBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of this batch in order
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    /// Serialize to the flat JSON object sent to the oracle, preserving entry order
    pub fn to_payload(&self) -> Result<String, TranslationError> {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.key.clone(), Value::String(e.value.clone())))
            .collect();

        serde_json::to_string(&object)
            .map_err(|e| TranslationError::Format(format!("Failed to serialize batch: {}", e)))
    }
}

/// Split entries into batches of at most `max_size`, in insertion order
pub fn split_entries(
    entries: &[KeyValueEntry],
    max_size: usize,
) -> Result<Vec<TranslationBatch>, TranslationError> {
    if max_size == 0 {
        return Err(TranslationError::Config(
            "Batch size must be greater than zero".to_string(),
        ));
    }

    Ok(entries
        .chunks(max_size)
        .enumerate()
        .map(|(index, chunk)| TranslationBatch {
            index,
            entries: chunk.to_vec(),
        })
        .collect())
}

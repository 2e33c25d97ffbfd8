use serde_json::Value;

use crate::app_config::MissingTranslationPolicy;
use crate::errors::TranslationError;
use crate::translation::TranslationMap;

use super::{lookup_translation, ExtractedEntries};

/// Parse JSON text, reporting where it stopped making sense
pub fn parse(text: &str) -> Result<Value, TranslationError> {
    serde_json::from_str(text).map_err(|e| {
        TranslationError::Parse(format!(
            "Invalid JSON at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        ))
    })
}

/// Collect string properties of a top-level object
///
/// Nested values and non-object documents contribute nothing.
pub(crate) fn collect_entries(
    value: &Value,
    entries: &mut ExtractedEntries,
) -> Result<(), TranslationError> {
    let Value::Object(map) = value else {
        log::debug!("JSON document is not an object, nothing to translate");
        return Ok(());
    };

    for (key, property) in map {
        if let Value::String(text) = property {
            entries.insert(key.as_str(), text.as_str())?;
        }
    }

    Ok(())
}

/// Replace top-level string properties and render pretty-printed JSON
pub(crate) fn reinject(
    value: &Value,
    translations: &TranslationMap,
    policy: MissingTranslationPolicy,
) -> Result<String, TranslationError> {
    let mut output = value.clone();

    if let Value::Object(map) = &mut output {
        for (key, property) in map.iter_mut() {
            if !property.is_string() {
                continue;
            }
            if let Some(translated) = lookup_translation(translations, key, policy)? {
                *property = Value::String(translated.to_string());
            }
        }
    }

    serde_json::to_string_pretty(&output)
        .map_err(|e| TranslationError::Format(format!("Failed to serialize JSON: {}", e)))
}

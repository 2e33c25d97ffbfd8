/*!
 * Oracle response validation.
 *
 * An answer is accepted only when, after stripping markdown fences and
 * whitespace, it is a bare JSON object whose values are scalars.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::TranslationError;

use super::TranslationMap;

static OPENING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*").unwrap());

static CLOSING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Strip a wrapping code fence and surrounding whitespace, and require `{ ... }`
///
/// Only a fence at the very start or end is removed; backticks inside
/// translated values are left alone.
pub fn sanitize_response(response: &str) -> Result<String, TranslationError> {
    let trimmed = response.trim();
    let unopened = OPENING_FENCE.replace(trimmed, "");
    let unfenced = CLOSING_FENCE.replace(&unopened, "");
    let cleaned = unfenced.trim();

    if !cleaned.starts_with('{') || !cleaned.ends_with('}') {
        let preview: String = cleaned.chars().take(80).collect();
        return Err(TranslationError::Format(format!(
            "Response is not a JSON object: {}",
            preview
        )));
    }

    Ok(cleaned.to_string())
}

/// Parse a sanitized response into a key -> translation mapping
pub fn parse_translations(cleaned: &str) -> Result<TranslationMap, TranslationError> {
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| TranslationError::Parse(format!("Invalid JSON in response: {}", e)))?;

    let Value::Object(object) = value else {
        return Err(TranslationError::Format(
            "Response JSON is not an object".to_string(),
        ));
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key, text)),
            Value::Number(number) => Ok((key, number.to_string())),
            Value::Bool(flag) => Ok((key, flag.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => Err(TranslationError::Format(
                format!("Value for key '{}' is not a string", key),
            )),
        })
        .collect()
}

/// Sanitize then parse a raw oracle answer
pub fn decode_response(response: &str) -> Result<TranslationMap, TranslationError> {
    let cleaned = sanitize_response(response)?;
    parse_translations(&cleaned)
}

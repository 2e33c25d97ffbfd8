/*!
 * Prompt templates for key/value translation.
 *
 * The oracle receives a flat JSON object and must answer with the same object,
 * keys untouched and values translated, as raw JSON.
 */

use crate::language_utils;

/// System prompt template for key/value translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt.
    pub const KEY_VALUE_TRANSLATOR: &'static str = r#"You are a professional translator who translates application strings into the language the user asks for.

## Your Task
1. Translate every value of the given JSON object into the requested language.
2. Keep the translation accurate and natural for a user interface.

## Output Requirements
- Return ONLY a valid JSON object, with no wrapping or decoration
- Never use markdown code fences (```)
- Never add explanations or any text outside the JSON object
- Keep every key exactly as given; translate only the values
- The answer must be standard JSON that a strict JSON parser accepts

Correct answer:
{"key": "translated value"}

Wrong answer:
```json
{"key": "translated value"}
```

## Correctness
- Escape quotes inside values; mind nested single and double quotes
- Keep placeholders such as {name} or {count} unchanged
- Keep line breaks as \n escapes and keep punctuation consistent"#;

    /// Worked example sent as a prior assistant turn.
    pub const ASSISTANT_EXAMPLE: &'static str = r#"If the input is:
{"welcome": "Today is a good day"}
and the target is zh-CN, the answer is:
{"welcome": "今天是个好日子"}
If the input is:
{"weekdays": "Today is {today}, tomorrow is {tomorrow}"}
and the target is fr-FR, the answer is:
{"weekdays": "Aujourd'hui c'est {today}, demain c'est {tomorrow}"}"#;

    /// User prompt wrapping the payload.
    pub const USER_REQUEST: &'static str = r#"Translate the following content:
{payload}
Target language: {target_language}"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default key/value translator template.
    pub fn key_value_translator() -> Self {
        Self::new(Self::KEY_VALUE_TRANSLATOR)
    }

    /// Render the template for a target language.
    pub fn render(&self, target_language: &str) -> String {
        self.template
            .replace("{target_language}", &describe_language(target_language))
    }

    /// Build the user message carrying the payload.
    pub fn user_prompt(payload: &str, target_language: &str) -> String {
        Self::USER_REQUEST
            .replace("{target_language}", &describe_language(target_language))
            .replace("{payload}", payload)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::key_value_translator()
    }
}

/// `zh-HK` becomes `zh-HK (Chinese (HK))`; unknown tags are left bare
fn describe_language(tag: &str) -> String {
    let name = language_utils::get_language_name(tag);
    if name == tag {
        tag.to_string()
    } else {
        format!("{} ({})", tag, name)
    }
}

/*!
 * Structural extraction and reinjection.
 *
 * A document is parsed into a structural representation, its translatable
 * string properties are flattened into an ordered key/value mapping, and after
 * translation the same representation is walked again to put the translated
 * strings back:
 *
 * - `code`: TypeScript / JavaScript object literals (tree-sitter)
 * - `json`: top-level string properties of a JSON object
 * - `quoting`: string literal quoting and escaping
 */

use std::collections::HashMap;

use crate::app_config::{KeyCollisionPolicy, MissingTranslationPolicy};
use crate::document::{DocumentKind, SourceDocument};
use crate::errors::TranslationError;
use crate::translation::TranslationMap;

pub mod code;
pub mod json;
pub mod quoting;

pub use self::code::CodeTree;

/// A `(key, value)` pair taken from a string-literal property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: String,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Insertion-ordered key/value mapping produced by extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractedEntries {
    entries: Vec<KeyValueEntry>,
    positions: HashMap<String, usize>,
    policy: KeyCollisionPolicy,
}

impl ExtractedEntries {
    /// Create an empty mapping with the given collision policy
    pub fn new(policy: KeyCollisionPolicy) -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            policy,
        }
    }

    /// Record an entry, resolving duplicate keys with the collision policy
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TranslationError> {
        let key = key.into();
        let value = value.into();

        match self.positions.get(&key) {
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push(KeyValueEntry { key, value });
            }
            Some(&position) => match self.policy {
                KeyCollisionPolicy::KeepLast => {
                    log::debug!("Duplicate key '{}', keeping the later value", key);
                    self.entries[position].value = value;
                }
                KeyCollisionPolicy::KeepFirst => {
                    log::debug!("Duplicate key '{}', keeping the earlier value", key);
                }
                KeyCollisionPolicy::Error => return Err(TranslationError::DuplicateKey(key)),
            },
        }

        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&position| self.entries[position].value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValueEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[KeyValueEntry] {
        &self.entries
    }
}

/// Parsed, traversable form of a document
pub enum StructuralRepresentation {
    Code(CodeTree),
    Json(serde_json::Value),
}

impl StructuralRepresentation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Code(_) => "code",
            Self::Json(_) => "json",
        }
    }
}

/// Parse a document and collect its translatable entries
pub fn extract(
    document: &SourceDocument,
    policy: KeyCollisionPolicy,
) -> Result<(StructuralRepresentation, ExtractedEntries), TranslationError> {
    let mut entries = ExtractedEntries::new(policy);

    let representation = match document.kind() {
        DocumentKind::StructuredCode(dialect) => {
            let tree = CodeTree::parse(document.text(), dialect)?;
            tree.collect_entries(&mut entries)?;
            StructuralRepresentation::Code(tree)
        }
        DocumentKind::Json => {
            let value = json::parse(document.text())?;
            json::collect_entries(&value, &mut entries)?;
            StructuralRepresentation::Json(value)
        }
    };

    log::debug!(
        "Extracted {} entries from {:?} ({})",
        entries.len(),
        document.path(),
        representation.kind_name()
    );

    Ok((representation, entries))
}

/// Put translated strings back and serialize the document
pub fn reinject(
    representation: &StructuralRepresentation,
    translations: &TranslationMap,
    policy: MissingTranslationPolicy,
) -> Result<String, TranslationError> {
    match representation {
        StructuralRepresentation::Code(tree) => tree.reinject(translations, policy),
        StructuralRepresentation::Json(value) => json::reinject(value, translations, policy),
    }
}

/// Resolve a translation for a key according to the missing-translation policy
///
/// `Ok(None)` means the original value stays in place.
pub(crate) fn lookup_translation<'a>(
    translations: &'a TranslationMap,
    key: &str,
    policy: MissingTranslationPolicy,
) -> Result<Option<&'a str>, TranslationError> {
    match translations.get(key) {
        Some(translated) => Ok(Some(translated.as_str())),
        None => match policy {
            MissingTranslationPolicy::Fail => {
                Err(TranslationError::MissingTranslation(key.to_string()))
            }
            MissingTranslationPolicy::KeepOriginal => {
                log::warn!("No translation for key '{}', keeping the original text", key);
                Ok(None)
            }
        },
    }
}

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::ops::Range;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::app_config::MissingTranslationPolicy;
use crate::document::CodeDialect;
use crate::errors::TranslationError;
use crate::translation::TranslationMap;

use super::quoting::{decode_literal, quote_literal};
use super::{lookup_translation, ExtractedEntries};

static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n){2,}").unwrap());

static EXPORT_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)*export default").unwrap());

fn language_for(dialect: CodeDialect) -> Language {
    match dialect {
        CodeDialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        CodeDialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
    }
}

/// Key shapes a name can be derived from
enum PropertyKey {
    Named(String),
    Underivable,
}

/// Value shapes the pipeline understands
enum PropertyValue<'tree> {
    StringLiteral(Node<'tree>),
    NotTranslatable,
}

/// A `pair` node whose value is a plain string literal
struct StringProperty {
    key: String,
    value: String,
    span: Range<usize>,
}

/// Syntax tree of an object-literal source file, kept with its source text
pub struct CodeTree {
    source: String,
    tree: Tree,
}

impl CodeTree {
    /// Parse source text, rejecting it on the first syntax error
    pub fn parse(source: &str, dialect: CodeDialect) -> Result<Self, TranslationError> {
        let mut parser = Parser::new();
        parser.set_language(&language_for(dialect)).map_err(|e| {
            TranslationError::Parse(format!("Failed to load {:?} grammar: {:?}", dialect, e))
        })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| TranslationError::Parse("Parser returned no syntax tree".to_string()))?;

        if let Some(error_node) = first_syntax_error(tree.root_node()) {
            let position = error_node.start_position();
            return Err(TranslationError::Parse(format!(
                "Syntax error at line {}, column {}",
                position.row + 1,
                position.column + 1
            )));
        }

        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    /// Record every string-valued property in document order
    pub(crate) fn collect_entries(
        &self,
        entries: &mut ExtractedEntries,
    ) -> Result<(), TranslationError> {
        let mut result = Ok(());
        self.for_each_string_property(|property| {
            if result.is_ok() {
                result = entries.insert(property.key, property.value);
            }
        });
        result
    }

    /// Splice translated literals into the source and tidy the layout
    pub(crate) fn reinject(
        &self,
        translations: &TranslationMap,
        policy: MissingTranslationPolicy,
    ) -> Result<String, TranslationError> {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        let mut failure = None;

        self.for_each_string_property(|property| {
            if failure.is_some() {
                return;
            }
            match lookup_translation(translations, &property.key, policy) {
                Ok(Some(translated)) => edits.push((property.span, quote_literal(translated))),
                Ok(None) => {}
                Err(e) => failure = Some(e),
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        edits.sort_by_key(|(span, _)| span.start);

        let mut output = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (span, literal) in edits {
            output.push_str(&self.source[cursor..span.start]);
            output.push_str(&literal);
            cursor = span.end;
        }
        output.push_str(&self.source[cursor..]);

        Ok(normalize_layout(&output))
    }

    /// Pre-order walk over every `pair` node holding a string literal
    fn for_each_string_property(&self, mut visit: impl FnMut(StringProperty)) {
        let source = self.source.as_bytes();
        let mut stack = vec![self.tree.root_node()];

        while let Some(node) = stack.pop() {
            if node.kind() == "pair" {
                if let Some(property) = string_property(node, source) {
                    visit(property);
                }
            }

            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
}

fn string_property(pair: Node<'_>, source: &[u8]) -> Option<StringProperty> {
    let key_node = pair.child_by_field_name("key")?;
    let value_node = pair.child_by_field_name("value")?;

    let PropertyValue::StringLiteral(literal) = classify_value(value_node) else {
        return None;
    };

    let PropertyKey::Named(key) = classify_key(key_node, source) else {
        log::debug!(
            "Skipping property with computed key at line {}",
            key_node.start_position().row + 1
        );
        return None;
    };

    let raw = literal.utf8_text(source).ok()?;
    Some(StringProperty {
        key,
        value: decode_literal(raw),
        span: literal.byte_range(),
    })
}

fn classify_value(node: Node<'_>) -> PropertyValue<'_> {
    match node.kind() {
        "string" => PropertyValue::StringLiteral(node),
        _ => PropertyValue::NotTranslatable,
    }
}

fn classify_key(node: Node<'_>, source: &[u8]) -> PropertyKey {
    let text = node.utf8_text(source).unwrap_or_default();

    match node.kind() {
        "property_identifier" | "identifier" | "private_property_identifier" => {
            PropertyKey::Named(text.to_string())
        }
        "string" => PropertyKey::Named(decode_literal(text)),
        "number" => PropertyKey::Named(canonical_number(text)),
        "computed_property_name" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next();
            match inner {
                Some(inner) if inner.kind() != "computed_property_name" => {
                    classify_key(inner, source)
                }
                _ => PropertyKey::Underivable,
            }
        }
        _ => PropertyKey::Underivable,
    }
}

/// Numeric keys are named the way the runtime would stringify them (`0x10` is `16`)
fn canonical_number(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(digits) = cleaned.strip_suffix('n') {
        return digits.to_string();
    }

    let parsed = if let Some(hex) = cleaned.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok().map(|v| v as f64)
    } else if let Some(octal) = cleaned.strip_prefix("0o") {
        u64::from_str_radix(octal, 8).ok().map(|v| v as f64)
    } else if let Some(binary) = cleaned.strip_prefix("0b") {
        u64::from_str_radix(binary, 2).ok().map(|v| v as f64)
    } else {
        cleaned.parse::<f64>().ok()
    };

    match parsed {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e21 => format!("{:.0}", v),
        Some(v) => v.to_string(),
        None => text.to_string(),
    }
}

fn first_syntax_error<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'tree>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(first_syntax_error)
        .or(Some(node))
}

/// Collapse runs of blank lines and keep one blank line before `export default`
///
/// Inserted breaks use the document's own line ending.
pub fn normalize_layout(code: &str) -> String {
    let eol = if code.contains("\r\n") { "\r\n" } else { "\n" };
    let blank_line = format!("{eol}{eol}");
    let collapsed = EXCESS_BLANK_LINES.replace_all(code, NoExpand(&blank_line));
    EXPORT_DEFAULT
        .replace_all(&collapsed, NoExpand(&format!("{blank_line}export default")))
        .into_owned()
}

use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities for locale tags embedded in file names
///
/// A locale tag is two lowercase letters, a hyphen, and two more letters that are
/// either both lowercase or both uppercase (`en-US`, `zh-hk`). The tag must not be
/// glued to other letters, so `user-profile.ts` carries no tag.
static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z])([a-z]{2}-(?:[A-Z]{2}|[a-z]{2}))(?:[^A-Za-z]|$)").unwrap()
});

/// Find the first locale tag in a file name
pub fn detect_language_tag(file_name: &str) -> Option<String> {
    LANGUAGE_TAG
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Get the ISO 639-1 primary subtag of a locale tag
pub fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// Check whether the primary subtag is a known ISO 639-1 code
pub fn is_known_language(tag: &str) -> bool {
    Language::from_639_1(primary_subtag(tag)).is_some()
}

/// Get a human-readable name for a locale tag, e.g. `Chinese (HK)` for `zh-HK`
pub fn get_language_name(tag: &str) -> String {
    let primary = primary_subtag(tag);
    let region = tag.split('-').nth(1).map(|r| r.to_uppercase());

    match (Language::from_639_1(primary), region) {
        (Some(language), Some(region)) => format!("{} ({})", language.to_name(), region),
        (Some(language), None) => language.to_name().to_string(),
        (None, _) => tag.to_string(),
    }
}

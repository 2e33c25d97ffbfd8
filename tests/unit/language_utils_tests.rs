/*!
 * Tests for locale tag utilities
 */

use yaltwai::language_utils::{detect_language_tag, get_language_name, is_known_language, primary_subtag};

#[test]
fn test_detectLanguageTag_withBareTagName_shouldFindTag() {
    assert_eq!(detect_language_tag("zh-HK.ts"), Some("zh-HK".to_string()));
    assert_eq!(detect_language_tag("en-US.json"), Some("en-US".to_string()));
}

#[test]
fn test_detectLanguageTag_withLowercaseRegion_shouldFindTag() {
    assert_eq!(detect_language_tag("messages.pt-br.js"), Some("pt-br".to_string()));
}

#[test]
fn test_detectLanguageTag_withSeveralTags_shouldReturnFirst() {
    assert_eq!(
        detect_language_tag("fr-FR.from.de-DE.ts"),
        Some("fr-FR".to_string())
    );
}

#[test]
fn test_detectLanguageTag_withoutTag_shouldReturnNone() {
    assert_eq!(detect_language_tag("index.ts"), None);
    assert_eq!(detect_language_tag("package.json"), None);
    assert_eq!(detect_language_tag("EN-US.ts"), None);
    assert_eq!(detect_language_tag("data-set.ts"), None);
}

#[test]
fn test_primarySubtag_shouldReturnLanguagePart() {
    assert_eq!(primary_subtag("zh-CN"), "zh");
    assert_eq!(primary_subtag("fr"), "fr");
}

#[test]
fn test_isKnownLanguage_shouldAcceptIsoCodes() {
    assert!(is_known_language("en-US"));
    assert!(is_known_language("ja-JP"));
    assert!(!is_known_language("zz-ZZ"));
}

#[test]
fn test_getLanguageName_shouldDescribeTag() {
    assert_eq!(get_language_name("fr-FR"), "French (FR)");
    assert_eq!(get_language_name("de"), "German");
}

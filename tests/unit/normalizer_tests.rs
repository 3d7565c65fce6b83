/*!
 * Tests for text normalization and manual overrides
 */

use std::sync::Arc;

use anuvad::language_utils::{LanguageCodeRegistry, ShortCode};
use anuvad::translation::{ManualOverrideDictionary, TextNormalizer};

use crate::common;

fn normalizer(dictionary: ManualOverrideDictionary) -> TextNormalizer {
    TextNormalizer::new(
        Arc::new(LanguageCodeRegistry::standard().clone()),
        Arc::new(dictionary),
    )
}

#[test]
fn test_normalize_withHindiTarget_shouldApplyHindiOverrides() {
    let n = normalizer(ManualOverrideDictionary::builtin());
    let out = n.normalize("Send an  email\nfrom Kindle", &common::name("Hindi"));
    assert_eq!(out, "Send an ईमेल from किंडल");
}

#[test]
fn test_normalize_withBengaliTarget_shouldApplyBengaliOverrides() {
    let n = normalizer(ManualOverrideDictionary::builtin());
    assert_eq!(n.normalize("YouTube", &common::name("Bengali")), "ইউটিউব");
}

#[test]
fn test_normalize_withUnknownTarget_shouldSkipOverrides() {
    let n = normalizer(ManualOverrideDictionary::builtin());
    assert_eq!(n.normalize("YouTube", &common::name("Klingon")), "YouTube");
}

#[test]
fn test_normalize_withOnlyWhitespace_shouldBeEmpty() {
    let n = normalizer(ManualOverrideDictionary::builtin());
    assert_eq!(n.normalize(" \t\n ", &common::name("Hindi")), "");
}

#[test]
fn test_dictionary_mergeFile_shouldOverrideBuiltin() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "overrides.json",
        r#"{"hi": {"Chrome": "क्रोम ब्राउज़र"}, "ta": {"YouTube": "யூடியூப்"}}"#.as_bytes(),
    )
    .unwrap();

    let dictionary = ManualOverrideDictionary::builtin_with_file(&path).unwrap();
    assert_eq!(dictionary.apply("Chrome", &ShortCode::new("hi")), "क्रोम ब्राउज़र");
    assert_eq!(dictionary.apply("YouTube", &ShortCode::new("ta")), "யூடியூப்");
    assert_eq!(dictionary.len_for(&ShortCode::new("ta")), 1);
}

#[test]
fn test_dictionary_mergeFile_withBadJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "broken.json", b"{not json").unwrap();
    assert!(ManualOverrideDictionary::builtin_with_file(&path).is_err());
}

#[test]
fn test_dictionary_replacement_shouldNotBeRewritten() {
    let mut dictionary = ManualOverrideDictionary::empty();
    dictionary.extend(&ShortCode::new("hi"), [("cat", "dog"), ("dog", "bird")]);
    assert_eq!(dictionary.apply("cat dog", &ShortCode::new("hi")), "dog bird");
}

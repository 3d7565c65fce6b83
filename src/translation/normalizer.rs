/*!
 * Input clean-up before chunking and translation.
 */

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils::{FriendlyName, LanguageCodeRegistry};

use super::dictionary::ManualOverrideDictionary;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Typographic characters and their ASCII stand-ins
const PUNCTUATION_MAP: &[(char, &str)] = &[
    ('\u{00A0}', " "),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
];

/// Known OCR misreads
const OCR_FIXES: &[(&str, &str)] = &[
    ("Iang uage", "language"),
    ("Tiles", "tiles"),
    ("dpp", "app"),
];

/// Reduces OCR and typing noise and applies manual term overrides
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    registry: Arc<LanguageCodeRegistry>,
    dictionary: Arc<ManualOverrideDictionary>,
}

impl TextNormalizer {
    /// Create a normalizer backed by a registry and an override dictionary
    pub fn new(registry: Arc<LanguageCodeRegistry>, dictionary: Arc<ManualOverrideDictionary>) -> Self {
        Self { registry, dictionary }
    }

    /// Normalize `text` for translation into `target`.
    ///
    /// Never fails. An empty input yields an empty string, which callers must
    /// treat as "nothing to translate".
    pub fn normalize(&self, text: &str, target: &FriendlyName) -> String {
        let mut text = WHITESPACE_RUN.replace_all(text, " ").into_owned();

        if text.contains(|c| PUNCTUATION_MAP.iter().any(|(from, _)| *from == c)) {
            text = text
                .chars()
                .map(|c| {
                    PUNCTUATION_MAP
                        .iter()
                        .find(|(from, _)| *from == c)
                        .map_or_else(|| c.to_string(), |(_, to)| (*to).to_string())
                })
                .collect();
        }

        for (misread, fix) in OCR_FIXES {
            if text.contains(misread) {
                text = text.replace(misread, fix);
            }
        }

        if let Some(code) = self.registry.short_code_for_friendly_name(target) {
            text = self.dictionary.apply(&text, code);
        }

        text.trim().to_string()
    }
}

/*!
 * Manual term overrides applied before translation.
 *
 * The translation model transliterates brand and technical names
 * inconsistently, so known terms are replaced with fixed target-language
 * spellings before the text reaches it.
 *
 * Matching is literal, case-sensitive substring matching with no word
 * boundaries ("app" also matches inside "happy"). All phrases for a language
 * are matched in one left-to-right pass: the leftmost match wins, and among
 * phrases matching at that same position the longest wins (equal lengths in
 * lexical order). A phrase starting later loses to an overlapping earlier
 * one even when it is longer. A replacement is never itself rewritten by
 * another entry.
 */

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

use crate::language_utils::ShortCode;

/// Phrase table for one target language
#[derive(Debug, Clone)]
struct PhraseTable {
    replacements: HashMap<String, String>,
    matcher: Option<Regex>,
}

impl PhraseTable {
    fn new(replacements: HashMap<String, String>) -> Self {
        let mut phrases: Vec<&String> = replacements.keys().filter(|p| !p.is_empty()).collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let matcher = if phrases.is_empty() {
            None
        } else {
            let pattern = phrases
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            // Escaped literals always form a valid pattern
            Regex::new(&pattern).ok()
        };

        Self { replacements, matcher }
    }

    fn apply(&self, text: &str) -> String {
        match &self.matcher {
            Some(matcher) => matcher
                .replace_all(text, |caps: &regex::Captures<'_>| {
                    self.replacements
                        .get(&caps[0])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned(),
            None => text.to_string(),
        }
    }
}

/// Per-language mapping of literal phrase to literal replacement
#[derive(Debug, Clone, Default)]
pub struct ManualOverrideDictionary {
    tables: HashMap<ShortCode, PhraseTable>,
}

impl ManualOverrideDictionary {
    /// An empty dictionary that leaves every text unchanged
    pub fn empty() -> Self {
        Self::default()
    }

    /// The dictionary shipped with the crate
    pub fn builtin() -> Self {
        let mut dictionary = Self::empty();
        dictionary.extend(
            &ShortCode::new("hi"),
            [
                ("Chrome", "क्रोम"),
                ("Kindle", "किंडल"),
                ("LLM", "एलएलएम"),
                ("Natural Reader", "नेचुरल रीडर"),
                ("Plus", "प्लस"),
                ("Premium", "प्रीमियम"),
                ("YouTube", "यूट्यूब"),
                ("app", "ऐप"),
                ("email", "ईमेल"),
                ("voice", "आवाज़"),
            ],
        );
        dictionary.extend(
            &ShortCode::new("bn"),
            [
                ("Chrome", "ক্রোম"),
                ("Kindle", "কিন্ডল"),
                ("LLM", "এলএলএম"),
                ("Natural Reader", "ন্যাচারাল রিডার"),
                ("Plus", "প্লাস"),
                ("Premium", "প্রিমিয়াম"),
                ("YouTube", "ইউটিউব"),
                ("app", "অ্যাপ"),
                ("email", "ইমেইল"),
                ("voice", "ভয়েস"),
            ],
        );
        dictionary
    }

    /// Built-in entries overlaid with the entries from a JSON file.
    ///
    /// The file maps short codes to phrase tables:
    /// `{ "hi": { "Chrome": "क्रोम" } }`. File entries win over built-in ones.
    pub fn builtin_with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut dictionary = Self::builtin();
        dictionary.merge_file(path)?;
        Ok(dictionary)
    }

    /// Merge entries from a JSON file into this dictionary
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary file: {:?}", path))?;
        let parsed: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dictionary file: {:?}", path))?;

        for (code, entries) in parsed {
            debug!("Loaded {} dictionary entries for '{}' from {:?}", entries.len(), code, path);
            self.extend(&ShortCode::new(&code), entries);
        }
        Ok(())
    }

    /// Add or replace entries for one language
    pub fn extend<I, K, V>(&mut self, language: &ShortCode, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut replacements = self
            .tables
            .remove(language)
            .map(|t| t.replacements)
            .unwrap_or_default();
        for (phrase, replacement) in entries {
            replacements.insert(phrase.into(), replacement.into());
        }
        self.tables.insert(language.clone(), PhraseTable::new(replacements));
    }

    /// Replace every registered phrase for `language` in `text`
    pub fn apply(&self, text: &str, language: &ShortCode) -> String {
        match self.tables.get(language) {
            Some(table) => table.apply(text),
            None => text.to_string(),
        }
    }

    /// Number of phrases registered for a language
    pub fn len_for(&self, language: &ShortCode) -> usize {
        self.tables.get(language).map_or(0, |t| t.replacements.len())
    }
}

/*!
 * Language detection for `auto` source selection.
 *
 * Scripts used by a single language (Tamil, Gujarati, ...) are decided from
 * the Unicode block alone. Latin, Devanagari and Arabic text is handed to
 * `whatlang`, so French comes back as "fr" and Marathi as "mr". When
 * `whatlang` is not confident, Devanagari falls back to "hi", Arabic to "ur",
 * and Latin text is left undetected.
 */

use log::debug;
use whatlang::Lang;

use crate::language_utils::ShortCode;

/// Guesses the language of a text
pub trait LanguageDetector: Send + Sync {
    /// Short code of the detected language, or `None` when unknown
    fn detect(&self, text: &str) -> Option<ShortCode>;
}

/// Writing systems the detector counts letters for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Arabic,
}

impl Script {
    /// Tie-break order
    const ALL: [Script; 11] = [
        Script::Latin,
        Script::Devanagari,
        Script::Bengali,
        Script::Gurmukhi,
        Script::Gujarati,
        Script::Oriya,
        Script::Tamil,
        Script::Telugu,
        Script::Kannada,
        Script::Malayalam,
        Script::Arabic,
    ];

    fn of(c: char) -> Option<Self> {
        match c {
            'A'..='Z' | 'a'..='z' | '\u{00C0}'..='\u{024F}' => Some(Self::Latin),
            '\u{0900}'..='\u{097F}' => Some(Self::Devanagari),
            '\u{0980}'..='\u{09FF}' => Some(Self::Bengali),
            '\u{0A00}'..='\u{0A7F}' => Some(Self::Gurmukhi),
            '\u{0A80}'..='\u{0AFF}' => Some(Self::Gujarati),
            '\u{0B00}'..='\u{0B7F}' => Some(Self::Oriya),
            '\u{0B80}'..='\u{0BFF}' => Some(Self::Tamil),
            '\u{0C00}'..='\u{0C7F}' => Some(Self::Telugu),
            '\u{0C80}'..='\u{0CFF}' => Some(Self::Kannada),
            '\u{0D00}'..='\u{0D7F}' => Some(Self::Malayalam),
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' => Some(Self::Arabic),
            _ => None,
        }
    }

    /// Language implied by the script alone
    fn sole_language(self) -> Option<&'static str> {
        match self {
            Self::Bengali => Some("bn"),
            Self::Gurmukhi => Some("pa"),
            Self::Gujarati => Some("gu"),
            Self::Oriya => Some("or"),
            Self::Tamil => Some("ta"),
            Self::Telugu => Some("te"),
            Self::Kannada => Some("kn"),
            Self::Malayalam => Some("ml"),
            Self::Latin | Self::Devanagari | Self::Arabic => None,
        }
    }

    /// Language assumed for a shared script when statistics are inconclusive
    fn fallback(self) -> Option<&'static str> {
        match self {
            Self::Devanagari => Some("hi"),
            Self::Arabic => Some("ur"),
            Self::Latin => None,
            other => other.sole_language(),
        }
    }
}

/// Script with the most letters in `text`; ties go to the earlier script in `Script::ALL`
fn dominant_script(text: &str) -> Option<Script> {
    let mut counts = [0usize; Script::ALL.len()];
    for script in text.chars().filter_map(Script::of) {
        if let Some(slot) = Script::ALL.iter().position(|s| *s == script) {
            counts[slot] += 1;
        }
    }

    // max_by_key keeps the last maximum, so walk in reverse to prefer table order
    counts
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, n)| **n > 0)
        .max_by_key(|(_, n)| **n)
        .map(|(i, _)| Script::ALL[i])
}

/// ISO 639-1 code for a `whatlang` language, or its 639-3 code when there is none
fn short_code_for(lang: Lang) -> ShortCode {
    let code = lang.code();
    let short = isolang::Language::from_639_3(code)
        .and_then(|l| l.to_639_1())
        .unwrap_or(code);
    ShortCode::new(short)
}

/// Detector combining a script pass with `whatlang` trigram statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    /// Create a detector
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<ShortCode> {
        let script = dominant_script(text)?;
        if let Some(code) = script.sole_language() {
            return Some(ShortCode::new(code));
        }

        match whatlang::detect(text) {
            Some(info) if info.is_reliable() => {
                let code = short_code_for(info.lang());
                debug!(
                    "Detected language: {} with confidence {:.2}",
                    code,
                    info.confidence()
                );
                Some(code)
            }
            _ => {
                debug!("No reliable detection for {:?} text", script);
                script.fallback().map(ShortCode::new)
            }
        }
    }
}

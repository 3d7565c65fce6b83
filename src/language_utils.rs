/*!
 * Language code utilities.
 *
 * Callers, detectors and the translation backend each name languages
 * differently:
 * - friendly names ("Hindi") come from user-facing selection,
 * - short codes ("hi") come from language detection and speech-to-text,
 * - model codes ("hin_Deva") are what the translation model understands.
 *
 * Each scheme gets its own wrapper type so one cannot be passed where another
 * is expected. `LanguageCodeRegistry` maps between them.
 */

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use isolang::Language;
use once_cell::sync::Lazy;

use crate::errors::ConfigError;

macro_rules! language_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Borrow the underlying string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(&value)
            }
        }
    };
}

language_newtype!(
    /// Human-readable language name, e.g. "Hindi"
    FriendlyName
);

language_newtype!(
    /// Two-letter ISO 639-1 style code, e.g. "hi"
    ShortCode
);

language_newtype!(
    /// Translation-model language code, e.g. "hin_Deva"
    ModelCode
);

impl FriendlyName {
    /// Create a friendly name, trimming surrounding whitespace
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_string())
    }
}

impl ShortCode {
    /// Placeholder source code asking for language detection
    pub const AUTO: &'static str = "auto";

    /// Create a short code, trimmed and lowercased
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    /// Whether this is the "auto" placeholder rather than a real language
    pub fn is_auto(&self) -> bool {
        self.0 == Self::AUTO
    }

    /// English name of the language according to ISO 639-1, if any
    pub fn english_name(&self) -> Option<&'static str> {
        Language::from_639_1(&self.0).map(|lang| lang.to_name())
    }
}

impl ModelCode {
    /// Create a model code; model codes are case-sensitive and kept verbatim
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_string())
    }
}

/// One language known to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Name shown to users
    pub friendly: FriendlyName,
    /// Code understood by the translation model
    pub model: ModelCode,
    /// Code reported by detectors
    pub short: ShortCode,
}

impl LanguageEntry {
    fn new(friendly: &str, model: &str, short: &str) -> Self {
        Self {
            friendly: FriendlyName::new(friendly),
            model: ModelCode::new(model),
            short: ShortCode::new(short),
        }
    }
}

/// Target languages offered for translation
const TARGET_LANGUAGES: &[(&str, &str, &str)] = &[
    ("Assamese", "asm_Beng", "as"),
    ("Bengali", "ben_Beng", "bn"),
    ("Gujarati", "guj_Gujr", "gu"),
    ("Hindi", "hin_Deva", "hi"),
    ("Kannada", "kan_Knda", "kn"),
    ("Malayalam", "mal_Mlym", "ml"),
    ("Marathi", "mar_Deva", "mr"),
    ("Odia", "ory_Orya", "or"),
    ("Punjabi", "pan_Guru", "pa"),
    ("Tamil", "tam_Taml", "ta"),
    ("Telugu", "tel_Telu", "te"),
    ("Urdu", "urd_Arab", "ur"),
];

/// Languages accepted as translation source
const SOURCE_LANGUAGES: &[(&str, &str, &str)] = &[
    ("English", "eng_Latn", "en"),
    ("Hindi", "hin_Deva", "hi"),
];

/// Short codes with a speech voice; Odia and Assamese have none
const SPEECH_OUTPUT_CODES: &[&str] = &["bn", "en", "gu", "hi", "kn", "ml", "mr", "pa", "ta", "te", "ur"];

static STANDARD_REGISTRY: Lazy<LanguageCodeRegistry> = Lazy::new(|| {
    let targets = TARGET_LANGUAGES
        .iter()
        .map(|(f, m, s)| LanguageEntry::new(f, m, s))
        .collect();
    let sources = SOURCE_LANGUAGES
        .iter()
        .map(|(f, m, s)| LanguageEntry::new(f, m, s))
        .collect();
    LanguageCodeRegistry::from_entries(targets, sources)
        .map(|registry| registry.with_speech_output(SPEECH_OUTPUT_CODES.iter().map(|c| ShortCode::new(c))))
        .unwrap_or_else(|e| panic!("built-in language table is inconsistent: {}", e))
});

/// Static mapping between friendly names, short codes and model codes
#[derive(Debug, Clone)]
pub struct LanguageCodeRegistry {
    targets: Vec<LanguageEntry>,
    sources: Vec<LanguageEntry>,
    friendly_to_model: HashMap<FriendlyName, ModelCode>,
    source_short_to_model: HashMap<ShortCode, ModelCode>,
    model_to_entry: HashMap<ModelCode, LanguageEntry>,
    speech_output: HashSet<ShortCode>,
}

impl LanguageCodeRegistry {
    /// The built-in registry: twelve Indian target languages, English and Hindi as sources
    pub fn standard() -> &'static Self {
        &STANDARD_REGISTRY
    }

    /// Build a registry, checking that every scheme maps one-to-one
    pub fn from_entries(
        targets: Vec<LanguageEntry>,
        sources: Vec<LanguageEntry>,
    ) -> Result<Self, ConfigError> {
        let mut friendly_to_model = HashMap::new();
        let mut source_short_to_model = HashMap::new();
        let mut model_to_entry: HashMap<ModelCode, LanguageEntry> = HashMap::new();

        for entry in targets.iter().chain(sources.iter()) {
            if let Some(existing) = model_to_entry.get(&entry.model) {
                // Hindi is legitimately listed as both a source and a target
                if existing != entry {
                    return Err(ConfigError::InconsistentRegistry(format!(
                        "model code '{}' is registered for both '{}' and '{}'",
                        entry.model, existing.friendly, entry.friendly
                    )));
                }
                continue;
            }
            if model_to_entry
                .values()
                .any(|e| e.friendly == entry.friendly || e.short == entry.short)
            {
                return Err(ConfigError::InconsistentRegistry(format!(
                    "'{}' ({}) collides with an existing entry",
                    entry.friendly, entry.short
                )));
            }
            model_to_entry.insert(entry.model.clone(), entry.clone());
        }

        for entry in &targets {
            friendly_to_model.insert(entry.friendly.clone(), entry.model.clone());
        }
        for entry in &sources {
            source_short_to_model.insert(entry.short.clone(), entry.model.clone());
        }

        Ok(Self {
            targets,
            sources,
            friendly_to_model,
            source_short_to_model,
            model_to_entry,
            speech_output: HashSet::new(),
        })
    }

    /// Mark the languages that can be rendered as speech
    pub fn with_speech_output<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = ShortCode>,
    {
        self.speech_output.extend(codes);
        self
    }

    /// Model code of a target language, looked up by its friendly name
    pub fn model_code_for_friendly_name(&self, name: &FriendlyName) -> Option<&ModelCode> {
        self.friendly_to_model.get(name)
    }

    /// Model code of a source language, looked up by its short code.
    ///
    /// Only the registered source languages resolve; a valid ISO code for a
    /// target-only language such as "ta" does not.
    pub fn model_code_for_short_code(&self, code: &ShortCode) -> Option<&ModelCode> {
        self.source_short_to_model.get(code)
    }

    /// Display name for a model code, echoing the code itself when unknown
    pub fn friendly_name_for_model_code(&self, code: &ModelCode) -> FriendlyName {
        self.model_to_entry
            .get(code)
            .map(|e| e.friendly.clone())
            .unwrap_or_else(|| FriendlyName::new(code.as_str()))
    }

    /// Short code for a target language's friendly name
    pub fn short_code_for_friendly_name(&self, name: &FriendlyName) -> Option<&ShortCode> {
        self.friendly_to_model
            .get(name)
            .and_then(|model| self.model_to_entry.get(model))
            .map(|e| &e.short)
    }

    /// Speech voice code for a language, looked up by friendly name.
    ///
    /// Source languages (English) resolve as well as targets. `None` when the
    /// name is unknown or the language has no voice.
    pub fn tts_short_code_for_friendly_name(&self, name: &FriendlyName) -> Option<&ShortCode> {
        self.targets
            .iter()
            .chain(self.sources.iter())
            .find(|e| &e.friendly == name)
            .map(|e| &e.short)
            .filter(|code| self.speech_output.contains(*code))
    }

    /// Whether the short code names an accepted source language
    pub fn is_source_short_code(&self, code: &ShortCode) -> bool {
        self.source_short_to_model.contains_key(code)
    }

    /// Target languages in display order
    pub fn target_languages(&self) -> &[LanguageEntry] {
        &self.targets
    }

    /// Accepted source languages in display order
    pub fn source_languages(&self) -> &[LanguageEntry] {
        &self.sources
    }

    /// Short codes accepted as translation source
    pub fn source_short_codes(&self) -> Vec<&ShortCode> {
        self.sources.iter().map(|e| &e.short).collect()
    }
}

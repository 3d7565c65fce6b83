/*!
 * Offline placeholder backend.
 *
 * Translates a handful of common phrases from a built-in table and renders
 * anything else as `[<language label>: <text>]`. It lets the whole pipeline run
 * without a model server, e.g. for demos and UI work.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::errors::{BackendError, LoadError};
use crate::language_utils::ModelCode;
use crate::providers::{ModelLoader, TranslationPipeline};
use crate::translation::cache::LanguagePair;
use crate::translation::model_source::ModelSource;

/// Native-script label for each target model code
const LABELS: &[(&str, &str)] = &[
    ("asm_Beng", "অসমীয়া"),
    ("ben_Beng", "বাংলা"),
    ("guj_Gujr", "ગુજરાતી"),
    ("hin_Deva", "हिंदी"),
    ("kan_Knda", "ಕನ್ನಡ"),
    ("mal_Mlym", "മലയാളം"),
    ("mar_Deva", "मराठी"),
    ("ory_Orya", "ଓଡ଼ିଆ"),
    ("pan_Guru", "ਪੰਜਾਬੀ"),
    ("tam_Taml", "தமிழ்"),
    ("tel_Telu", "తెలుగు"),
    ("urd_Arab", "اردو"),
];

/// Known phrases per target model code
const PHRASES: &[(&str, &[(&str, &str)])] = &[
    (
        "hin_Deva",
        &[("hello", "नमस्ते"), ("how are you", "आप कैसे हैं"), ("thank you", "धन्यवाद")],
    ),
    (
        "ben_Beng",
        &[("hello", "হ্যালো"), ("how are you", "আপনি কেমন আছেন"), ("thank you", "ধন্যবাদ")],
    ),
    (
        "ory_Orya",
        &[("hello", "ନମସ୍କାର"), ("how are you", "ଆପଣ କେମିତି ଅଛନ୍ତି"), ("thank you", "ଧନ୍ୟବାଦ")],
    ),
    (
        "tam_Taml",
        &[("hello", "வணக்கம்"), ("how are you", "நீங்கள் எப்படி இருக்கிறீர்கள்"), ("thank you", "நன்றி")],
    ),
    (
        "tel_Telu",
        &[("hello", "హలో"), ("how are you", "మీరు ఎలా ఉన్నారు"), ("thank you", "ధన్యవాదాలు")],
    ),
];

static PHRASEBOOK: Lazy<HashMap<&'static str, HashMap<&'static str, &'static str>>> = Lazy::new(|| {
    PHRASES
        .iter()
        .map(|(code, phrases)| (*code, phrases.iter().copied().collect()))
        .collect()
});

/// Loader for the offline phrasebook backend; never fails
#[derive(Debug, Clone, Default)]
pub struct PhrasebookLoader;

impl PhrasebookLoader {
    /// Create a phrasebook loader
    pub fn new() -> Self {
        Self
    }
}

/// The phrasebook needs no tokenizer state
#[derive(Debug)]
pub struct PhrasebookTokenizer;

/// Phrase tables for every target language
#[derive(Debug)]
pub struct PhrasebookModel {
    tables: &'static HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

#[async_trait]
impl ModelLoader for PhrasebookLoader {
    type Tokenizer = PhrasebookTokenizer;
    type Model = PhrasebookModel;
    type Pipeline = PhrasebookPipeline;

    async fn load_tokenizer(
        &self,
        _source: &ModelSource,
        _src_lang: &ModelCode,
    ) -> Result<Self::Tokenizer, LoadError> {
        Ok(PhrasebookTokenizer)
    }

    async fn load_model(&self, _source: &ModelSource) -> Result<Self::Model, LoadError> {
        Ok(PhrasebookModel { tables: &PHRASEBOOK })
    }

    async fn build_pipeline(
        &self,
        model: Arc<Self::Model>,
        _tokenizer: Arc<Self::Tokenizer>,
        pair: &LanguagePair,
        _max_length: usize,
    ) -> Result<Self::Pipeline, LoadError> {
        let label = LABELS
            .iter()
            .find(|(code, _)| *code == pair.target().as_str())
            .map_or_else(|| pair.target().to_string(), |(_, label)| (*label).to_string());

        Ok(PhrasebookPipeline {
            passthrough: pair.source() == pair.target(),
            phrases: model.tables.get(pair.target().as_str()),
            label,
        })
    }
}

/// Phrasebook pipeline for one language pair
#[derive(Debug)]
pub struct PhrasebookPipeline {
    passthrough: bool,
    phrases: Option<&'static HashMap<&'static str, &'static str>>,
    label: String,
}

impl PhrasebookPipeline {
    fn render(&self, text: &str) -> String {
        if self.passthrough {
            return text.to_string();
        }
        let key = text
            .trim()
            .trim_end_matches(&['.', '!', '?'][..])
            .to_lowercase();
        match self.phrases.and_then(|p| p.get(key.as_str())) {
            Some(phrase) => (*phrase).to_string(),
            None => format!("[{}: {}]", self.label, text),
        }
    }
}

#[async_trait]
impl TranslationPipeline for PhrasebookPipeline {
    async fn translate(&self, inputs: &[String]) -> Result<Vec<String>, BackendError> {
        Ok(inputs.iter().map(|text| self.render(text)).collect())
    }
}

/*!
 * Source text extraction from typed text, images and audio, and speech
 * output for translations.
 *
 * OCR, speech-to-text and speech synthesis engines are external collaborators
 * behind the `OcrEngine`, `SpeechToText` and `SpeechSynthesizer` traits.
 * Whatever language OCR or speech-to-text report is only kept when it is an
 * accepted source language; otherwise English is assumed and
 * `SourceText::substituted` is set so callers can warn the user.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::detection::LanguageDetector;
use crate::errors::{ExtractionError, SpeechError};
use crate::language_utils::{FriendlyName, LanguageCodeRegistry, ShortCode};

/// Image extensions accepted for OCR
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Audio extensions accepted for speech-to-text
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a"];

/// Language assumed when none of the reported ones is usable
const FALLBACK_SOURCE: &str = "en";

/// Extracts text from an image
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognised text (empty on failure) and, if known, its language
    async fn extract_text(&self, image_path: &Path) -> (String, Option<ShortCode>);
}

/// Transcribes an audio recording
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcript and detected language, or `None` if transcription failed
    async fn transcribe(
        &self,
        audio_path: &Path,
        language_hint: Option<&ShortCode>,
    ) -> Option<(String, Option<ShortCode>)>;
}

/// Renders text as spoken audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// MP3 audio of `text` read in `language`, or `None` if synthesis failed
    async fn synthesize(&self, text: &str, language: &ShortCode) -> Option<Vec<u8>>;
}

/// Where the text to translate comes from
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// Typed text; its language is detected
    Text(String),
    /// Image file run through OCR
    Image(PathBuf),
    /// Audio file run through speech-to-text
    Audio {
        /// Recording to transcribe
        path: PathBuf,
        /// Language to force on the transcriber
        hint: Option<ShortCode>,
    },
}

impl SourceInput {
    /// Short label used in messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "ocr",
            Self::Audio { .. } => "audio",
        }
    }
}

/// Text ready for translation with its chosen source language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// Extracted text
    pub text: String,
    /// Source language to translate from; always an accepted source code
    pub language: ShortCode,
    /// Language reported by the detector or engine, if any
    pub detected: Option<ShortCode>,
    /// Whether `language` replaced an unusable detected language
    pub substituted: bool,
}

/// Turn an input into translatable text.
///
/// # Arguments
/// * `input` - Typed text or a file to run through OCR / speech-to-text
/// * `ocr` - OCR engine for images
/// * `stt` - Speech-to-text engine for audio
/// * `detector` - Detector for typed text
/// * `registry` - Registry deciding which source languages are accepted
///
/// # Returns
/// * `Result<SourceText, ExtractionError>` - Text and source language, or why extraction failed
pub async fn extract_source_text(
    input: SourceInput,
    ocr: &dyn OcrEngine,
    stt: &dyn SpeechToText,
    detector: &dyn LanguageDetector,
    registry: &LanguageCodeRegistry,
) -> Result<SourceText, ExtractionError> {
    let kind = input.kind();

    let (text, detected) = match input {
        SourceInput::Text(text) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(ExtractionError::EmptyText);
            }
            let detected = detector.detect(&text);
            (text, detected)
        }
        SourceInput::Image(path) => {
            check_file(&path, IMAGE_EXTENSIONS)?;
            debug!("Performing OCR on {}", path.display());
            ocr.extract_text(&path).await
        }
        SourceInput::Audio { path, hint } => {
            check_file(&path, AUDIO_EXTENSIONS)?;
            debug!("Performing STT on {}", path.display());
            stt.transcribe(&path, hint.as_ref())
                .await
                .ok_or_else(|| ExtractionError::NoText(kind.to_string()))?
        }
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText(kind.to_string()));
    }

    let usable = detected
        .as_ref()
        .filter(|code| registry.is_source_short_code(code))
        .cloned();
    let substituted = usable.is_none();
    if substituted {
        warn!(
            "Detected language '{}' is not supported as a source; assuming '{}'",
            detected.as_ref().map_or("unknown", |c| c.as_str()),
            FALLBACK_SOURCE
        );
    }

    Ok(SourceText {
        text,
        language: usable.unwrap_or_else(|| ShortCode::new(FALLBACK_SOURCE)),
        detected,
        substituted,
    })
}

/// Render a translation as MP3 audio in the voice for `target`.
///
/// Languages without a voice (Odia, Assamese) are rejected before the
/// synthesizer is called.
pub async fn render_speech(
    text: &str,
    target: &FriendlyName,
    tts: &dyn SpeechSynthesizer,
    registry: &LanguageCodeRegistry,
) -> Result<Vec<u8>, SpeechError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SpeechError::EmptyText);
    }
    let voice = registry
        .tts_short_code_for_friendly_name(target)
        .ok_or_else(|| SpeechError::UnsupportedLanguage(target.to_string()))?;

    debug!("Synthesizing {} characters of speech in '{}'", text.chars().count(), voice);
    match tts.synthesize(text, voice).await {
        Some(audio) if !audio.is_empty() => Ok(audio),
        _ => Err(SpeechError::SynthesisFailed(target.to_string())),
    }
}

/// Check that a file exists and has an accepted extension
fn check_file(path: &Path, allowed: &[&str]) -> Result<(), ExtractionError> {
    if !path.is_file() {
        return Err(ExtractionError::MissingFile(path.display().to_string()));
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if allowed.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ExtractionError::UnsupportedFileType(path.display().to_string()))
    }
}

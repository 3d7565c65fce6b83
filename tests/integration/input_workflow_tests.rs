/*!
 * Integration tests for OCR / speech input feeding translation
 */

use async_trait::async_trait;
use std::path::Path;

use anuvad::detection::WhatlangDetector;
use anuvad::errors::{ExtractionError, SpeechError};
use anuvad::language_utils::{LanguageCodeRegistry, ShortCode};
use anuvad::providers::mock::MockLoader;
use anuvad::translation::{
    OcrEngine, SourceInput, SpeechSynthesizer, SpeechToText, extract_source_text, render_speech,
};

use crate::common::{self, name};

/// OCR stub that returns fixed text and reports no language
struct StubOcr(&'static str);

#[async_trait]
impl OcrEngine for StubOcr {
    async fn extract_text(&self, _image_path: &Path) -> (String, Option<ShortCode>) {
        (self.0.to_string(), None)
    }
}

/// Speech-to-text stub returning a fixed transcript
struct StubStt(Option<(&'static str, &'static str)>);

#[async_trait]
impl SpeechToText for StubStt {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        language_hint: Option<&ShortCode>,
    ) -> Option<(String, Option<ShortCode>)> {
        self.0.map(|(text, detected)| {
            let language = language_hint.cloned().unwrap_or_else(|| ShortCode::new(detected));
            (text.to_string(), Some(language))
        })
    }
}

/// Synthesizer stub recording the voice it was asked for
struct StubTts;

#[async_trait]
impl SpeechSynthesizer for StubTts {
    async fn synthesize(&self, _text: &str, language: &ShortCode) -> Option<Vec<u8>> {
        Some(language.as_str().as_bytes().to_vec())
    }
}

#[tokio::test]
async fn test_ocrInput_withSpacedMisreads_shouldTranslateCleanedText() {
    let dir = common::create_temp_dir().unwrap();
    let image = common::create_test_file(dir.path(), "menu.jpg", b"\xFF\xD8").unwrap();

    let source = extract_source_text(
        SourceInput::Image(image),
        &StubOcr("Choose  your Iang uage\nin the dpp"),
        &StubStt(None),
        &WhatlangDetector::new(),
        LanguageCodeRegistry::standard(),
    )
    .await
    .unwrap();
    assert_eq!(source.language.as_str(), "en");
    assert!(source.substituted);

    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let out = orchestrator
        .translate(&source.text, &source.language, &name("Tamil"))
        .await
        .unwrap();
    assert_eq!(out, "Choose your language in the app");
}

#[tokio::test]
async fn test_audioInput_withHint_shouldKeepHintedLanguage() {
    let dir = common::create_temp_dir().unwrap();
    let audio = common::create_test_file(dir.path(), "note.ogg", b"OggS").unwrap();

    let source = extract_source_text(
        SourceInput::Audio {
            path: audio,
            hint: Some(ShortCode::new("hi")),
        },
        &StubOcr(""),
        &StubStt(Some(("मुझे पानी चाहिए", "ur"))),
        &WhatlangDetector::new(),
        LanguageCodeRegistry::standard(),
    )
    .await
    .unwrap();

    assert_eq!(source.language.as_str(), "hi");
    assert!(!source.substituted);
}

#[tokio::test]
async fn test_audioInput_withFailedTranscription_shouldNameInputKind() {
    let dir = common::create_temp_dir().unwrap();
    let audio = common::create_test_file(dir.path(), "noise.flac", b"fLaC").unwrap();

    let err = extract_source_text(
        SourceInput::Audio { path: audio, hint: None },
        &StubOcr(""),
        &StubStt(None),
        &WhatlangDetector::new(),
        LanguageCodeRegistry::standard(),
    )
    .await
    .unwrap_err();

    assert_eq!(err, ExtractionError::NoText("audio".to_string()));
    assert_eq!(err.to_string(), "Could not extract text using audio.");
}

#[tokio::test]
async fn test_textInput_withOnlySpaces_shouldFail() {
    let err = extract_source_text(
        SourceInput::Text("   ".to_string()),
        &StubOcr(""),
        &StubStt(None),
        &WhatlangDetector::new(),
        LanguageCodeRegistry::standard(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, ExtractionError::EmptyText);
}

#[tokio::test]
async fn test_speechOutput_forTranslatedText_shouldUseTargetVoiceOrReject() {
    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let registry = LanguageCodeRegistry::standard();

    let kannada = orchestrator
        .translate("Good morning.", &common::code("en"), &name("Kannada"))
        .await
        .unwrap();
    let audio = render_speech(&kannada, &name("Kannada"), &StubTts, registry).await.unwrap();
    assert_eq!(audio, b"kn".to_vec());

    let assamese = orchestrator
        .translate("Good morning.", &common::code("en"), &name("Assamese"))
        .await
        .unwrap();
    let err = render_speech(&assamese, &name("Assamese"), &StubTts, registry)
        .await
        .unwrap_err();
    assert_eq!(err, SpeechError::UnsupportedLanguage("Assamese".to_string()));
}

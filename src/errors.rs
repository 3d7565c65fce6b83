/*!
 * Error types for the anuvad library.
 *
 * This module contains custom error types for the different layers of the
 * translation core, using the thiserror crate for ergonomic error definitions.
 *
 * Only `TranslationError` crosses the public boundary of the orchestrator.
 * `LoadError` stays inside the pipeline cache; once its retries are exhausted it
 * is reclassified as `TranslationError::BackendUnavailable`.
 */

use thiserror::Error;

/// Errors raised while constructing a translation pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Network-level failure that may succeed on a later attempt
    #[error("transient load failure: {0}")]
    Transient(String),

    /// Failure that will not go away by retrying
    #[error("load failure: {0}")]
    Permanent(String),
}

impl LoadError {
    /// Whether the pipeline cache should retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Errors returned by a loaded pipeline for a single call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request to the backend could not be completed
    #[error("backend request failed: {0}")]
    RequestFailed(String),

    /// The backend answered with no usable text
    #[error("backend returned an empty translation")]
    EmptyResult,

    /// The backend answered with something we could not interpret
    #[error("backend returned a malformed result: {0}")]
    MalformedResult(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Nothing left to translate after trimming
    #[error("No text provided for translation.")]
    EmptyInput,

    /// Source short code is not one of the accepted source languages
    #[error("Source language short code '{0}' is not a supported source language.")]
    UnsupportedSourceLanguage(String),

    /// Target friendly name is not a known target language
    #[error("Target language name '{0}' is not a supported target language.")]
    UnknownTargetLanguage(String),

    /// The pipeline for this language pair failed to load for this process
    #[error("Translator pipeline for {source_lang} -> {target_lang} is not available: {reason}")]
    BackendUnavailable {
        /// Source model code
        source_lang: String,
        /// Target model code
        target_lang: String,
        /// Why construction failed
        reason: String,
    },

    /// The pipeline loaded but this particular call failed
    #[error("Translation failed: {0}")]
    Invocation(#[from] BackendError),
}

impl TranslationError {
    /// Whether the caller can fix this error by changing the input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::UnsupportedSourceLanguage(_) | Self::UnknownTargetLanguage(_)
        )
    }
}

/// Errors raised while turning an image or recording into source text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The OCR engine or transcriber produced no text
    #[error("Could not extract text using {0}.")]
    NoText(String),

    /// Plain text input was empty
    #[error("No text provided.")]
    EmptyText,

    /// The input file does not exist
    #[error("Input file not found: {0}")]
    MissingFile(String),

    /// The file extension is not accepted for this kind of input
    #[error("File type not allowed: {0}")]
    UnsupportedFileType(String),
}

/// Errors found while validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric setting is out of range
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A language name in the config is unknown
    #[error("Unknown language in configuration: {0}")]
    UnknownLanguage(String),

    /// Two registry entries share a name or code
    #[error("Inconsistent language registry: {0}")]
    InconsistentRegistry(String),
}

/// Errors raised while rendering a translation as speech
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// Nothing to speak
    #[error("No text provided for speech.")]
    EmptyText,

    /// The language has no speech voice
    #[error("Speech output is not available for {0}.")]
    UnsupportedLanguage(String),

    /// The synthesizer produced no audio
    #[error("Speech synthesis failed for {0}.")]
    SynthesisFailed(String),
}

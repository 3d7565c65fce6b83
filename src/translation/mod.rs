/*!
 * Translation core.
 *
 * The pieces a translation request passes through, in order:
 *
 * - `input`: source text extraction from typed text, images and audio
 * - `normalizer`: whitespace, punctuation and OCR clean-up plus `dictionary` overrides
 * - `chunker`: splitting into sentence groups or word windows
 * - `cache`: lazily built, shared per-pair pipelines (`model_source`, `retry`)
 * - `orchestrator`: the public entry point composing all of the above
 *
 * `input::render_speech` turns a finished translation into audio.
 */

// Re-export main types for easier usage
pub use self::cache::{CacheSettings, LanguagePair, PipelineCache, PipelineStatus};
pub use self::chunker::{TextChunk, TextChunker};
pub use self::dictionary::ManualOverrideDictionary;
pub use self::input::{
    OcrEngine, SourceInput, SourceText, SpeechSynthesizer, SpeechToText, extract_source_text, render_speech,
};
pub use self::model_source::ModelSource;
pub use self::normalizer::TextNormalizer;
pub use self::orchestrator::TranslationOrchestrator;
pub use self::retry::{Backoff, RetryPolicy};

// Submodules
pub mod cache;
pub mod chunker;
pub mod dictionary;
pub mod input;
pub mod model_source;
pub mod normalizer;
pub mod orchestrator;
pub mod retry;

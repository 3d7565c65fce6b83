/*!
 * # Anuvad - text translation into Indian languages
 *
 * A Rust library for translating short English and Hindi texts into twelve
 * Indian languages with a neural translation model.
 *
 * ## Features
 *
 * - Translate typed text, OCR output or speech transcripts
 * - Optional speech output through a pluggable synthesizer
 * - Twelve target languages: Assamese, Bengali, Gujarati, Hindi, Kannada,
 *   Malayalam, Marathi, Odia, Punjabi, Tamil, Telugu, Urdu
 * - Automatic source detection (`auto`) from script and trigram statistics
 * - Manual overrides for brand and technical terms
 * - Sentence-aware chunking of long inputs
 * - One lazily loaded pipeline per language pair, shared by all callers,
 *   with bounded retries on transient load failures
 * - Pluggable backends:
 *   - Phrasebook (offline placeholder)
 *   - Inference server (HTTP)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `language_utils`: Friendly names, short codes and model codes
 * - `detection`: Source language detection
 * - `translation`: The translation core:
 *   - `translation::normalizer`: Input clean-up and `translation::dictionary` overrides
 *   - `translation::chunker`: Sentence and word-window chunking
 *   - `translation::cache`: Per-pair pipeline cache
 *   - `translation::orchestrator`: Public entry point
 *   - `translation::input`: OCR, speech-to-text and speech output
 * - `providers`: Model loaders and pipelines:
 *   - `providers::phrasebook`: Offline placeholder backend
 *   - `providers::inference_server`: HTTP model server client
 *   - `providers::mock`: Counting mock for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod detection;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use detection::{LanguageDetector, WhatlangDetector};
pub use errors::TranslationError;
pub use language_utils::{FriendlyName, LanguageCodeRegistry, ModelCode, ShortCode};
pub use translation::{PipelineCache, TranslationOrchestrator};

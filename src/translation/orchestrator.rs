/*!
 * Public translation entry point.
 *
 * `TranslationOrchestrator` resolves language names and codes, normalizes and
 * chunks the input, fetches the pair's pipeline from the shared cache and
 * translates chunk by chunk, in order. Every failure is returned as a
 * `TranslationError`; a partially translated text is never returned.
 */

use log::{debug, info};
use std::sync::Arc;

use crate::detection::{LanguageDetector, WhatlangDetector};
use crate::errors::{BackendError, TranslationError};
use crate::language_utils::{FriendlyName, LanguageCodeRegistry, ShortCode};
use crate::providers::{ModelLoader, TranslationPipeline};

use super::cache::{LanguagePair, PipelineCache, PipelineStatus};
use super::chunker::TextChunker;
use super::dictionary::ManualOverrideDictionary;
use super::normalizer::TextNormalizer;

/// Source assumed when detection cannot tell the language
const DEFAULT_SOURCE: &str = "en";

/// Composes registry, normalizer, chunker and pipeline cache
pub struct TranslationOrchestrator<L: ModelLoader, D: LanguageDetector = WhatlangDetector> {
    cache: Arc<PipelineCache<L>>,
    registry: Arc<LanguageCodeRegistry>,
    normalizer: TextNormalizer,
    chunker: TextChunker,
    detector: Arc<D>,
}

impl<L: ModelLoader, D: LanguageDetector> Clone for TranslationOrchestrator<L, D> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            registry: self.registry.clone(),
            normalizer: self.normalizer.clone(),
            chunker: self.chunker.clone(),
            detector: self.detector.clone(),
        }
    }
}

impl<L: ModelLoader> TranslationOrchestrator<L, WhatlangDetector> {
    /// Orchestrator with the standard registry, built-in dictionaries,
    /// default chunking and `WhatlangDetector`
    pub fn with_defaults(cache: Arc<PipelineCache<L>>) -> Self {
        Self::new(
            cache,
            Arc::new(LanguageCodeRegistry::standard().clone()),
            Arc::new(ManualOverrideDictionary::builtin()),
            TextChunker::default(),
            WhatlangDetector::new(),
        )
    }
}

impl<L: ModelLoader, D: LanguageDetector> TranslationOrchestrator<L, D> {
    /// Create an orchestrator around an existing pipeline cache
    pub fn new(
        cache: Arc<PipelineCache<L>>,
        registry: Arc<LanguageCodeRegistry>,
        dictionary: Arc<ManualOverrideDictionary>,
        chunker: TextChunker,
        detector: D,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(registry.clone(), dictionary),
            cache,
            registry,
            chunker,
            detector: Arc::new(detector),
        }
    }

    /// The shared pipeline cache
    pub fn cache(&self) -> &Arc<PipelineCache<L>> {
        &self.cache
    }

    /// The language registry in use
    pub fn registry(&self) -> &LanguageCodeRegistry {
        &self.registry
    }

    /// Translate a text.
    ///
    /// # Arguments
    /// * `text` - Text to translate
    /// * `source` - Source short code, or `auto` to detect it from `text`
    /// * `target` - Target language friendly name
    ///
    /// # Returns
    /// * `Result<String, TranslationError>` - Full translation, chunk translations joined by spaces
    pub async fn translate(
        &self,
        text: &str,
        source: &ShortCode,
        target: &FriendlyName,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let pair = self.resolve_pair(Some(text), source, target)?;
        let normalized = self.normalizer.normalize(text, target);
        let chunks = self.chunker.chunk(&normalized);
        if chunks.is_empty() {
            return Err(TranslationError::EmptyInput);
        }
        debug!("Translating {} chunk(s) for {}", chunks.len(), pair);

        let pipeline = self.cache.get(&pair).await?;

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            translated.push(pipeline.translate_one(&chunk.text).await?);
        }
        Ok(translated.join(" "))
    }

    /// Translate several short texts with one pipeline call.
    ///
    /// Items are normalized but not chunked. Blank items stay blank in the
    /// output and are not sent to the backend.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source: &ShortCode,
        target: &FriendlyName,
    ) -> Result<Vec<String>, TranslationError> {
        let joined = texts.join(" ");
        let pair = self.resolve_pair(Some(&joined), source, target)?;

        let normalized: Vec<String> = texts
            .iter()
            .map(|text| self.normalizer.normalize(text, target))
            .collect();
        let pending: Vec<usize> = normalized
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.is_empty())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return Ok(normalized);
        }

        let pipeline = self.cache.get(&pair).await?;
        let inputs: Vec<String> = pending.iter().map(|&i| normalized[i].clone()).collect();
        debug!("Translating batch of {} item(s) for {}", inputs.len(), pair);
        let outputs = pipeline.translate(&inputs).await?;

        if outputs.len() != inputs.len() {
            return Err(BackendError::MalformedResult(format!(
                "expected {} translations, got {}",
                inputs.len(),
                outputs.len()
            ))
            .into());
        }

        let mut results = normalized;
        for (i, output) in pending.into_iter().zip(outputs) {
            if output.trim().is_empty() {
                return Err(BackendError::EmptyResult.into());
            }
            results[i] = output;
        }
        Ok(results)
    }

    /// Whether the pair's pipeline is loaded, without triggering a load
    pub fn is_language_pair_available(&self, source: &ShortCode, target: &FriendlyName) -> bool {
        self.resolve_pair(None, source, target)
            .map(|pair| self.cache.is_ready(&pair))
            .unwrap_or(false)
    }

    /// Lifecycle state of a pair's pipeline, without triggering a load
    pub fn pair_status(&self, source: &ShortCode, target: &FriendlyName) -> Result<PipelineStatus, TranslationError> {
        let pair = self.resolve_pair(None, source, target)?;
        Ok(self.cache.status(&pair))
    }

    /// Status of every target language for one source
    pub fn model_status(&self, source: &ShortCode) -> Result<Vec<(FriendlyName, PipelineStatus)>, TranslationError> {
        self.registry
            .target_languages()
            .iter()
            .map(|entry| {
                self.pair_status(source, &entry.friendly)
                    .map(|status| (entry.friendly.clone(), status))
            })
            .collect()
    }

    /// Resolve the source short code and target name into a model-code pair.
    ///
    /// `auto` is resolved by detecting the language of `text`; without text,
    /// or when detection fails, English is assumed.
    fn resolve_pair(
        &self,
        text: Option<&str>,
        source: &ShortCode,
        target: &FriendlyName,
    ) -> Result<LanguagePair, TranslationError> {
        let source = if source.is_auto() {
            let detected = text
                .and_then(|t| self.detector.detect(t))
                .unwrap_or_else(|| ShortCode::new(DEFAULT_SOURCE));
            info!("Detected source language: {}", detected);
            detected
        } else {
            source.clone()
        };

        let source_model = self
            .registry
            .model_code_for_short_code(&source)
            .ok_or_else(|| TranslationError::UnsupportedSourceLanguage(source.to_string()))?;
        let target_model = self
            .registry
            .model_code_for_friendly_name(target)
            .ok_or_else(|| TranslationError::UnknownTargetLanguage(target.to_string()))?;

        Ok(LanguagePair::new(source_model.clone(), target_model.clone()))
    }
}

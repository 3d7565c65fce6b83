/*!
 * Translation model providers.
 *
 * A provider knows how to load a tokenizer and model weights for a base model
 * and how to bind them into a pipeline for one language pair:
 * - `phrasebook`: offline placeholder backend, always available
 * - `inference_server`: model server reached over HTTP
 * - `mock`: configurable loader for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{BackendError, LoadError};
use crate::language_utils::ModelCode;
use crate::translation::cache::LanguagePair;
use crate::translation::model_source::ModelSource;

/// A loaded translation model bound to one language pair
#[async_trait]
pub trait TranslationPipeline: Send + Sync + Debug {
    /// Translate every input, returning one output per input in the same order
    ///
    /// # Arguments
    /// * `inputs` - Texts to translate in a single backend call
    ///
    /// # Returns
    /// * `Result<Vec<String>, BackendError>` - Translations or the reason the call failed
    async fn translate(&self, inputs: &[String]) -> Result<Vec<String>, BackendError>;

    /// Translate a single text, rejecting empty or missing output
    async fn translate_one(&self, text: &str) -> Result<String, BackendError> {
        let mut outputs = self.translate(&[text.to_string()]).await?;
        if outputs.len() != 1 {
            return Err(BackendError::MalformedResult(format!(
                "expected 1 translation, got {}",
                outputs.len()
            )));
        }
        let output = outputs.remove(0);
        if output.trim().is_empty() {
            return Err(BackendError::EmptyResult);
        }
        Ok(output)
    }
}

/// Loads the pieces of a translation pipeline
///
/// The pipeline cache calls these in order: tokenizer, model, pipeline.
/// Tokenizers and models are shared by every language pair that uses the same
/// base model; pipelines are built once per pair.
#[async_trait]
pub trait ModelLoader: Send + Sync + Debug {
    /// Tokenizer handle shared across pairs of one base model
    type Tokenizer: Send + Sync + Debug + 'static;

    /// Loaded model weights shared across pairs of one base model
    type Model: Send + Sync + Debug + 'static;

    /// Pipeline bound to one language pair
    type Pipeline: TranslationPipeline + 'static;

    /// Load the tokenizer of a base model
    ///
    /// # Arguments
    /// * `source` - Where the model lives
    /// * `src_lang` - Source language of the pair that triggered the load
    async fn load_tokenizer(
        &self,
        source: &ModelSource,
        src_lang: &ModelCode,
    ) -> Result<Self::Tokenizer, LoadError>;

    /// Load model weights
    async fn load_model(&self, source: &ModelSource) -> Result<Self::Model, LoadError>;

    /// Bind a model and tokenizer to one language pair.
    ///
    /// The tokenizer is shared, so pipelines must set the pair's source
    /// language on every call rather than rely on the tokenizer's initial one.
    async fn build_pipeline(
        &self,
        model: Arc<Self::Model>,
        tokenizer: Arc<Self::Tokenizer>,
        pair: &LanguagePair,
        max_length: usize,
    ) -> Result<Self::Pipeline, LoadError>;
}

pub mod inference_server;
pub mod mock;
pub mod phrasebook;

/*!
 * Process-wide cache of translation pipelines.
 *
 * One pipeline is built per ordered language pair, on first request, and kept
 * for the life of the cache. Construction is single-flight: concurrent
 * requests for a pair that is still loading wait for the one construction in
 * progress instead of starting their own. Different pairs load independently.
 *
 * Transient load failures are retried according to the cache's `RetryPolicy`.
 * Once retries are exhausted, or on any permanent failure, the pair is marked
 * failed and every later request gets `TranslationError::BackendUnavailable`
 * without another load attempt.
 *
 * Tokenizers and model weights are shared between pairs that use the same
 * base model, with the same single-flight guarantee per base model. A failed
 * tokenizer or model load leaves its shared cell empty.
 *
 * Attempts are counted per pair, not per caller. If the caller driving a
 * construction is dropped, the next caller resumes from the attempt count
 * already reached, so a pair is never tried more than `max_attempts` times.
 */

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use tokio::sync::OnceCell;

use crate::app_config::ModelConfig;
use crate::errors::{LoadError, TranslationError};
use crate::language_utils::ModelCode;
use crate::providers::ModelLoader;

use super::model_source::ModelSource;
use super::retry::RetryPolicy;

/// Ordered (source, target) pair of model codes; the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    source: ModelCode,
    target: ModelCode,
}

impl LanguagePair {
    /// Create a pair translating from `source` into `target`
    pub fn new(source: ModelCode, target: ModelCode) -> Self {
        Self { source, target }
    }

    /// Source model code
    pub fn source(&self) -> &ModelCode {
        &self.source
    }

    /// Target model code
    pub fn target(&self) -> &ModelCode {
        &self.target
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Observable lifecycle of one pair's pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Never requested
    Unloaded,
    /// Construction in progress
    Loading {
        /// Current attempt, starting at 1
        attempt: u32,
    },
    /// Ready to translate
    Ready,
    /// Permanently unavailable for this process
    Failed {
        /// Why construction failed
        reason: String,
    },
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "not loaded"),
            Self::Loading { attempt } => write!(f, "loading (attempt {})", attempt),
            Self::Ready => write!(f, "ready"),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Settings for building pipelines
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Remote identifier of the base model
    pub model_id: String,
    /// Local directory checked before falling back to `model_id`
    pub local_model_dir: Option<PathBuf>,
    /// Maximum output length passed to every pipeline
    pub max_output_length: usize,
    /// Retry policy for transient load failures
    pub retry: RetryPolicy,
}

impl CacheSettings {
    /// Settings from the model section of the configuration
    pub fn from_config(config: &ModelConfig, retry: RetryPolicy) -> Self {
        Self {
            model_id: config.model_id.clone(),
            local_model_dir: config.local_model_dir.clone(),
            max_output_length: config.max_output_length,
            retry,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default(), RetryPolicy::default())
    }
}

/// Final result of constructing a pair's pipeline
type Outcome<P> = Result<Arc<P>, String>;

/// Cache slot for one language pair
struct PairSlot<P> {
    outcome: OnceCell<Outcome<P>>,
    attempt: AtomicU32,
}

impl<P> PairSlot<P> {
    fn new() -> Self {
        Self {
            outcome: OnceCell::new(),
            attempt: AtomicU32::new(0),
        }
    }
}

/// Map of lazily initialised shared values
type SharedCells<K, V> = RwLock<HashMap<K, Arc<OnceCell<Arc<V>>>>>;

/// Lazily built translation pipelines, one per language pair
pub struct PipelineCache<L: ModelLoader> {
    loader: L,
    settings: CacheSettings,
    pairs: RwLock<HashMap<LanguagePair, Arc<PairSlot<L::Pipeline>>>>,
    tokenizers: SharedCells<String, L::Tokenizer>,
    models: SharedCells<String, L::Model>,
}

impl<L: ModelLoader> fmt::Debug for PipelineCache<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineCache")
            .field("loader", &self.loader)
            .field("settings", &self.settings)
            .field("pairs", &self.pairs.read().len())
            .finish()
    }
}

impl<L: ModelLoader> PipelineCache<L> {
    /// Create an empty cache
    pub fn new(loader: L, settings: CacheSettings) -> Self {
        Self {
            loader,
            settings,
            pairs: RwLock::new(HashMap::new()),
            tokenizers: RwLock::new(HashMap::new()),
            models: RwLock::new(HashMap::new()),
        }
    }

    /// The loader used to build pipelines
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Settings used to build pipelines
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Get the pipeline for a pair, building it on first use.
    ///
    /// Returns `TranslationError::BackendUnavailable` if the pair failed to load,
    /// now or on an earlier call.
    pub async fn get(&self, pair: &LanguagePair) -> Result<Arc<L::Pipeline>, TranslationError> {
        let slot = self.slot(pair);

        let outcome = match slot.outcome.get() {
            Some(outcome) => outcome,
            None => {
                info!("Translation pipeline cache miss for: {}. Attempting to load.", pair);
                slot.outcome.get_or_init(|| self.construct(pair, &slot)).await
            }
        };

        outcome.clone().map_err(|reason| TranslationError::BackendUnavailable {
            source_lang: pair.source.to_string(),
            target_lang: pair.target.to_string(),
            reason,
        })
    }

    /// Current state of a pair, without triggering a load
    pub fn status(&self, pair: &LanguagePair) -> PipelineStatus {
        let pairs = self.pairs.read();
        let Some(slot) = pairs.get(pair) else {
            return PipelineStatus::Unloaded;
        };

        match slot.outcome.get() {
            Some(Ok(_)) => PipelineStatus::Ready,
            Some(Err(reason)) => PipelineStatus::Failed {
                reason: reason.clone(),
            },
            None => match slot.attempt.load(Ordering::SeqCst) {
                0 => PipelineStatus::Unloaded,
                attempt => PipelineStatus::Loading { attempt },
            },
        }
    }

    /// Whether a pair has a ready pipeline
    pub fn is_ready(&self, pair: &LanguagePair) -> bool {
        self.status(pair) == PipelineStatus::Ready
    }

    /// Number of pairs that have been requested at least once
    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    /// Whether no pair has been requested yet
    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }

    /// Number of base-model tokenizers loaded so far
    pub fn loaded_tokenizers(&self) -> usize {
        self.tokenizers.read().values().filter(|cell| cell.initialized()).count()
    }

    /// Fetch or create the slot for a pair
    fn slot(&self, pair: &LanguagePair) -> Arc<PairSlot<L::Pipeline>> {
        if let Some(slot) = self.pairs.read().get(pair) {
            return slot.clone();
        }
        self.pairs
            .write()
            .entry(pair.clone())
            .or_insert_with(|| Arc::new(PairSlot::new()))
            .clone()
    }

    /// Build a pipeline, retrying transient failures
    async fn construct(&self, pair: &LanguagePair, slot: &PairSlot<L::Pipeline>) -> Outcome<L::Pipeline> {
        let retry = self.settings.retry;
        let max_attempts = retry.max_attempts();
        let mut attempt = slot.attempt.load(Ordering::SeqCst);
        if attempt > 0 {
            info!("Resuming construction of {} after {} interrupted attempt(s)", pair, attempt);
        }

        loop {
            if attempt >= max_attempts {
                error!("No attempts left for pipeline {} after interrupted construction", pair);
                return Err(format!("gave up after {} attempts: construction was interrupted", max_attempts));
            }
            attempt += 1;
            slot.attempt.store(attempt, Ordering::SeqCst);
            debug!("Loading pipeline {} (attempt {}/{})", pair, attempt, max_attempts);

            match self.try_construct(pair).await {
                Ok(pipeline) => {
                    info!("Pipeline created and cached for {}.", pair);
                    return Ok(Arc::new(pipeline));
                }
                Err(LoadError::Transient(msg)) if attempt < max_attempts => {
                    let delay = retry.delay_after(attempt);
                    warn!(
                        "Transient error loading {} (attempt {}/{}): {}. Retrying in {:?}...",
                        pair, attempt, max_attempts, msg, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(LoadError::Transient(msg)) => {
                    error!("Failed to load pipeline {} after {} attempts: {}", pair, max_attempts, msg);
                    return Err(format!("gave up after {} attempts: {}", max_attempts, msg));
                }
                Err(LoadError::Permanent(msg)) => {
                    error!("Error loading translation pipeline {} (attempt {}): {}", pair, attempt, msg);
                    return Err(msg);
                }
            }
        }
    }

    /// One construction attempt: tokenizer, model, then pipeline
    async fn try_construct(&self, pair: &LanguagePair) -> Result<L::Pipeline, LoadError> {
        let source = ModelSource::resolve(self.settings.local_model_dir.as_deref(), &self.settings.model_id);
        let key = source.identifier();

        let tokenizer = shared_cell(&self.tokenizers, &key)
            .get_or_try_init(|| async {
                info!("Loading tokenizer for: {}", source);
                self.loader.load_tokenizer(&source, &pair.source).await.map(Arc::new)
            })
            .await?
            .clone();

        let model = shared_cell(&self.models, &key)
            .get_or_try_init(|| async {
                info!("Loading model: {}", source);
                self.loader.load_model(&source).await.map(Arc::new)
            })
            .await?
            .clone();

        debug!("Creating translation pipeline: {}", pair);
        self.loader
            .build_pipeline(model, tokenizer, pair, self.settings.max_output_length)
            .await
    }
}

/// Fetch or create the shared cell for a key
fn shared_cell<K, V>(cells: &RwLock<HashMap<K, Arc<OnceCell<Arc<V>>>>>, key: &K) -> Arc<OnceCell<Arc<V>>>
where
    K: Eq + Hash + Clone,
{
    if let Some(cell) = cells.read().get(key) {
        return cell.clone();
    }
    cells
        .write()
        .entry(key.clone())
        .or_insert_with(|| Arc::new(OnceCell::new()))
        .clone()
}

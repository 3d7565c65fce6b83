/*!
 * Mock model loader for testing.
 *
 * `MockLoader` simulates the behaviours the pipeline cache and orchestrator
 * have to cope with and counts every load and invocation:
 * - `MockLoader::identity()` - loads instantly, returns its input unchanged
 * - `MockLoader::tagged()` - prefixes each translation with the target code
 * - `MockLoader::transient()` - model loading always fails with a network-style error
 * - `MockLoader::permanent()` - model loading always fails for good
 *
 * Other `MockBehavior` variants inject transient failures into the tokenizer
 * and pipeline-binding steps, slow loads and failing invocations.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::{BackendError, LoadError};
use crate::language_utils::ModelCode;
use crate::providers::{ModelLoader, TranslationPipeline};
use crate::translation::cache::LanguagePair;
use crate::translation::model_source::ModelSource;

/// Behaviour mode for the mock loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Loads, then echoes inputs back
    Identity,
    /// Loads, then returns `[<target code>] <input>`
    Tagged,
    /// `load_model` always fails with a transient error
    TransientFailure,
    /// `load_model` always fails with a permanent error
    PermanentFailure,
    /// `load_model` fails transiently the first `failures` times, then behaves like `Identity`
    FlakyThenIdentity { failures: usize },
    /// `load_tokenizer` fails transiently the first `failures` times (`usize::MAX` for always)
    FlakyTokenizer { failures: usize },
    /// `build_pipeline` fails transiently the first `failures` times (`usize::MAX` for always)
    FlakyPipeline { failures: usize },
    /// Loads, waiting `delay_ms` in `load_model`, then echoes inputs back
    SlowLoad { delay_ms: u64 },
    /// Loads, then returns empty strings
    EmptyResult,
    /// Loads, then fails every invocation
    FailingInvocation,
}

/// Shared counters observed by tests
#[derive(Debug, Default)]
pub struct LoadCounters {
    tokenizers: AtomicUsize,
    models: AtomicUsize,
    pipeline_builds: AtomicUsize,
    pipelines: AtomicUsize,
    invocations: AtomicUsize,
}

impl LoadCounters {
    /// Calls to `load_tokenizer`
    pub fn tokenizers(&self) -> usize {
        self.tokenizers.load(Ordering::SeqCst)
    }

    /// Calls to `load_model`; one per construction attempt once the tokenizer is cached
    pub fn load_attempts(&self) -> usize {
        self.models.load(Ordering::SeqCst)
    }

    /// Alias of `load_attempts`
    pub fn models(&self) -> usize {
        self.load_attempts()
    }

    /// Calls to `build_pipeline`, successful or not
    pub fn pipeline_builds(&self) -> usize {
        self.pipeline_builds.load(Ordering::SeqCst)
    }

    /// Pipelines successfully built
    pub fn pipelines(&self) -> usize {
        self.pipelines.load(Ordering::SeqCst)
    }

    /// Calls to `TranslationPipeline::translate`
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

/// Tokenizer handle produced by the mock
#[derive(Debug)]
pub struct MockTokenizer {
    /// Source language the tokenizer was first configured with
    pub initial_src_lang: ModelCode,
}

/// Model handle produced by the mock
#[derive(Debug)]
pub struct MockModel {
    /// Identifier the model was loaded from
    pub identifier: String,
}

/// Mock loader for testing the cache and orchestrator
#[derive(Debug, Clone)]
pub struct MockLoader {
    behavior: MockBehavior,
    counters: Arc<LoadCounters>,
}

impl MockLoader {
    /// Create a mock loader with the given behaviour
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            counters: Arc::new(LoadCounters::default()),
        }
    }

    /// Loader whose pipelines echo their input
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// Loader whose pipelines tag output with the target code
    pub fn tagged() -> Self {
        Self::new(MockBehavior::Tagged)
    }

    /// Loader that never gets past a transient network error
    pub fn transient() -> Self {
        Self::new(MockBehavior::TransientFailure)
    }

    /// Loader that fails permanently
    pub fn permanent() -> Self {
        Self::new(MockBehavior::PermanentFailure)
    }

    /// Counters shared with every clone of this loader
    pub fn counters(&self) -> Arc<LoadCounters> {
        self.counters.clone()
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    type Tokenizer = MockTokenizer;
    type Model = MockModel;
    type Pipeline = MockPipeline;

    async fn load_tokenizer(
        &self,
        _source: &ModelSource,
        src_lang: &ModelCode,
    ) -> Result<Self::Tokenizer, LoadError> {
        let call = self.counters.tokenizers.fetch_add(1, Ordering::SeqCst) + 1;
        if let MockBehavior::FlakyTokenizer { failures } = self.behavior {
            if call <= failures {
                return Err(LoadError::Transient(format!("tokenizer download interrupted (call {})", call)));
            }
        }
        Ok(MockTokenizer {
            initial_src_lang: src_lang.clone(),
        })
    }

    async fn load_model(&self, source: &ModelSource) -> Result<Self::Model, LoadError> {
        let call = self.counters.models.fetch_add(1, Ordering::SeqCst) + 1;
        match self.behavior {
            MockBehavior::TransientFailure => {
                Err(LoadError::Transient("connection reset by peer".to_string()))
            }
            MockBehavior::PermanentFailure => {
                Err(LoadError::Permanent("model weights are corrupt".to_string()))
            }
            MockBehavior::FlakyThenIdentity { failures } if call <= failures => {
                Err(LoadError::Transient(format!("remote disconnected (call {})", call)))
            }
            MockBehavior::SlowLoad { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(MockModel {
                    identifier: source.identifier(),
                })
            }
            _ => Ok(MockModel {
                identifier: source.identifier(),
            }),
        }
    }

    async fn build_pipeline(
        &self,
        _model: Arc<Self::Model>,
        _tokenizer: Arc<Self::Tokenizer>,
        pair: &LanguagePair,
        _max_length: usize,
    ) -> Result<Self::Pipeline, LoadError> {
        let call = self.counters.pipeline_builds.fetch_add(1, Ordering::SeqCst) + 1;
        if let MockBehavior::FlakyPipeline { failures } = self.behavior {
            if call <= failures {
                return Err(LoadError::Transient(format!("device busy while binding pipeline (call {})", call)));
            }
        }
        self.counters.pipelines.fetch_add(1, Ordering::SeqCst);
        Ok(MockPipeline {
            behavior: self.behavior,
            target: pair.target().clone(),
            counters: self.counters.clone(),
        })
    }
}

/// Pipeline produced by `MockLoader`
#[derive(Debug)]
pub struct MockPipeline {
    behavior: MockBehavior,
    target: ModelCode,
    counters: Arc<LoadCounters>,
}

#[async_trait]
impl TranslationPipeline for MockPipeline {
    async fn translate(&self, inputs: &[String]) -> Result<Vec<String>, BackendError> {
        self.counters.invocations.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Tagged => Ok(inputs
                .iter()
                .map(|text| format!("[{}] {}", self.target, text))
                .collect()),
            MockBehavior::EmptyResult => Ok(inputs.iter().map(|_| String::new()).collect()),
            MockBehavior::FailingInvocation => {
                Err(BackendError::RequestFailed("inference crashed".to_string()))
            }
            _ => Ok(inputs.to_vec()),
        }
    }
}

/*!
 * Integration tests for the pipeline cache lifecycle
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_test::{assert_err, assert_ok};

use anuvad::errors::TranslationError;
use anuvad::providers::TranslationPipeline;
use anuvad::providers::mock::{MockBehavior, MockLoader};
use anuvad::translation::{CacheSettings, LanguagePair, PipelineCache, PipelineStatus, RetryPolicy};

use crate::common;

fn pair(source: &str, target: &str) -> LanguagePair {
    LanguagePair::new(source.into(), target.into())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_get_withConcurrentCallers_shouldConstructOnce() {
    common::init_logging();
    let loader = MockLoader::new(MockBehavior::SlowLoad { delay_ms: 150 });
    let counters = loader.counters();
    let cache = common::mock_cache(loader);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get(&pair("eng_Latn", "hin_Deva")).await })
        })
        .collect();

    let mut pipelines = Vec::new();
    for handle in handles {
        pipelines.push(assert_ok!(handle.await.unwrap()));
    }

    assert_eq!(counters.tokenizers(), 1);
    assert_eq!(counters.models(), 1);
    assert_eq!(counters.pipelines(), 1);
    assert!(pipelines.iter().all(|p| Arc::ptr_eq(p, &pipelines[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_get_withDifferentPairs_shouldBuildEachAndShareModel() {
    let loader = MockLoader::new(MockBehavior::SlowLoad { delay_ms: 50 });
    let counters = loader.counters();
    let cache = common::mock_cache(loader);

    let targets = ["hin_Deva", "tam_Taml", "ben_Beng", "urd_Arab"];
    let results = futures::future::join_all(
        targets.iter().map(|target| {
            let cache = cache.clone();
            let p = pair("eng_Latn", target);
            async move { cache.get(&p).await }
        }),
    )
    .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(counters.pipelines(), 4);
    assert_eq!(counters.models(), 1);
    assert_eq!(cache.len(), 4);
}

#[tokio::test]
async fn test_get_withAlwaysTransientLoader_shouldStopAfterThreeAttempts() {
    common::init_logging();
    let loader = MockLoader::transient();
    let counters = loader.counters();
    let cache = common::mock_cache(loader);
    let p = pair("eng_Latn", "hin_Deva");

    let err = assert_err!(cache.get(&p).await);
    assert!(matches!(err, TranslationError::BackendUnavailable { .. }));
    assert_eq!(counters.load_attempts(), 3);

    for _ in 0..100 {
        assert_err!(cache.get(&p).await);
    }
    assert_eq!(counters.load_attempts(), 3);
    assert!(matches!(cache.status(&p), PipelineStatus::Failed { .. }));
}

#[tokio::test]
async fn test_get_withFixedDelay_shouldWaitBetweenAttempts() {
    let loader = MockLoader::transient();
    let settings = CacheSettings {
        retry: RetryPolicy::fixed(3, Duration::from_millis(40)),
        ..common::fast_settings(3)
    };
    let cache = PipelineCache::new(loader, settings);

    let started = Instant::now();
    assert_err!(cache.get(&pair("eng_Latn", "tam_Taml")).await);
    assert!(started.elapsed() >= Duration::from_millis(80));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_duringSlowLoad_shouldReportLoading() {
    let loader = MockLoader::new(MockBehavior::SlowLoad { delay_ms: 300 });
    let cache = common::mock_cache(loader);
    let p = pair("hin_Deva", "mar_Deva");

    let background = {
        let cache = cache.clone();
        let p = p.clone();
        tokio::spawn(async move { cache.get(&p).await.map(|_| ()) })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(cache.status(&p), PipelineStatus::Loading { attempt: 1 });

    assert_ok!(background.await.unwrap());
    assert_eq!(cache.status(&p), PipelineStatus::Ready);
}

#[tokio::test]
async fn test_pipeline_invocationFailure_shouldNotMarkPairFailed() {
    let cache = common::mock_cache(MockLoader::new(MockBehavior::FailingInvocation));
    let p = pair("eng_Latn", "kan_Knda");

    let pipeline = assert_ok!(cache.get(&p).await);
    assert_err!(pipeline.translate_one("Hello").await);
    assert!(cache.is_ready(&p));
}

#[tokio::test]
async fn test_get_withAlwaysFailingTokenizer_shouldStopAfterThreeAttemptsAndCacheNothing() {
    let loader = MockLoader::new(MockBehavior::FlakyTokenizer { failures: usize::MAX });
    let counters = loader.counters();
    let cache = common::mock_cache(loader);
    let p = pair("eng_Latn", "hin_Deva");

    let err = assert_err!(cache.get(&p).await);
    assert!(err.to_string().contains("tokenizer download interrupted"));
    assert_eq!(counters.tokenizers(), 3);
    assert_eq!(counters.models(), 0);
    assert_eq!(cache.loaded_tokenizers(), 0);

    for _ in 0..100 {
        assert_err!(cache.get(&p).await);
    }
    assert_eq!(counters.tokenizers(), 3);
    assert!(matches!(cache.status(&p), PipelineStatus::Failed { .. }));
}

#[tokio::test]
async fn test_get_withFlakyTokenizer_shouldRecoverOnRetry() {
    let loader = MockLoader::new(MockBehavior::FlakyTokenizer { failures: 2 });
    let counters = loader.counters();
    let cache = common::mock_cache(loader);
    let p = pair("hin_Deva", "pan_Guru");

    assert_ok!(cache.get(&p).await);
    assert_eq!(counters.tokenizers(), 3);
    assert_eq!(counters.models(), 1);
    assert_eq!(cache.loaded_tokenizers(), 1);
    assert!(cache.is_ready(&p));
}

#[tokio::test]
async fn test_get_withAlwaysFailingPipelineBinding_shouldReuseLoadedModel() {
    let loader = MockLoader::new(MockBehavior::FlakyPipeline { failures: usize::MAX });
    let counters = loader.counters();
    let cache = common::mock_cache(loader);
    let p = pair("eng_Latn", "ben_Beng");

    assert_err!(cache.get(&p).await);
    assert_eq!(counters.pipeline_builds(), 3);
    assert_eq!(counters.pipelines(), 0);
    assert_eq!(counters.tokenizers(), 1);
    assert_eq!(counters.models(), 1);
    assert!(matches!(cache.status(&p), PipelineStatus::Failed { .. }));

    assert_err!(cache.get(&p).await);
    assert_eq!(counters.pipeline_builds(), 3);
}

#[tokio::test]
async fn test_get_withFlakyPipelineBinding_shouldRecoverOnRetry() {
    let loader = MockLoader::new(MockBehavior::FlakyPipeline { failures: 1 });
    let counters = loader.counters();
    let cache = common::mock_cache(loader);

    assert_ok!(cache.get(&pair("eng_Latn", "guj_Gujr")).await);
    assert_eq!(counters.pipeline_builds(), 2);
    assert_eq!(counters.pipelines(), 1);
}

#[tokio::test]
async fn test_get_afterDroppedCaller_shouldResumeAttemptCount() {
    let loader = MockLoader::transient();
    let counters = loader.counters();
    let settings = CacheSettings {
        retry: RetryPolicy::fixed(3, Duration::from_millis(100)),
        ..common::fast_settings(3)
    };
    let cache = PipelineCache::new(loader, settings);
    let p = pair("eng_Latn", "urd_Arab");

    // First attempt fails at once; the caller is dropped while waiting to retry
    let dropped = tokio::time::timeout(Duration::from_millis(30), cache.get(&p)).await;
    assert!(dropped.is_err());
    assert_eq!(counters.load_attempts(), 1);
    assert_eq!(cache.status(&p), PipelineStatus::Loading { attempt: 1 });

    assert_err!(cache.get(&p).await);
    assert_eq!(counters.load_attempts(), 3);
    assert!(matches!(cache.status(&p), PipelineStatus::Failed { .. }));
}

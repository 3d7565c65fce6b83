/*!
 * End-to-end tests for the translation orchestrator
 */

use std::sync::Arc;

use tokio_test::assert_ok;

use anuvad::errors::TranslationError;
use anuvad::language_utils::LanguageCodeRegistry;
use anuvad::providers::mock::{MockBehavior, MockLoader};
use anuvad::providers::phrasebook::PhrasebookLoader;
use anuvad::translation::{
    ManualOverrideDictionary, PipelineCache, PipelineStatus, TextNormalizer, TranslationOrchestrator,
};

use crate::common::{self, code, name};

const SENTENCES: &[&str] = &[
    "Open the app.",
    "Then   pick a   language!",
    "Is the voice clear?",
    "It reads \u{201C}quoted\u{201D} text.",
    "Long  lines\nwrap.",
    "Prices start at 5.99 today.",
    "Ask again?",
    "Done.",
    "One more.",
    "Last one!",
];

#[tokio::test]
async fn test_translate_withIdentityBackend_shouldReturnNormalizedText() {
    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let normalizer = TextNormalizer::new(
        Arc::new(LanguageCodeRegistry::standard().clone()),
        Arc::new(ManualOverrideDictionary::builtin()),
    );

    for n in 1..=SENTENCES.len() {
        let text = SENTENCES[..n].join(" ");
        let expected = normalizer.normalize(&text, &name("Hindi"));
        let translated = assert_ok!(orchestrator.translate(&text, &code("en"), &name("Hindi")).await);
        assert_eq!(translated, expected, "{} sentence(s)", n);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_translate_withConcurrentCalls_shouldLoadOnceAndSucceed() {
    let loader = MockLoader::new(MockBehavior::SlowLoad { delay_ms: 100 });
    let counters = loader.counters();
    let orchestrator = common::mock_orchestrator(loader);

    let calls = (0..12).map(|i| {
        let orchestrator = orchestrator.clone();
        async move {
            orchestrator
                .translate(&format!("Request number {}.", i), &code("en"), &name("Gujarati"))
                .await
        }
    });
    let results = futures::future::join_all(calls).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), format!("Request number {}.", i));
    }
    assert_eq!(counters.load_attempts(), 1);
    assert_eq!(counters.pipelines(), 1);
}

#[tokio::test]
async fn test_translate_withTargetOnlySource_shouldRejectWithoutLoading() {
    let loader = MockLoader::identity();
    let counters = loader.counters();
    let orchestrator = common::mock_orchestrator(loader);

    let err = orchestrator
        .translate("வணக்கம்", &code("ta"), &name("Hindi"))
        .await
        .unwrap_err();

    assert_eq!(err, TranslationError::UnsupportedSourceLanguage("ta".to_string()));
    assert!(err.to_string().contains("'ta'"));
    assert_eq!(counters.tokenizers(), 0);
    assert_eq!(counters.load_attempts(), 0);
}

#[tokio::test]
async fn test_translate_withAutoAndTamilText_shouldNameDetectedCode() {
    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let err = orchestrator
        .translate("வணக்கம்", &code("auto"), &name("Hindi"))
        .await
        .unwrap_err();
    assert_eq!(err, TranslationError::UnsupportedSourceLanguage("ta".to_string()));
}

#[tokio::test]
async fn test_translate_withAutoAndFrenchText_shouldRejectAsUnsupportedSource() {
    let loader = MockLoader::identity();
    let counters = loader.counters();
    let orchestrator = common::mock_orchestrator(loader);

    let err = orchestrator
        .translate(
            "Bonjour, je voudrais réserver une table pour deux personnes ce soir, s'il vous plaît.",
            &code("auto"),
            &name("Hindi"),
        )
        .await
        .unwrap_err();

    assert_eq!(err, TranslationError::UnsupportedSourceLanguage("fr".to_string()));
    assert!(err.is_input_error());
    assert_eq!(counters.load_attempts(), 0);
}

#[tokio::test]
async fn test_translate_withEmptyText_shouldReturnEmptyInputError() {
    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let err = orchestrator.translate("", &code("en"), &name("Hindi")).await.unwrap_err();
    assert_eq!(err.to_string(), "No text provided for translation.");
}

#[tokio::test]
async fn test_translate_withKlingonTarget_shouldNameIt() {
    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let err = orchestrator.translate("Hello", &code("en"), &name("Klingon")).await.unwrap_err();
    assert!(matches!(err, TranslationError::UnknownTargetLanguage(ref n) if n == "Klingon"));
    assert!(err.to_string().contains("Klingon"));
}

#[tokio::test]
async fn test_translate_withFailedPair_shouldNameThePair() {
    let loader = MockLoader::permanent();
    let counters = loader.counters();
    let orchestrator = common::mock_orchestrator(loader);

    let err = orchestrator
        .translate("Hello. How are you?", &code("en"), &name("Hindi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("eng_Latn -> hin_Deva"));

    let again = orchestrator.translate("Hello", &code("en"), &name("Hindi")).await.unwrap_err();
    assert_eq!(err, again);
    assert_eq!(counters.load_attempts(), 1);
    assert!(!orchestrator.is_language_pair_available(&code("en"), &name("Hindi")));
}

#[tokio::test]
async fn test_translate_withPhrasebook_shouldReturnNonEmptyText() {
    let cache = Arc::new(PipelineCache::new(PhrasebookLoader::new(), common::fast_settings(3)));
    let orchestrator = TranslationOrchestrator::with_defaults(cache);

    let out = assert_ok!(orchestrator.translate("Hello, how are you?", &code("en"), &name("Hindi")).await);
    assert!(!out.is_empty());

    let out = assert_ok!(orchestrator.translate("Thank you.", &code("en"), &name("Telugu")).await);
    assert_eq!(out, "ధన్యవాదాలు");
}

#[tokio::test]
async fn test_translateBatch_shouldUseOneInvocationWithoutChunking() {
    let loader = MockLoader::tagged();
    let counters = loader.counters();
    let orchestrator = common::mock_orchestrator(loader);

    let long_item = "One. Two. Three. Four. Five.".to_string();
    let texts = vec!["Save".to_string(), long_item.clone(), "Cancel".to_string()];
    let out = assert_ok!(orchestrator.translate_batch(&texts, &code("en"), &name("Malayalam")).await);

    assert_eq!(out[1], format!("[mal_Mlym] {}", long_item));
    assert_eq!(out.len(), 3);
    assert_eq!(counters.invocations(), 1);
}

#[tokio::test]
async fn test_translateBatch_withUnknownTarget_shouldFail() {
    let orchestrator = common::mock_orchestrator(MockLoader::identity());
    let err = orchestrator
        .translate_batch(&["Hi".to_string()], &code("en"), &name("Elvish"))
        .await
        .unwrap_err();
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_pairStatus_shouldNotTriggerLoading() {
    let loader = MockLoader::identity();
    let counters = loader.counters();
    let orchestrator = common::mock_orchestrator(loader);

    assert_eq!(
        orchestrator.pair_status(&code("hi"), &name("Punjabi")).unwrap(),
        PipelineStatus::Unloaded
    );
    assert!(!orchestrator.is_language_pair_available(&code("hi"), &name("Punjabi")));
    assert_eq!(counters.load_attempts(), 0);
    assert!(orchestrator.cache().is_empty());
}

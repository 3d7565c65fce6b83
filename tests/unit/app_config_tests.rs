/*!
 * Tests for application configuration
 */

use anuvad::app_config::{BackendProvider, Config, LogLevel};
use anuvad::errors::ConfigError;

use crate::common;

#[test]
fn test_config_default_shouldSerializeAndParseBack() {
    let json = serde_json::to_string_pretty(&Config::default()).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.model.model_id, "facebook/nllb-200-distilled-600M");
    assert_eq!(parsed.backend.provider, BackendProvider::Phrasebook);
    assert_eq!(parsed.log_level, LogLevel::Info);
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_config_emptyObject_shouldUseDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.chunking.word_window, 25);
    assert_eq!(config.chunking.long_sentence_words, 30);
    assert_eq!(config.backend.timeout_secs, 120);
    assert!(config.dictionary_path.is_none());
}

#[test]
fn test_config_fromFile_shouldReadAllSections() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        br#"{
            "model": {"model_id": "org/other", "local_model_dir": null, "max_output_length": 256},
            "retry": {"max_attempts": 5, "delay_ms": 100, "backoff": "exponential"},
            "backend": {"provider": "inference_server", "endpoint": "http://10.0.0.5:9000"},
            "default_target_language": "Tamil",
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let content = std::fs::read_to_string(path).unwrap();
    let config: Config = serde_json::from_str(&content).unwrap();
    assert!(config.model.local_model_dir.is_none());
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validate_withZeroWindow_shouldNameField() {
    let mut config = Config::default();
    config.chunking.word_window = 0;
    let err = config.validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidValue {
            field: "chunking.word_window",
            reason: "must be greater than zero".to_string(),
        }
    );
}

#[test]
fn test_config_unknownBackend_shouldFailToParse() {
    let result: Result<Config, _> = serde_json::from_str(r#"{"backend": {"provider": "ollama"}}"#);
    assert!(result.is_err());
}

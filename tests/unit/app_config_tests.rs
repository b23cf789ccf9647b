/*!
 * Tests for configuration loading and validation
 */

use subtrans::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};

use crate::common;

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefault() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.target_language, "ar");

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.translation.default_service, config.translation.default_service);
    assert_eq!(reloaded.jobs.output_dir, config.jobs.output_dir);
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadValues() {
    let dir = common::create_temp_dir().unwrap();
    let json = r#"{
        "source_language": "fr",
        "target_language": "de",
        "log_level": "debug",
        "translation": { "common": { "retry_count": 5, "use_context": false } },
        "subtitles": { "stl_frame_rate": 30 }
    }"#;
    let path = common::create_test_file(dir.path(), "conf.json", json).unwrap();

    let config = Config::load_or_create(&path).unwrap();
    assert_eq!(config.source_language, "fr");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.translation.common.retry_count, 5);
    assert!(!config.translation.common.use_context);
    assert_eq!(config.translation.common.retry_backoff_ms, 500);
    assert_eq!(config.subtitles.stl_frame_rate, 30);
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_validate_shouldRejectBadValues() {
    let mut config = Config::default();
    config.target_language = "auto".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.source_language = "auto".to_string();
    assert!(config.validate().is_ok());

    let mut config = Config::default();
    config.translation.common.retry_count = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.context_window_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::Google);
    provider.provider_type = "bing".to_string();
    config.translation.available_providers.push(provider);
    assert!(config.validate().is_err());
}

#[test]
fn test_translationProvider_shouldDescribeKeyRequirements() {
    assert!(!TranslationProvider::Google.requires_api_key());
    assert_eq!(TranslationProvider::Google.api_key_env_var(), None);
    assert!(TranslationProvider::Gemini.requires_api_key());
    assert_eq!(TranslationProvider::DeepL.api_key_env_var(), Some("DEEPL_API_KEY"));
    assert_eq!(TranslationProvider::Yandex.to_lowercase_string(), "yandex");
}

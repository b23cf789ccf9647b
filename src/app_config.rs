use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO, or `auto`)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Job engine and storage settings
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Subtitle codec settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Translate (free endpoint)
    #[default]
    Google,
    // @provider: Google Gemini
    Gemini,
    // @provider: DeepL
    DeepL,
    // @provider: Yandex Translate
    Yandex,
}

impl TranslationProvider {
    /// Every built-in service
    pub const ALL: [TranslationProvider; 4] = [Self::Google, Self::Gemini, Self::DeepL, Self::Yandex];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Gemini => "Google Gemini",
            Self::DeepL => "DeepL",
            Self::Yandex => "Yandex Translate",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Gemini => "gemini".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::Yandex => "yandex".to_string(),
        }
    }

    // @returns: Whether the service needs an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Google)
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Google => None,
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::DeepL => Some("DEEPL_API_KEY"),
            Self::Yandex => Some("YANDEX_API_KEY"),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "gemini" => Ok(Self::Gemini),
            "deepl" => Ok(Self::DeepL),
            "yandex" => Ok(Self::Yandex),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (Gemini only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Minimum delay between consecutive calls in ms
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Google => Self {
                provider_type: "google".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_google_endpoint(),
                rate_limit_delay_ms: 50,
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Gemini => Self {
                provider_type: "gemini".to_string(),
                model: default_gemini_model(),
                api_key: String::new(),
                endpoint: default_gemini_endpoint(),
                rate_limit_delay_ms: 200,
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::DeepL => Self {
                provider_type: "deepl".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_deepl_endpoint(),
                rate_limit_delay_ms: 150,
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Yandex => Self {
                provider_type: "yandex".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_yandex_endpoint(),
                rate_limit_delay_ms: 100,
                timeout_secs: default_timeout_secs(),
            },
        }
    }

    /// Parsed provider type, if it names a built-in service
    pub fn provider(&self) -> Option<TranslationProvider> {
        self.provider_type.parse().ok()
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Service used when a submission does not name one
    #[serde(default)]
    pub default_service: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Attempts per entry before falling back to the source text
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff before the first retry in ms, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Number of previous source lines sent as context
    #[serde(default = "default_context_window_size")]
    pub context_window_size: usize,

    /// Whether context is requested by default
    #[serde(default = "default_true")]
    pub use_context: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            context_window_size: default_context_window_size(),
            use_context: true,
        }
    }
}

/// Job engine and storage settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobsConfig {
    /// Root directory for staged uploads
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Root directory for translated output
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Maximum number of files per upload
    #[serde(default = "default_max_files_per_batch")]
    pub max_files_per_batch: usize,

    /// Maximum size of one uploaded file in MB
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Age after which job records are purged
    #[serde(default = "default_job_ttl_hours")]
    pub job_ttl_hours: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            max_files_per_batch: default_max_files_per_batch(),
            max_file_size_mb: default_max_file_size_mb(),
            job_ttl_hours: default_job_ttl_hours(),
        }
    }
}

/// Configuration for subtitle processing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Frame rate used for frame-based timestamps (STL)
    #[serde(default = "default_stl_frame_rate")]
    pub stl_frame_rate: u32,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            stl_frame_rate: default_stl_frame_rate(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ar".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rate_limit_delay_ms() -> u64 {
    100
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_context_window_size() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_output_dir() -> String {
    "outputs".to_string()
}

fn default_max_files_per_batch() -> usize {
    20
}

fn default_max_file_size_mb() -> u64 {
    1
}

fn default_job_ttl_hours() -> u64 {
    24
}

/// Upper bound for `job_ttl_hours`, one hundred years
pub const MAX_JOB_TTL_HOURS: u64 = 24 * 365 * 100;

fn default_stl_frame_rate() -> u32 {
    crate::subtitle_processor::DEFAULT_FRAME_RATE
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_yandex_endpoint() -> String {
    "https://translate.api.cloud.yandex.net".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl Config {
    /// Load the configuration from a JSON file, writing a default one when
    /// the file does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Fill provider API keys from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Fill provider API keys from a variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for provider in TranslationProvider::ALL {
            let Some(var) = provider.api_key_env_var() else {
                continue;
            };
            let Some(value) = lookup(var).filter(|value| !value.trim().is_empty()) else {
                continue;
            };

            let provider_str = provider.to_lowercase_string();
            match self
                .translation
                .available_providers
                .iter_mut()
                .find(|p| p.provider_type == provider_str)
            {
                Some(provider_config) => provider_config.api_key = value,
                None => {
                    let mut provider_config = ProviderConfig::new(provider);
                    provider_config.api_key = value;
                    self.translation.available_providers.push(provider_config);
                }
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_source_language(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        for provider_config in &self.translation.available_providers {
            if provider_config.provider().is_none() {
                return Err(anyhow!("Invalid provider type: {}", provider_config.provider_type));
            }
        }

        let common = &self.translation.common;
        if common.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }
        if common.context_window_size == 0 {
            return Err(anyhow!("context_window_size must be at least 1"));
        }
        if self.subtitles.stl_frame_rate == 0 {
            return Err(anyhow!("stl_frame_rate must be greater than 0"));
        }
        if self.jobs.max_files_per_batch == 0 || self.jobs.max_file_size_mb == 0 {
            return Err(anyhow!("Upload limits must be greater than 0"));
        }
        if self.jobs.job_ttl_hours > MAX_JOB_TTL_HOURS {
            return Err(anyhow!(
                "job_ttl_hours must be at most {} (got {})",
                MAX_JOB_TTL_HOURS,
                self.jobs.job_ttl_hours
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            jobs: JobsConfig::default(),
            subtitles: SubtitleConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Provider configuration with defaults filled in for blank fields
    pub fn resolved_provider_config(&self, provider_type: TranslationProvider) -> ProviderConfig {
        let defaults = ProviderConfig::new(provider_type);
        match self.get_provider_config(&provider_type) {
            Some(config) => ProviderConfig {
                provider_type: defaults.provider_type,
                model: if config.model.is_empty() { defaults.model } else { config.model.clone() },
                api_key: config.api_key.clone(),
                endpoint: if config.endpoint.is_empty() { defaults.endpoint } else { config.endpoint.clone() },
                rate_limit_delay_ms: config.rate_limit_delay_ms,
                timeout_secs: config.timeout_secs,
            },
            None => defaults,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_service: TranslationProvider::default(),
            available_providers: TranslationProvider::ALL
                .into_iter()
                .map(ProviderConfig::new)
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}

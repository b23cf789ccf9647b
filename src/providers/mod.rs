/*!
 * Translation service adapters.
 *
 * Every service implements the `Provider` capability: translate one line,
 * optionally with a window of preceding source lines. Concrete adapters:
 * - Google: free web endpoint
 * - Gemini: Google generative API, the only context-aware service
 * - DeepL: DeepL REST API
 * - Yandex: Yandex Cloud Translate API
 * - Mock: scripted adapter for tests
 *
 * Adapters never retry; retry and fallback policy lives in
 * `translation::TranslationService`.
 */

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod deepl;
pub mod gemini;
pub mod google;
pub mod mock;
pub mod yandex;

pub use deepl::DeepL;
pub use gemini::Gemini;
pub use google::GoogleTranslate;
pub use mock::{MockBehavior, MockProvider};
pub use yandex::Yandex;

/// Billing class of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Free,
    Paid,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Common trait for all translation services
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the job pipeline.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short service identifier
    fn name(&self) -> &str;

    /// Whether `translate_line` makes use of the context window
    fn supports_context(&self) -> bool {
        false
    }

    /// Whether the adapter is configured well enough to be called
    fn is_available(&self) -> bool {
        true
    }

    /// Billing class reported in the service catalogue
    fn service_type(&self) -> ServiceType {
        ServiceType::Paid
    }

    /// Translate one line of subtitle text
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source_language` - Source language code, or `auto`
    /// * `target_language` - Target language code
    /// * `context` - Preceding source lines of the same file, oldest first
    async fn translate_line(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        context: Option<&[String]>,
    ) -> Result<String, ProviderError>;
}

/// Catalogue entry describing one registered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Registry name
    pub name: String,
    /// Whether the service can be selected
    pub available: bool,
    /// Free or paid
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    /// Whether context windows are honoured
    pub supports_context: bool,
}

/// A registered adapter and its rate-limit policy
#[derive(Debug, Clone)]
pub struct RegisteredService {
    /// The adapter instance
    pub adapter: Arc<dyn Provider>,
    /// Minimum delay between two calls made by one job
    pub min_delay: Duration,
}

/// Name-indexed set of translation services
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    services: BTreeMap<String, RegisteredService>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in services described by the configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        let mut registry = Self::new();

        for provider in TranslationProvider::ALL {
            let provider_config = config.resolved_provider_config(provider);
            let min_delay = Duration::from_millis(provider_config.rate_limit_delay_ms);
            let adapter: Arc<dyn Provider> = match provider {
                TranslationProvider::Google => Arc::new(GoogleTranslate::new(
                    &provider_config.endpoint,
                    provider_config.timeout_secs,
                )),
                TranslationProvider::Gemini => Arc::new(Gemini::new(
                    &provider_config.api_key,
                    &provider_config.endpoint,
                    &provider_config.model,
                    provider_config.timeout_secs,
                )),
                TranslationProvider::DeepL => Arc::new(DeepL::new(
                    &provider_config.api_key,
                    &provider_config.endpoint,
                    provider_config.timeout_secs,
                )),
                TranslationProvider::Yandex => Arc::new(Yandex::new(
                    &provider_config.api_key,
                    &provider_config.endpoint,
                    provider_config.timeout_secs,
                )),
            };
            registry.register(provider.to_lowercase_string(), adapter, min_delay);
        }

        registry
    }

    /// Register an adapter under a name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, adapter: Arc<dyn Provider>, min_delay: Duration) {
        self.services.insert(name.into(), RegisteredService { adapter, min_delay });
    }

    /// Look up a service by name
    pub fn get(&self, name: &str) -> Option<&RegisteredService> {
        self.services.get(name)
    }

    /// Registered service names, sorted
    pub fn names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Catalogue of every registered service
    pub fn services(&self) -> Vec<ServiceInfo> {
        self.services
            .iter()
            .map(|(name, service)| ServiceInfo {
                name: name.clone(),
                available: service.adapter.is_available(),
                service_type: service.adapter.service_type(),
                supports_context: service.adapter.supports_context(),
            })
            .collect()
    }
}

/// Build an HTTP client with a request timeout
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_default()
}

/// Map an unsuccessful HTTP status to a provider error
pub(crate) fn status_error(status_code: u16, message: String) -> ProviderError {
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError { status_code, message },
    }
}

/// Pass successful responses through, turn failures into provider errors
pub(crate) async fn check_status(service: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::debug!("{} API error ({}): {}", service, status, error_text);
    Err(status_error(status.as_u16(), error_text))
}

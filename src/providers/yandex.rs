use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use super::{build_client, check_status, Provider};

/// Yandex Cloud Translate client
#[derive(Debug)]
pub struct Yandex {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL of the service
    endpoint: String,
}

/// Yandex translate request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexRequest {
    /// Source language; omitted for detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language_code: Option<String>,
    /// Target language
    target_language_code: String,
    /// Texts to translate
    texts: Vec<String>,
}

/// Yandex translate response
#[derive(Debug, Deserialize)]
pub struct YandexResponse {
    /// One translation per input text
    #[serde(default)]
    pub translations: Vec<YandexTranslation>,
}

/// Individual translation in a Yandex response
#[derive(Debug, Deserialize)]
pub struct YandexTranslation {
    /// Translated text
    pub text: String,
}

impl Yandex {
    /// Create a new Yandex client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Provider for Yandex {
    fn name(&self) -> &str {
        "yandex"
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn translate_line(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        _context: Option<&[String]>,
    ) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if !self.is_available() {
            return Err(ProviderError::Unavailable("Yandex API key is not configured".to_string()));
        }

        let api_url = format!("{}/translate/v2/translate", self.endpoint.trim_end_matches('/'));
        let request = YandexRequest {
            source_language_code: (!language_utils::is_auto(source_language))
                .then(|| source_language.to_string()),
            target_language_code: target_language.to_string(),
            texts: vec![text.to_string()],
        };
        debug!("Yandex request: {} chars -> {}", text.len(), target_language);

        let response = self.client.post(&api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status("Yandex", response).await?;
        let yandex_response = response.json::<YandexResponse>().await?;

        yandex_response
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::TranslationFailed("Empty translation".to_string()))
    }
}

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use super::{build_client, check_status, Provider};

/// DeepL client
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL of the service
    endpoint: String,
}

/// DeepL translate request
#[derive(Debug, Serialize)]
pub struct DeepLRequest {
    /// Texts to translate
    text: Vec<String>,

    /// Source language; omitted to let DeepL detect it
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,

    /// Target language
    target_lang: String,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    /// One translation per input text
    pub translations: Vec<DeepLTranslation>,
}

/// Individual translation in a DeepL response
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    /// Translated text
    pub text: String,
}

impl DeepLRequest {
    /// Build a request for one text
    pub fn new(text: &str, source_language: &str, target_language: &str) -> Self {
        let source_lang = if language_utils::is_auto(source_language) {
            None
        } else {
            Some(source_language.trim().to_uppercase())
        };
        Self {
            text: vec![text.to_string()],
            source_lang,
            target_lang: target_language.trim().to_uppercase(),
        }
    }
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Extract the first translation from a response
    pub fn extract_text(response: &DeepLResponse) -> Result<String, ProviderError> {
        response
            .translations
            .first()
            .map(|translation| translation.text.clone())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::TranslationFailed("Empty translation".to_string()))
    }
}

#[async_trait]
impl Provider for DeepL {
    fn name(&self) -> &str {
        "deepl"
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
            return Err(ProviderError::Unavailable("DeepL API key is not configured".to_string()));
        }

        let api_url = format!("{}/v2/translate", self.endpoint.trim_end_matches('/'));
        let request = DeepLRequest::new(text, source_language, target_language);
        debug!("DeepL request: {} chars -> {}", text.len(), request.target_lang);

        let response = self.client.post(&api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;
        let response = check_status("DeepL", response).await?;
        let deepl_response = response.json::<DeepLResponse>().await?;

        Self::extract_text(&deepl_response)
    }
}

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::errors::ProviderError;
use super::{build_client, check_status, Provider, ServiceType};

/// Google Translate client using the free web endpoint
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the service
    endpoint: String,
}

impl GoogleTranslate {
    /// Create a new Google Translate client
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            endpoint: endpoint.into(),
        }
    }

    fn request_url(&self, text: &str, source_language: &str, target_language: &str) -> Result<Url, ProviderError> {
        let base = format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", base, e)))
    }

    /// Extract the translation from a response body.
    ///
    /// The body is a nested array whose first element lists translated
    /// segments; the first item of each segment is its text.
    pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("Missing translation segments".to_string()))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if text.is_empty() {
            return Err(ProviderError::TranslationFailed("Empty translation".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::Free
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

        let url = self.request_url(text, source_language, target_language)?;
        debug!("Google request: {} chars {} -> {}", text.len(), source_language, target_language);

        let response = self.client.get(url).send().await?;
        let response = check_status("Google", response).await?;
        let body: Value = response.json().await?;

        Self::extract_text(&body)
    }
}

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use super::{build_client, check_status, Provider};

/// Gemini client for interacting with the Google generative language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL of the service
    endpoint: String,
    /// Model name
    model: String,
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// Conversation contents
    contents: Vec<GeminiContent>,
}

/// Content block of a request or candidate
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Parts of the content
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// The text
    #[serde(default)]
    pub text: String,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// Individual candidate in a response
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// Candidate content
    pub content: Option<GeminiContent>,
}

impl GeminiRequest {
    /// Request with a single text prompt
    pub fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        }
    }
}

/// Build the translation prompt, with preceding source lines when given
pub fn build_prompt(text: &str, source_language: &str, target_language: &str, context: Option<&[String]>) -> String {
    let source = if language_utils::is_auto(source_language) {
        "the detected source language".to_string()
    } else {
        language_utils::get_language_name(source_language).unwrap_or_else(|_| source_language.to_string())
    };
    let target = language_utils::get_language_name(target_language)
        .unwrap_or_else(|_| target_language.to_string());

    let mut prompt = format!(
        "Translate the following text from {} to {}. Provide ONLY the translation without explanations or additional text.\n\n",
        source, target
    );

    if let Some(lines) = context.filter(|lines| !lines.is_empty()) {
        prompt.push_str("Context from previous subtitles:\n");
        prompt.push_str(&lines.join("\n"));
        prompt.push_str("\n\n");
    }

    prompt.push_str("Text to translate:\n");
    prompt.push_str(text);
    prompt
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: build_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// Extract text from a Gemini response
    pub fn extract_text_from_response(response: &GeminiResponse) -> Result<String, ProviderError> {
        let text: String = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter().map(|part| part.text.as_str()).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::TranslationFailed("Empty translation".to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    fn supports_context(&self) -> bool {
        true
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn translate_line(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        context: Option<&[String]>,
    ) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if !self.is_available() {
            return Err(ProviderError::Unavailable("Gemini API key is not configured".to_string()));
        }

        let api_url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        let request = GeminiRequest::from_prompt(build_prompt(text, source_language, target_language, context));
        debug!(
            "Gemini request: {} chars, {} context line(s)",
            text.len(),
            context.map_or(0, |lines| lines.len())
        );

        let response = self.client.post(&api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        let response = check_status("Gemini", response).await?;
        let gemini_response = response.json::<GeminiResponse>().await?;

        Self::extract_text_from_response(&gemini_response)
    }
}

/*!
 * Core translation service implementation.
 *
 * `TranslationService` wraps one adapter for the lifetime of a job. Each
 * call honours the service's minimum inter-call delay, retries failures
 * with exponential backoff and, once attempts are exhausted, falls back to
 * the source text so the entry is kept rather than the file aborted.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationCommonConfig;
use crate::errors::ProviderError;
use crate::providers::Provider;
use super::formatting::FormatPreserver;
use super::rate_limit::RateLimiter;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per line, including the first
    pub max_attempts: u32,
    /// Delay before the first retry, doubled for each further retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy described by the common translation settings
    pub fn from_config(config: &TranslationCommonConfig) -> Self {
        Self {
            max_attempts: config.retry_count.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }
}

/// Result of translating one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
    /// Text to store in the entry
    pub text: String,
    /// Number of adapter calls made
    pub attempts: u32,
    /// Whether the source text was kept because every attempt failed
    pub fell_back: bool,
}

/// Translation service bound to one adapter and language pair
#[derive(Debug)]
pub struct TranslationService {
    adapter: Arc<dyn Provider>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    source_language: String,
    target_language: String,
}

impl TranslationService {
    /// Create a new translation service
    pub fn new(
        adapter: Arc<dyn Provider>,
        min_delay: Duration,
        retry: RetryPolicy,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            limiter: RateLimiter::new(min_delay),
            retry,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Name of the underlying adapter
    pub fn service_name(&self) -> &str {
        self.adapter.name()
    }

    /// Whether the underlying adapter uses context
    pub fn supports_context(&self) -> bool {
        self.adapter.supports_context()
    }

    async fn attempt(&self, body: &str, context: Option<&[String]>) -> Result<String, ProviderError> {
        self.limiter.acquire().await;
        let translated = self
            .adapter
            .translate_line(body, &self.source_language, &self.target_language, context)
            .await?;
        if translated.trim().is_empty() {
            return Err(ProviderError::TranslationFailed("Empty translation".to_string()));
        }
        Ok(translated)
    }

    /// Translate one line, retrying and falling back to the source text
    pub async fn translate_line(&self, text: &str, context: Option<&[String]>) -> LineOutcome {
        let (tags, body) = FormatPreserver::split_leading_tags(text);
        if body.trim().is_empty() {
            return LineOutcome {
                text: text.to_string(),
                attempts: 0,
                fell_back: false,
            };
        }

        for attempt in 1..=self.retry.max_attempts {
            match self.attempt(body, context).await {
                Ok(translated) => {
                    debug!("Translated line via {} (attempt {})", self.adapter.name(), attempt);
                    let translated = if tags.is_empty() {
                        translated
                    } else {
                        FormatPreserver::restore_leading_tags(text, &translated)
                    };
                    return LineOutcome {
                        text: translated,
                        attempts: attempt,
                        fell_back: false,
                    };
                }
                Err(e) => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        self.adapter.name(),
                        attempt,
                        self.retry.max_attempts,
                        e
                    );
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    }
                }
            }
        }

        warn!("Keeping source text after {} failed attempt(s)", self.retry.max_attempts);
        LineOutcome {
            text: text.to_string(),
            attempts: self.retry.max_attempts,
            fell_back: true,
        }
    }
}

/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::intermittent(n)` - Fails every n-th request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::flaky(n)` - Fails the first n requests, then succeeds
 *
 * Every call is recorded so tests can inspect the text and context seen by
 * the adapter.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{Provider, ServiceType};

/// A recorded call to the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
    /// Context lines passed with the call
    pub context: Option<Vec<String>>,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then succeeds
    Flaky { failures: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Registry name
    name: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Whether context is advertised
    context_support: bool,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every call received, in order
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockCall) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            name: "mock".to_string(),
            behavior,
            context_support: false,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that fails its first `failures` requests
    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::Flaky { failures })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that sleeps before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set the registry name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Advertise context support
    pub fn with_context_support(mut self, supported: bool) -> Self {
        self.context_support = supported;
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockCall) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    fn respond(&self, call: &MockCall) -> String {
        match self.custom_response {
            Some(generator) => generator(call),
            None => format!("[{}] {}", call.target_language, call.text),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            behavior: self.behavior,
            context_support: self.context_support,
            request_count: Arc::clone(&self.request_count),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_context(&self) -> bool {
        self.context_support
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::Free
    }

    async fn translate_line(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        context: Option<&[String]>,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let call = MockCall {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            context: context.map(|lines| lines.to_vec()),
        };
        self.calls.lock().push(call.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(&call)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.respond(&call))
                }
            }

            MockBehavior::Flaky { failures } => {
                if count < failures {
                    Err(ProviderError::TranslationFailed(format!(
                        "Simulated failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.respond(&call))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&call))
            }
        }
    }
}

/*!
 * Per-entry translation machinery.
 *
 * - `core`: translation service with rate limiting, retry and fallback
 * - `context`: sliding window of previous source lines
 * - `rate_limit`: minimum delay between service calls
 * - `formatting`: markup preservation
 */

// Re-export main types for easier usage
pub use self::context::ContextWindow;
pub use self::core::{LineOutcome, RetryPolicy, TranslationService};
pub use self::formatting::FormatPreserver;
pub use self::rate_limit::RateLimiter;

// Submodules
pub mod context;
pub mod core;
pub mod formatting;
pub mod rate_limit;

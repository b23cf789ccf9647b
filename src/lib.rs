/*!
 * # subtrans - subtitle translation jobs
 *
 * A Rust library for translating subtitle files through online translation
 * services.
 *
 * ## Features
 *
 * - Parse and serialize SRT, WebVTT, ASS, SubViewer, SBV and Spruce STL
 *   files without altering timing
 * - Translate entries through Google, Gemini, DeepL or Yandex, with a
 *   per-service minimum delay, bounded retries and source-text fallback
 * - Optional context window of previous lines for services that use it
 * - Background jobs with progress, per-file results and post-completion
 *   editing
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Timestamp and subtitle codecs
 * - `providers`: Translation service adapters and their registry
 * - `translation`: Per-entry translation machinery:
 *   - `translation::core`: Rate limiting, retry and fallback
 *   - `translation::context`: Context window of previous lines
 *   - `translation::formatting`: Markup preservation
 * - `jobs`: Job store, workers and the job manager
 * - `file_utils`: File system operations and the staging area
 * - `app_controller`: Command line workflow
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod jobs;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, JobError, ProviderError, SubtitleError, TimestampError};
pub use jobs::{JobManager, JobStatus, TranslationJob};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use subtitle_processor::{SubtitleEntry, SubtitleFile, SubtitleFormat};
pub use translation::TranslationService;

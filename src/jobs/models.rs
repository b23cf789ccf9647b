/*!
 * Job records and the data exchanged with callers.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::subtitle_processor::SubtitleFormat;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// Outcome of one file, independent of the job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Completed,
    Failed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// An input file placed in storage for a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    /// File name as uploaded
    pub name: String,
    /// Location of the staged bytes
    pub path: PathBuf,
    /// Declared format
    pub format: SubtitleFormat,
}

/// Per-file result recorded once a file has been processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Name of the input file
    pub original_name: String,
    /// Name of the translated output, when one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_name: Option<String>,
    /// Location of the translated output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Number of entries in the output
    pub entries: usize,
    /// Entries kept in the source language after every attempt failed
    #[serde(default)]
    pub fallback_entries: usize,
    /// File-level status
    pub status: FileStatus,
    /// Reason for a failed file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationResult {
    /// Result of a file whose output was written
    pub fn completed(
        original_name: impl Into<String>,
        translated_name: impl Into<String>,
        output_path: PathBuf,
        entries: usize,
        fallback_entries: usize,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            translated_name: Some(translated_name.into()),
            output_path: Some(output_path),
            entries,
            fallback_entries,
            status: FileStatus::Completed,
            error: None,
        }
    }

    /// Result of a file that could not be processed
    pub fn failed(original_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            translated_name: None,
            output_path: None,
            entries: 0,
            fallback_entries: 0,
            status: FileStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// A translation job record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationJob {
    /// Opaque unique identifier
    pub job_id: String,
    /// Lifecycle state
    pub status: JobStatus,
    /// Percentage of entries processed, 0 to 100
    pub progress: u8,
    /// Number of submitted files
    pub total_files: usize,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Selected service name
    pub service: String,
    /// Effective context flag
    pub use_context: bool,
    /// Per-file results in submission order
    pub results: Vec<TranslationResult>,
    /// Reason of a failed job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the transition to a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Files to process, in submission order
    #[serde(default, skip_serializing)]
    pub files: Vec<StagedFile>,
}

impl TranslationJob {
    /// Creates a pending job
    pub fn new(
        job_id: impl Into<String>,
        files: Vec<StagedFile>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        service: impl Into<String>,
        use_context: bool,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            progress: 0,
            total_files: files.len(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            service: service.into(),
            use_context,
            results: Vec::new(),
            error: None,
            created_at: Utc::now(),
            completed_at: None,
            files,
        }
    }

    /// Whether the job reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// pending -> processing; returns false for any other state
    pub fn start(&mut self) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::Processing;
        true
    }

    /// Raise progress; lower values are ignored
    pub fn record_progress(&mut self, progress: u8) {
        if self.status == JobStatus::Processing {
            self.progress = self.progress.max(progress.min(100));
        }
    }

    /// Append a per-file result
    pub fn push_result(&mut self, result: TranslationResult) {
        self.results.push(result);
    }

    /// Transition to completed; no effect on a terminal job
    pub fn complete(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.completed_at = Some(Utc::now());
        true
    }

    /// Transition to failed with a reason; no effect on a terminal job
    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        true
    }

    /// Number of files whose result is failed
    pub fn failed_files(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.status == FileStatus::Failed)
            .count()
    }
}

/// A request to translate staged files
#[derive(Debug, Clone)]
pub struct JobSubmission {
    /// Identifier of the job to create
    pub job_id: String,
    /// Staged inputs in processing order
    pub files: Vec<StagedFile>,
    /// Source language code, or `auto`
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Service name
    pub service: String,
    /// Whether context is requested
    pub use_context: bool,
}

/// One editable entry of a translated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEntry {
    /// 1-based position
    pub index: usize,
    /// Start time in ms; negative values are rejected on save
    pub start_ms: i64,
    /// End time in ms
    pub end_ms: i64,
    /// Text with lines separated by `\n`
    pub text: String,
}

/// A translated file exposed for editing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableFile {
    /// Translated file name
    pub filename: String,
    /// Container format
    pub format: SubtitleFormat,
    /// Entries in file order
    pub entries: Vec<EditEntry>,
}

/// Replacement entries for one translated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdit {
    /// Translated file name
    pub filename: String,
    /// Full replacement entry set
    pub entries: Vec<EditEntry>,
}

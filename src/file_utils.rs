use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::app_config::JobsConfig;
use crate::errors::JobError;
use crate::jobs::models::StagedFile;
use crate::subtitle_processor::SubtitleFormat;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for translated subtitle
    // @params: input_file, output_dir, target_language, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Find subtitle files of any supported format under a directory
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && SubtitleFormat::from_path(path).is_ok() {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a subtitle file and decode it to text
    pub fn read_subtitle_text<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        Ok(decode_text(&bytes))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Decode raw subtitle bytes to text.
///
/// UTF-8 (with or without BOM) and BOM-marked UTF-16 are decoded exactly;
/// anything else is decoded as UTF-8 with invalid sequences replaced.
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                warn!("Input is not valid UTF-8, replacing invalid sequences");
                String::from_utf8_lossy(bytes).into_owned()
            }
        },
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// An uploaded file waiting to be staged
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client supplied file name
    pub name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Check that a job id names a single directory below the staging roots
///
/// Only ASCII letters, digits, `-` and `_` are accepted.
pub fn validate_job_id(job_id: &str) -> Result<(), JobError> {
    let valid = !job_id.is_empty()
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(JobError::InvalidSubmission(format!("Invalid job_id: '{}'", job_id)))
    }
}

/// Per-job upload directories under one root.
///
/// A job id is created by `stage_upload` and can then be handed to
/// `JobManager::submit_staged`.
#[derive(Debug, Clone)]
pub struct StagingArea {
    upload_root: PathBuf,
    output_root: PathBuf,
    max_files: usize,
    max_file_bytes: u64,
}

impl StagingArea {
    pub fn new<P1: Into<PathBuf>, P2: Into<PathBuf>>(
        upload_root: P1,
        output_root: P2,
        max_files: usize,
        max_file_bytes: u64,
    ) -> Self {
        Self {
            upload_root: upload_root.into(),
            output_root: output_root.into(),
            max_files,
            max_file_bytes,
        }
    }

    /// Staging area described by the jobs configuration
    pub fn from_config(config: &JobsConfig) -> Self {
        Self::new(
            &config.upload_dir,
            &config.output_dir,
            config.max_files_per_batch,
            config.max_file_size_mb.saturating_mul(1024 * 1024),
        )
    }

    /// Root directory holding every job's uploads
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    fn job_dir(&self, job_id: &str) -> PathBuf {
        self.upload_root.join(job_id)
    }

    /// Directory receiving a job's translated files
    pub fn output_dir(&self, job_id: &str) -> PathBuf {
        self.output_root.join(job_id)
    }

    /// Validate and store a batch of uploads under a fresh job id
    pub fn stage_upload(&self, uploads: &[Upload]) -> Result<(String, Vec<StagedFile>), JobError> {
        if uploads.is_empty() {
            return Err(JobError::InvalidSubmission("No files uploaded".to_string()));
        }
        if uploads.len() > self.max_files {
            return Err(JobError::InvalidSubmission(format!(
                "Too many files: {} (maximum {})",
                uploads.len(),
                self.max_files
            )));
        }

        let mut checked = Vec::with_capacity(uploads.len());
        let mut seen = HashSet::new();
        for upload in uploads {
            // Only the final path component is kept
            let name = Path::new(&upload.name)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .filter(|name| !name.is_empty())
                .ok_or_else(|| JobError::InvalidSubmission(format!("Invalid file name: '{}'", upload.name)))?;
            // Names differing only in case share a path on some filesystems
            if !seen.insert(name.to_lowercase()) {
                return Err(JobError::InvalidSubmission(format!("Duplicate file name: {}", name)));
            }
            let format = SubtitleFormat::from_path(&name)
                .map_err(|_| JobError::InvalidSubmission(format!("Unsupported file type: {}", name)))?;
            if upload.content.len() as u64 > self.max_file_bytes {
                return Err(JobError::InvalidSubmission(format!(
                    "File too large: {} ({} bytes, maximum {})",
                    name,
                    upload.content.len(),
                    self.max_file_bytes
                )));
            }
            checked.push((name, format, &upload.content));
        }

        let job_id = uuid::Uuid::new_v4().to_string();
        let dir = self.job_dir(&job_id);
        fs::create_dir_all(&dir).map_err(|e| JobError::storage(&dir, e))?;

        let mut staged = Vec::with_capacity(checked.len());
        for (name, format, content) in checked {
            let path = dir.join(&name);
            fs::write(&path, content).map_err(|e| JobError::storage(&path, e))?;
            staged.push(StagedFile { name, path, format });
        }

        debug!("Staged {} file(s) for job {}", staged.len(), job_id);
        Ok((job_id, staged))
    }

    /// Files previously staged for a job id
    pub fn staged_files(&self, job_id: &str) -> Result<Vec<StagedFile>, JobError> {
        if validate_job_id(job_id).is_err() {
            return Err(JobError::JobNotFound(job_id.to_string()));
        }
        let dir = self.job_dir(job_id);
        if !dir.is_dir() {
            return Err(JobError::JobNotFound(job_id.to_string()));
        }

        let mut staged = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|e| JobError::storage(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| JobError::storage(&dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Ok(format) = SubtitleFormat::from_path(&path) {
                let name = entry.file_name().to_string_lossy().to_string();
                staged.push(StagedFile { name, path, format });
            }
        }

        staged.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staged)
    }

    /// Remove a job's upload and output directories; missing ones are ignored
    pub fn purge(&self, job_id: &str) -> Result<(), JobError> {
        validate_job_id(job_id)?;
        for dir in [self.job_dir(job_id), self.output_dir(job_id)] {
            if dir.is_dir() {
                fs::remove_dir_all(&dir).map_err(|e| JobError::storage(&dir, e))?;
            }
        }
        Ok(())
    }
}

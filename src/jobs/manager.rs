/*!
 * Job manager: the entry point for submitting and inspecting jobs.
 *
 * Submission validates the request, records the job and dispatches one
 * worker task per job. Every other operation reads or mutates the job
 * store and returns immediately.
 */

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{JobError, SubtitleError};
use crate::file_utils::{validate_job_id, StagingArea};
use crate::language_utils::{is_auto, normalize_to_part1_or_part2t, validate_source_language};
use crate::providers::{ProviderRegistry, ServiceInfo};
use crate::subtitle_processor::timestamp::from_signed_ms;
use crate::subtitle_processor::{CodecOptions, SubtitleEntry, SubtitleFile};
use crate::translation::{RetryPolicy, TranslationService};
use super::models::{
    EditEntry, EditableFile, FileEdit, FileStatus, JobStatus, JobSubmission, TranslationJob,
};
use super::store::JobStore;
use super::worker::JobWorker;

/// Owns the job store and starts workers
#[derive(Debug)]
pub struct JobManager {
    config: Config,
    registry: ProviderRegistry,
    staging: StagingArea,
    store: Arc<JobStore>,
}

impl JobManager {
    /// Manager using the staging area described by the configuration
    pub fn new(config: Config, registry: ProviderRegistry) -> Self {
        let staging = StagingArea::from_config(&config.jobs);
        Self::with_staging(config, registry, staging)
    }

    /// Manager using an explicit staging area
    pub fn with_staging(config: Config, registry: ProviderRegistry, staging: StagingArea) -> Self {
        Self {
            config,
            registry,
            staging,
            store: Arc::new(JobStore::new()),
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            frame_rate: self.config.subtitles.stl_frame_rate,
        }
    }

    /// Catalogue of the registered services
    pub fn services(&self) -> Vec<ServiceInfo> {
        self.registry.services()
    }

    /// Validate a submission, record the job and start its worker.
    ///
    /// Must be called from within a Tokio runtime. Returns the job as
    /// recorded; processing continues in the background.
    pub fn submit(&self, submission: JobSubmission) -> Result<TranslationJob, JobError> {
        let JobSubmission {
            job_id,
            files,
            source_lang,
            target_lang,
            service,
            use_context,
        } = submission;

        if job_id.trim().is_empty() {
            return Err(JobError::InvalidSubmission("Missing job_id".to_string()));
        }
        validate_job_id(&job_id)?;
        if files.is_empty() {
            return Err(JobError::InvalidSubmission("No files provided".to_string()));
        }
        let mut names = HashSet::new();
        if let Some(duplicate) = files.iter().find(|file| !names.insert(file.name.to_lowercase())) {
            return Err(JobError::InvalidSubmission(format!(
                "Duplicate file name: {}",
                duplicate.name
            )));
        }
        let registered = self
            .registry
            .get(&service)
            .ok_or_else(|| JobError::InvalidSubmission(format!("Unknown service: {}", service)))?;
        if !registered.adapter.is_available() {
            return Err(JobError::InvalidSubmission(format!(
                "Service {} is not available",
                service
            )));
        }
        let (source_lang, target_lang) = normalize_languages(&source_lang, &target_lang)?;
        if let Some(missing) = files.iter().find(|file| !file.path.is_file()) {
            return Err(JobError::InvalidSubmission(format!(
                "File not found: {}",
                missing.name
            )));
        }

        let supports_context = registered.adapter.supports_context();
        if use_context && !supports_context {
            debug!("Service {} has no context support, disabling context", service);
        }
        let job = TranslationJob::new(
            &job_id,
            files,
            &source_lang,
            &target_lang,
            &service,
            use_context && supports_context,
        );
        self.store.create(job)?;

        let translator = TranslationService::new(
            Arc::clone(&registered.adapter),
            registered.min_delay,
            RetryPolicy::from_config(&self.config.translation.common),
            source_lang,
            target_lang,
        );
        let worker = JobWorker::new(
            Arc::clone(&self.store),
            translator,
            self.config.translation.common.context_window_size,
            self.codec_options(),
            self.staging.output_dir(&job_id),
        );
        tokio::spawn(worker.run(job_id.clone()));

        info!("Submitted job {} using {}", job_id, service);
        self.store.get(&job_id)
    }

    /// Submit the files previously staged under `job_id`.
    ///
    /// A job id with no staged files is recorded as a failed job.
    pub fn submit_staged(
        &self,
        job_id: &str,
        source_lang: &str,
        target_lang: &str,
        service: &str,
        use_context: bool,
    ) -> Result<TranslationJob, JobError> {
        if job_id.trim().is_empty() {
            return Err(JobError::InvalidSubmission("Missing job_id".to_string()));
        }
        validate_job_id(job_id)?;

        let files = match self.staging.staged_files(job_id) {
            Ok(files) if files.is_empty() => {
                return self.record_failed(job_id, source_lang, target_lang, service, "No subtitle files found");
            }
            Ok(files) => files,
            Err(JobError::JobNotFound(_)) => {
                return self.record_failed(job_id, source_lang, target_lang, service, "Invalid job_id");
            }
            Err(e) => return Err(e),
        };

        self.submit(JobSubmission {
            job_id: job_id.to_string(),
            files,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            service: service.to_string(),
            use_context,
        })
    }

    fn record_failed(
        &self,
        job_id: &str,
        source_lang: &str,
        target_lang: &str,
        service: &str,
        reason: &str,
    ) -> Result<TranslationJob, JobError> {
        warn!("Rejecting job {}: {}", job_id, reason);
        let mut job = TranslationJob::new(job_id, Vec::new(), source_lang, target_lang, service, false);
        job.fail(reason);
        self.store.create(job)?;
        self.store.get(job_id)
    }

    /// Snapshot of a job
    pub fn status(&self, job_id: &str) -> Result<TranslationJob, JobError> {
        self.store.get(job_id)
    }

    fn completed_job(&self, job_id: &str) -> Result<TranslationJob, JobError> {
        let job = self.store.get(job_id)?;
        if job.status != JobStatus::Completed {
            return Err(JobError::NotReady {
                job_id: job_id.to_string(),
                status: job.status.to_string(),
            });
        }
        Ok(job)
    }

    /// Parsed entries of every translated output of a completed job
    pub fn edit_files(&self, job_id: &str) -> Result<Vec<EditableFile>, JobError> {
        let job = self.completed_job(job_id)?;
        let codec = self.codec_options();

        let mut files = Vec::new();
        for result in &job.results {
            let (Some(name), Some(path)) = (&result.translated_name, &result.output_path) else {
                continue;
            };
            if result.status != FileStatus::Completed {
                continue;
            }
            let parsed = SubtitleFile::parse_path(path, &codec)?;
            let entries = parsed
                .entries
                .iter()
                .enumerate()
                .map(|(position, entry)| EditEntry {
                    index: position + 1,
                    start_ms: entry.start_ms as i64,
                    end_ms: entry.end_ms as i64,
                    text: entry.text(),
                })
                .collect();
            files.push(EditableFile {
                filename: name.clone(),
                format: parsed.format,
                entries,
            });
        }
        Ok(files)
    }

    /// Replace the entries of translated outputs and write them back.
    ///
    /// Every edit is validated and serialized before any file is written.
    /// Filenames that match no translated output are skipped.
    pub fn save_edits(&self, job_id: &str, edits: &[FileEdit]) -> Result<TranslationJob, JobError> {
        let job = self.completed_job(job_id)?;
        let codec = self.codec_options();

        let mut pending: Vec<(String, PathBuf, String, usize)> = Vec::new();
        for edit in edits {
            let target = job.results.iter().find(|result| {
                result.status == FileStatus::Completed
                    && result.translated_name.as_deref() == Some(edit.filename.as_str())
            });
            let Some(path) = target.and_then(|result| result.output_path.clone()) else {
                warn!("Job {}: no translated file named {}, skipping", job_id, edit.filename);
                continue;
            };

            let existing = SubtitleFile::parse_path(&path, &codec)?;
            let entries = merge_entries(&existing, &edit.entries)?;
            let count = entries.len();
            let content = existing.with_entries(entries).serialize(&codec)?;
            pending.push((edit.filename.clone(), path, content, count));
        }

        for (filename, path, content, count) in pending {
            fs::write(&path, content).map_err(|e| JobError::storage(&path, e))?;
            self.store.mutate(job_id, |job| {
                for result in job.results.iter_mut() {
                    if result.translated_name.as_deref() == Some(filename.as_str()) {
                        result.entries = count;
                    }
                }
            })?;
            debug!("Job {}: saved {} edited entries to {}", job_id, count, filename);
        }

        self.store.get(job_id)
    }

    /// Remove a job record together with its staged and translated files
    pub fn delete(&self, job_id: &str) -> Result<(), JobError> {
        self.store.delete(job_id)?;
        self.staging.purge(job_id)?;
        info!("Deleted job {}", job_id);
        Ok(())
    }

    /// Remove jobs older than the configured TTL and their files
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Vec<String> {
        let hours = i64::try_from(self.config.jobs.job_ttl_hours).unwrap_or(i64::MAX);
        let ttl = Duration::try_hours(hours).unwrap_or(Duration::MAX);
        let expired = self.store.remove_expired(ttl, now);
        for job_id in &expired {
            if let Err(e) = self.staging.purge(job_id) {
                warn!("Cannot remove files of expired job {}: {}", job_id, e);
            }
        }
        if !expired.is_empty() {
            info!("Purged {} expired job(s)", expired.len());
        }
        expired
    }
}

fn normalize_languages(source_lang: &str, target_lang: &str) -> Result<(String, String), JobError> {
    let invalid = |e: anyhow::Error| JobError::InvalidSubmission(e.to_string());

    validate_source_language(source_lang).map_err(invalid)?;
    if is_auto(target_lang) {
        return Err(JobError::InvalidSubmission(
            "Target language cannot be auto".to_string(),
        ));
    }
    let source = normalize_to_part1_or_part2t(source_lang).map_err(invalid)?;
    let target = normalize_to_part1_or_part2t(target_lang).map_err(invalid)?;
    Ok((source, target))
}

// Edited timing and text, existing event fields kept by position
fn merge_entries(existing: &SubtitleFile, edits: &[EditEntry]) -> Result<Vec<SubtitleEntry>, JobError> {
    let mut entries = Vec::with_capacity(edits.len());
    for (position, edit) in edits.iter().enumerate() {
        let start_ms = from_signed_ms(edit.start_ms).map_err(SubtitleError::from)?;
        let end_ms = from_signed_ms(edit.end_ms).map_err(SubtitleError::from)?;
        let mut entry = SubtitleEntry::new(position + 1, start_ms, end_ms, &edit.text);
        if let Some(previous) = existing.entries.get(position) {
            entry.fields = previous.fields.clone();
        }
        entry.validate()?;
        entries.push(entry);
    }
    Ok(entries)
}

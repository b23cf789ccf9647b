use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, Upload};
use crate::jobs::{FileStatus, JobManager, JobStatus, JobSubmission, TranslationJob};
use crate::providers::ProviderRegistry;

// @module: Application controller for command line translation runs

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Options of one translation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Service name; the configured default when absent
    pub service: Option<String>,
    /// Context flag; the configured default when absent
    pub use_context: Option<bool>,
    /// Hide the progress bar
    pub quiet: bool,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Job engine
    manager: JobManager,
}

impl Controller {
    // @method: Create a controller with the built-in services
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let registry = ProviderRegistry::from_config(&config.translation);
        Ok(Self::with_registry(config, registry))
    }

    /// Create a controller using an explicit set of services
    pub fn with_registry(config: Config, registry: ProviderRegistry) -> Self {
        let manager = JobManager::new(config.clone(), registry);
        Self { config, manager }
    }

    /// The job engine
    pub fn manager(&self) -> &JobManager {
        &self.manager
    }

    /// Expand files and directories into the subtitle files they contain
    pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                files.extend(FileManager::find_subtitle_files(path)?);
            } else if path.is_file() {
                files.push(path.clone());
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", path));
            }
        }
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found"));
        }
        Ok(files)
    }

    fn uploads(files: &[PathBuf]) -> Result<Vec<Upload>> {
        let mut names = HashSet::new();
        let mut uploads = Vec::with_capacity(files.len());
        for path in files {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| anyhow!("Invalid file name: {:?}", path))?;
            if !names.insert(name.clone()) {
                return Err(anyhow!("Duplicate file name in batch: {}", name));
            }
            let content = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
            uploads.push(Upload::new(name, content));
        }
        Ok(uploads)
    }

    /// Stage the inputs, run one job over them and wait for it to finish
    pub async fn run(&self, paths: &[PathBuf], options: RunOptions) -> Result<TranslationJob> {
        let start_time = Instant::now();
        let files = Self::collect_inputs(paths)?;
        let uploads = Self::uploads(&files)?;

        let (job_id, staged) = self.manager.staging().stage_upload(&uploads)?;
        let service = options
            .service
            .unwrap_or_else(|| self.config.translation.default_service.to_lowercase_string());
        let use_context = options
            .use_context
            .unwrap_or(self.config.translation.common.use_context);

        info!(
            "Translating {} file(s) from {} to {} with {}",
            staged.len(),
            self.config.source_language,
            self.config.target_language,
            service
        );

        let submitted = self.manager.submit(JobSubmission {
            job_id: job_id.clone(),
            files: staged,
            source_lang: self.config.source_language.clone(),
            target_lang: self.config.target_language.clone(),
            service,
            use_context,
        });
        if let Err(e) = submitted {
            let _ = self.manager.staging().purge(&job_id);
            return Err(e.into());
        }

        let job = self.wait_for_job(&job_id, options.quiet).await?;
        self.report(&job, start_time.elapsed());
        Ok(job)
    }

    async fn wait_for_job(&self, job_id: &str, quiet: bool) -> Result<TranslationJob> {
        let progress_bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(100)
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        loop {
            let job = self.manager.status(job_id)?;
            progress_bar.set_position(job.progress as u64);
            if job.is_terminal() {
                progress_bar.finish_with_message(job.status.to_string());
                return Ok(job);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn report(&self, job: &TranslationJob, elapsed: Duration) {
        if job.status == JobStatus::Failed {
            error!(
                "Job {} failed: {}",
                job.job_id,
                job.error.as_deref().unwrap_or("unknown error")
            );
            return;
        }

        for result in &job.results {
            match (result.status, &result.output_path) {
                (FileStatus::Completed, Some(path)) => {
                    info!("{} -> {} ({} entries)", result.original_name, path.display(), result.entries);
                    if result.fallback_entries > 0 {
                        warn!(
                            "{}: {} entries kept in the source language",
                            result.original_name, result.fallback_entries
                        );
                    }
                }
                _ => error!(
                    "{}: {}",
                    result.original_name,
                    result.error.as_deref().unwrap_or("failed")
                ),
            }
        }

        debug!("Job {} finished", job.job_id);
        info!(
            "Translated {}/{} file(s) in {}",
            job.results.len() - job.failed_files(),
            job.total_files,
            Self::format_duration(elapsed)
        );
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}

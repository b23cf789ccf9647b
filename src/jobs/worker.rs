/*!
 * Per-job worker.
 *
 * A worker owns one job from `processing` to a terminal state. Files are
 * handled sequentially in submission order and every change to the job
 * record goes through `JobStore::mutate`. When the record disappears from
 * the store the worker stops without touching anything else.
 */

use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::JobError;
use crate::file_utils::{decode_text, FileManager};
use crate::subtitle_processor::{CodecOptions, SubtitleFile};
use crate::translation::{ContextWindow, FormatPreserver, TranslationService};
use super::models::{StagedFile, TranslationResult};
use super::store::JobStore;

/// Why a worker stopped before completing its job
#[derive(Debug)]
enum Halt {
    /// The job record was deleted
    Deleted,
    /// A job-level precondition failed
    Failed(String),
}

impl From<JobError> for Halt {
    fn from(error: JobError) -> Self {
        match error {
            JobError::JobNotFound(_) => Halt::Deleted,
            other => Halt::Failed(other.to_string()),
        }
    }
}

// @struct: Work captured when the job starts
struct JobPlan {
    files: Vec<StagedFile>,
    target_lang: String,
    use_context: bool,
}

// @struct: A staged file after reading and parsing
struct LoadedFile {
    staged: StagedFile,
    parsed: Result<SubtitleFile, String>,
}

/// Runs one job to completion
#[derive(Debug)]
pub struct JobWorker {
    store: Arc<JobStore>,
    service: TranslationService,
    context_window_size: usize,
    codec: CodecOptions,
    output_dir: PathBuf,
}

impl JobWorker {
    /// Create a worker writing translated files to `output_dir`
    pub fn new(
        store: Arc<JobStore>,
        service: TranslationService,
        context_window_size: usize,
        codec: CodecOptions,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            service,
            context_window_size,
            codec,
            output_dir: output_dir.into(),
        }
    }

    /// Process the job until it is completed, failed or deleted
    pub async fn run(self, job_id: String) {
        match self.process(&job_id).await {
            Ok(()) => {}
            Err(Halt::Deleted) => {
                info!("Job {} was deleted, abandoning remaining work", job_id);
                self.discard_output().await;
            }
            Err(Halt::Failed(reason)) => {
                error!("Job {} failed: {}", job_id, reason);
                let _ = self.store.mutate(&job_id, |job| {
                    job.results.clear();
                    job.fail(reason)
                });
            }
        }
    }

    async fn process(&self, job_id: &str) -> Result<(), Halt> {
        let plan = self.store.mutate(job_id, |job| {
            job.start().then(|| JobPlan {
                files: job.files.clone(),
                target_lang: job.target_lang.clone(),
                use_context: job.use_context,
            })
        })?;
        let Some(plan) = plan else {
            debug!("Job {} is not pending, nothing to do", job_id);
            return Ok(());
        };
        info!(
            "Job {} started: {} file(s) via {}",
            job_id,
            plan.files.len(),
            self.service.service_name()
        );

        if plan.files.is_empty() {
            return Err(Halt::Failed("No files to process".to_string()));
        }
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Halt::Failed(JobError::storage(&self.output_dir, e).to_string()))?;

        let loaded = self.load_files(&plan.files).await;
        let total: usize = loaded
            .iter()
            .filter_map(|file| file.parsed.as_ref().ok())
            .map(|file| file.entries.len())
            .sum();
        debug!("Job {} has {} entries in total", job_id, total);

        let use_context = plan.use_context && self.service.supports_context();
        let mut window = ContextWindow::new(self.context_window_size);
        let mut done = 0usize;

        for file in loaded {
            let result = match file.parsed {
                Ok(parsed) => {
                    let context = use_context.then_some(&mut window);
                    self.translate_file(job_id, parsed, &plan.target_lang, context, &mut done, total)
                        .await?
                }
                Err(reason) => {
                    warn!("Job {}: {} failed: {}", job_id, file.staged.name, reason);
                    TranslationResult::failed(&file.staged.name, reason)
                }
            };
            self.store.mutate(job_id, |job| job.push_result(result))?;
        }

        self.store.mutate(job_id, |job| job.complete())?;
        info!("Job {} completed", job_id);
        Ok(())
    }

    async fn load_files(&self, files: &[StagedFile]) -> Vec<LoadedFile> {
        let mut loaded = Vec::with_capacity(files.len());
        for staged in files {
            let parsed = match tokio::fs::read(&staged.path).await {
                Ok(bytes) => SubtitleFile::parse(&staged.name, &decode_text(&bytes), staged.format, &self.codec)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(JobError::storage(&staged.path, e).to_string()),
            };
            loaded.push(LoadedFile {
                staged: staged.clone(),
                parsed,
            });
        }
        loaded
    }

    async fn translate_file(
        &self,
        job_id: &str,
        mut file: SubtitleFile,
        target_lang: &str,
        mut context: Option<&mut ContextWindow>,
        done: &mut usize,
        total: usize,
    ) -> Result<TranslationResult, Halt> {
        // Context never crosses file boundaries
        if let Some(window) = context.as_deref_mut() {
            window.reset();
        }
        let mut fallback_entries = 0;

        for entry in file.entries.iter_mut() {
            let source = entry.text();
            if !entry.is_blank() && !FormatPreserver::is_markup_only(&source) {
                let snapshot = context.as_deref().map(ContextWindow::snapshot);
                let outcome = self.service.translate_line(&source, snapshot.as_deref()).await;
                if outcome.fell_back {
                    fallback_entries += 1;
                }
                entry.set_text(&outcome.text);
                if let Some(window) = context.as_deref_mut() {
                    window.push(source);
                }
            }

            *done += 1;
            let progress = (*done * 100 / total.max(1)) as u8;
            self.store.mutate(job_id, |job| job.record_progress(progress))?;
        }

        let output_path = FileManager::generate_output_path(
            &file.filename,
            &self.output_dir,
            target_lang,
            file.format.extension(),
        );
        let translated_name = output_name(&output_path);

        let content = match file.serialize(&self.codec) {
            Ok(content) => content,
            Err(e) => {
                warn!("Job {}: cannot serialize {}: {}", job_id, file.filename, e);
                return Ok(TranslationResult::failed(&file.filename, e.to_string()));
            }
        };

        if !self.store.contains(job_id) {
            return Err(Halt::Deleted);
        }
        if let Err(e) = tokio::fs::write(&output_path, content).await {
            let error = JobError::storage(&output_path, e);
            warn!("Job {}: {}", job_id, error);
            return Ok(TranslationResult::failed(&file.filename, error.to_string()));
        }

        debug!("Job {}: wrote {}", job_id, output_path.display());
        Ok(TranslationResult::completed(
            &file.filename,
            translated_name,
            output_path,
            file.entries.len(),
            fallback_entries,
        ))
    }

    // Output written between a deletion and its detection
    async fn discard_output(&self) {
        if tokio::fs::metadata(&self.output_dir).await.is_ok() {
            if let Err(e) = tokio::fs::remove_dir_all(&self.output_dir).await {
                warn!("Cannot remove {}: {}", self.output_dir.display(), e);
            }
        }
    }
}

fn output_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

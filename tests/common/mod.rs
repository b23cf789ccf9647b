/*!
 * Common test utilities for the subtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use subtrans::app_config::Config;
use subtrans::file_utils::{StagingArea, Upload};
use subtrans::jobs::{JobManager, JobSubmission, StagedFile, TranslationJob};
use subtrans::providers::{MockProvider, ProviderRegistry};
use subtrans::subtitle_processor::SubtitleFormat;

/// Two-entry SRT file used by the end-to-end scenarios
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:03,500
Hello

2
00:00:04,000 --> 00:00:07,000
World
";

pub const SAMPLE_VTT: &str = "WEBVTT
Kind: captions

NOTE written by hand

intro
00:00:01.000 --> 00:00:02.500 align:start
Hello there

00:00:03.000 --> 00:00:05.250
Second cue
on two lines
";

pub const SAMPLE_ASS: &str = "[Script Info]
Title: Demo
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize
Style: Default,Arial,20

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.00,0:00:02.50,Default,,0,0,0,,Hello, world
Dialogue: 1,0:00:03.00,0:00:04.00,Sign,Bob,10,10,10,,{\\i1}First\\NSecond
";

pub const SAMPLE_SUB: &str = "[INFORMATION]
[TITLE]Demo
[END INFORMATION]
[SUBTITLE]

00:00:01.00,00:00:02.50
Hello[br]World

00:00:03.00,00:00:04.00
Bye
";

pub const SAMPLE_SBV: &str = "0:00:01.000,0:00:02.500
Hello

0:00:03.000,0:00:04.000
Line one
Line two
";

pub const SAMPLE_STL: &str = "//Font select and font size
$FontName = Arial
$FontSize = 30

00:00:01:00 , 00:00:02:12 , Hello|World
00:00:03:00 , 00:00:04:00 , Second, with comma
";

/// Sample content for a format
pub fn sample_for(format: SubtitleFormat) -> &'static str {
    match format {
        SubtitleFormat::Srt => SAMPLE_SRT,
        SubtitleFormat::Vtt => SAMPLE_VTT,
        SubtitleFormat::Ass => SAMPLE_ASS,
        SubtitleFormat::Sub => SAMPLE_SUB,
        SubtitleFormat::Sbv => SAMPLE_SBV,
        SubtitleFormat::Stl => SAMPLE_STL,
    }
}

/// SRT file with one entry per text
pub fn srt_with_lines(texts: &[&str]) -> String {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let start = (i as u64) * 2000;
            format!(
                "{}\n00:00:{:02},000 --> 00:00:{:02},500\n{}\n",
                i + 1,
                start / 1000,
                start / 1000 + 1,
                text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Route library logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Configuration with fast retries and directories under `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.translation.common.retry_count = 2;
    config.translation.common.retry_backoff_ms = 0;
    config.translation.common.context_window_size = 3;
    config.jobs.upload_dir = root.join("uploads").to_string_lossy().to_string();
    config.jobs.output_dir = root.join("outputs").to_string_lossy().to_string();
    config
}

/// Registry holding a single mock under `name`
pub fn mock_registry(name: &str, provider: MockProvider) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(name, Arc::new(provider), Duration::ZERO);
    registry
}

/// Job manager backed by a single mock service
pub fn mock_manager(root: &Path, name: &str, provider: MockProvider) -> JobManager {
    let config = test_config(root);
    let staging = StagingArea::from_config(&config.jobs);
    JobManager::with_staging(config, mock_registry(name, provider), staging)
}

/// Stage named files in the manager's staging area
pub fn stage(manager: &JobManager, files: &[(&str, &str)]) -> (String, Vec<StagedFile>) {
    let uploads: Vec<Upload> = files
        .iter()
        .map(|(name, content)| Upload::new(*name, content.as_bytes()))
        .collect();
    manager
        .staging()
        .stage_upload(&uploads)
        .expect("staging should succeed")
}

/// Submission of staged files, en -> ar
pub fn submission(job_id: &str, files: Vec<StagedFile>, service: &str, use_context: bool) -> JobSubmission {
    JobSubmission {
        job_id: job_id.to_string(),
        files,
        source_lang: "en".to_string(),
        target_lang: "ar".to_string(),
        service: service.to_string(),
        use_context,
    }
}

/// Poll until the job reaches a terminal state
pub async fn wait_for_terminal(manager: &JobManager, job_id: &str) -> TranslationJob {
    for _ in 0..1000 {
        let job = manager.status(job_id).expect("job should exist");
        if job.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not finish in time", job_id);
}

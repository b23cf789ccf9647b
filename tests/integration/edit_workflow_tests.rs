/*!
 * Integration tests for editing translated files after completion
 */

use subtrans::errors::{JobError, SubtitleError, TimestampError};
use subtrans::jobs::{EditEntry, FileEdit, JobManager, JobStatus};
use subtrans::providers::MockProvider;
use subtrans::subtitle_processor::{CodecOptions, SubtitleFile, SubtitleFormat};

use crate::common;

async fn completed_job(manager: &JobManager, files: &[(&str, &str)]) -> String {
    let (job_id, staged) = common::stage(manager, files);
    manager
        .submit(common::submission(&job_id, staged, "google", false))
        .unwrap();
    let job = common::wait_for_terminal(manager, &job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    job_id
}

#[tokio::test]
async fn test_editFiles_afterCompletion_shouldExposeEntries() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::working());
    let job_id = completed_job(&manager, &[("movie.srt", common::SAMPLE_SRT)]).await;

    let files = manager.edit_files(&job_id).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "movie.ar.srt");
    assert_eq!(files[0].format, SubtitleFormat::Srt);
    assert_eq!(
        files[0].entries,
        vec![
            EditEntry { index: 1, start_ms: 1000, end_ms: 3500, text: "[ar] Hello".to_string() },
            EditEntry { index: 2, start_ms: 4000, end_ms: 7000, text: "[ar] World".to_string() },
        ]
    );
}

#[tokio::test]
async fn test_saveEdits_shouldRewriteOutput() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::working());
    let job_id = completed_job(&manager, &[("movie.srt", common::SAMPLE_SRT)]).await;

    let edit = FileEdit {
        filename: "movie.ar.srt".to_string(),
        entries: vec![
            EditEntry { index: 1, start_ms: 1200, end_ms: 3000, text: "مرحبا".to_string() },
            EditEntry { index: 2, start_ms: 4000, end_ms: 7000, text: "عالم\nثاني".to_string() },
            EditEntry { index: 3, start_ms: 8000, end_ms: 9000, text: "جديد".to_string() },
        ],
    };
    let job = manager.save_edits(&job_id, &[edit]).unwrap();
    assert_eq!(job.results[0].entries, 3);

    let path = job.results[0].output_path.clone().unwrap();
    let saved = SubtitleFile::parse_path(&path, &CodecOptions::default()).unwrap();
    assert_eq!(saved.entries.len(), 3);
    assert_eq!(saved.entries[0].start_ms, 1200);
    assert_eq!(saved.entries[1].lines, vec!["عالم", "ثاني"]);

    let reread = manager.edit_files(&job_id).unwrap();
    assert_eq!(reread[0].entries[2].text, "جديد");
}

#[tokio::test]
async fn test_saveEdits_withAssFile_shouldKeepHeaderAndFields() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::working());
    let job_id = completed_job(&manager, &[("show.ass", common::SAMPLE_ASS)]).await;

    let mut files = manager.edit_files(&job_id).unwrap();
    let file = files.remove(0);
    assert_eq!(file.filename, "show.ar.ass");
    let mut entries = file.entries;
    entries[1].text = "Edited\nTwice".to_string();

    let job = manager
        .save_edits(&job_id, &[FileEdit { filename: file.filename, entries }])
        .unwrap();
    let content = std::fs::read_to_string(job.results[0].output_path.as_ref().unwrap()).unwrap();

    assert!(content.starts_with("[Script Info]\nTitle: Demo"));
    assert!(content.contains("Dialogue: 1,0:00:03.00,0:00:04.00,Sign,Bob,10,10,10,,Edited\\NTwice"));
}

#[tokio::test]
async fn test_saveEdits_withNegativeTimestamp_shouldRejectAndKeepFile() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::working());
    let job_id = completed_job(&manager, &[("movie.srt", common::SAMPLE_SRT)]).await;
    let path = manager.status(&job_id).unwrap().results[0].output_path.clone().unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let edit = FileEdit {
        filename: "movie.ar.srt".to_string(),
        entries: vec![EditEntry { index: 1, start_ms: -10, end_ms: 500, text: "x".to_string() }],
    };
    let err = manager.save_edits(&job_id, &[edit]).unwrap_err();

    assert!(matches!(
        err,
        JobError::Subtitle(SubtitleError::Timestamp(TimestampError::TimestampOutOfRange { value: -10 }))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_saveEdits_withReversedTiming_shouldRejectEntry() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::working());
    let job_id = completed_job(&manager, &[("movie.srt", common::SAMPLE_SRT)]).await;

    let edit = FileEdit {
        filename: "movie.ar.srt".to_string(),
        entries: vec![EditEntry { index: 1, start_ms: 5000, end_ms: 1000, text: "x".to_string() }],
    };
    assert!(matches!(
        manager.save_edits(&job_id, &[edit]),
        Err(JobError::Subtitle(SubtitleError::InvalidEntry { index: 1, .. }))
    ));
}

#[tokio::test]
async fn test_saveEdits_withUnknownFilename_shouldSkipIt() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::working());
    let job_id = completed_job(&manager, &[("movie.srt", common::SAMPLE_SRT)]).await;

    let edits = vec![
        FileEdit {
            filename: "other.ar.srt".to_string(),
            entries: vec![EditEntry { index: 1, start_ms: 0, end_ms: 1, text: "x".to_string() }],
        },
        FileEdit {
            filename: "movie.ar.srt".to_string(),
            entries: vec![EditEntry { index: 1, start_ms: 0, end_ms: 1000, text: "Only".to_string() }],
        },
    ];
    let job = manager.save_edits(&job_id, &edits).unwrap();

    assert_eq!(job.results.len(), 1);
    assert_eq!(job.results[0].entries, 1);
}

#[tokio::test]
async fn test_editFiles_whileProcessing_shouldReturnNotReady() {
    let dir = common::create_temp_dir().unwrap();
    let manager = common::mock_manager(dir.path(), "google", MockProvider::slow(200));
    let (job_id, staged) = common::stage(&manager, &[("movie.srt", common::SAMPLE_SRT)]);
    manager
        .submit(common::submission(&job_id, staged, "google", false))
        .unwrap();

    assert!(matches!(manager.edit_files(&job_id), Err(JobError::NotReady { .. })));
    assert!(matches!(manager.edit_files("missing"), Err(JobError::JobNotFound(_))));
}

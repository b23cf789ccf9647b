/*!
 * Tests for file helpers and the upload staging area
 */

use std::path::PathBuf;

use subtrans::app_config::JobsConfig;
use subtrans::errors::JobError;
use subtrans::file_utils::{decode_text, validate_job_id, FileManager, StagingArea, Upload};
use subtrans::subtitle_processor::SubtitleFormat;

use crate::common;

#[test]
fn test_decodeText_withUtf16Be_shouldDecode() {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in "مرحبا".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    assert_eq!(decode_text(&bytes), "مرحبا");
}

#[test]
fn test_decodeText_withPlainUtf8_shouldKeepText() {
    assert_eq!(decode_text("héllo\nwörld".as_bytes()), "héllo\nwörld");
}

#[test]
fn test_findSubtitleFiles_shouldWalkNestedDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    common::create_test_file(&nested, "deep.ass", common::SAMPLE_ASS).unwrap();
    common::create_test_file(dir.path(), "top.STL", common::SAMPLE_STL).unwrap();
    common::create_test_file(dir.path(), "cover.jpg", "").unwrap();

    let files = FileManager::find_subtitle_files(dir.path()).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|path| path.ends_with("a/b/deep.ass")));
    assert!(files.iter().any(|path| path.ends_with("top.STL")));
}

#[test]
fn test_writeToFile_thenRead_shouldCreateParents() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("x").join("y").join("out.srt");

    FileManager::write_to_file(&path, common::SAMPLE_SRT).unwrap();
    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(dir.path().join("x")));
    assert_eq!(FileManager::read_subtitle_text(&path).unwrap(), common::SAMPLE_SRT);
}

#[test]
fn test_stagingFromConfig_shouldUseConfiguredRoots() {
    let dir = common::create_temp_dir().unwrap();
    let config = JobsConfig {
        upload_dir: dir.path().join("up").to_string_lossy().to_string(),
        output_dir: dir.path().join("down").to_string_lossy().to_string(),
        ..common::test_config(dir.path()).jobs
    };
    let staging = StagingArea::from_config(&config);

    assert_eq!(staging.upload_root(), dir.path().join("up"));
    assert_eq!(staging.output_dir("job"), dir.path().join("down").join("job"));
}

#[test]
fn test_stagedFiles_withUnsafeOrUnknownId_shouldBeNotFound() {
    let dir = common::create_temp_dir().unwrap();
    let staging = StagingArea::new(dir.path().join("up"), dir.path().join("out"), 5, 1024);

    for job_id in ["", "../up", "missing", "a/b"] {
        assert!(
            matches!(staging.staged_files(job_id), Err(JobError::JobNotFound(_))),
            "{:?} should not resolve",
            job_id
        );
    }
}

#[test]
fn test_stageUpload_shouldKeepFormatsAndContent() {
    let dir = common::create_temp_dir().unwrap();
    let staging = StagingArea::new(dir.path().join("up"), dir.path().join("out"), 5, 4096);

    let uploads = vec![
        Upload::new("episode.sbv", common::SAMPLE_SBV),
        Upload::new("episode.sub", common::SAMPLE_SUB),
    ];
    let (job_id, staged) = staging.stage_upload(&uploads).unwrap();

    assert_eq!(staged[0].format, SubtitleFormat::Sbv);
    assert_eq!(staged[1].format, SubtitleFormat::Sub);
    assert_eq!(staged[0].path, PathBuf::from(staging.upload_root()).join(&job_id).join("episode.sbv"));
    assert_eq!(std::fs::read_to_string(&staged[1].path).unwrap(), common::SAMPLE_SUB);
}

#[test]
fn test_stageUpload_withEmptyBatch_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let staging = StagingArea::new(dir.path().join("up"), dir.path().join("out"), 5, 4096);
    assert!(matches!(staging.stage_upload(&[]), Err(JobError::InvalidSubmission(_))));
}

#[test]
fn test_purge_shouldRemoveOnlyThatJob() {
    let dir = common::create_temp_dir().unwrap();
    let staging = StagingArea::new(dir.path().join("up"), dir.path().join("out"), 5, 4096);
    let (first, _) = staging.stage_upload(&[Upload::new("a.srt", common::SAMPLE_SRT)]).unwrap();
    let (second, _) = staging.stage_upload(&[Upload::new("b.srt", common::SAMPLE_SRT)]).unwrap();

    staging.purge(&first).unwrap();
    staging.purge(&first).unwrap();

    assert!(staging.staged_files(&first).is_err());
    assert_eq!(staging.staged_files(&second).unwrap().len(), 1);
}

#[test]
fn test_stageUpload_withDuplicateNames_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let staging = StagingArea::new(dir.path().join("up"), dir.path().join("out"), 5, 4096);

    for second in ["movie.srt", "sub/movie.srt", "MOVIE.srt"] {
        let uploads = vec![
            Upload::new("movie.srt", common::SAMPLE_SRT),
            Upload::new(second, common::SAMPLE_SRT),
        ];
        assert!(
            matches!(staging.stage_upload(&uploads), Err(JobError::InvalidSubmission(_))),
            "{:?} should clash with movie.srt",
            second
        );
    }
    assert!(!dir.path().join("up").exists());
}

#[test]
fn test_validateJobId_shouldAcceptOnlyPlainIds() {
    assert!(validate_job_id("6f1c2b9e-0d4a-4a57-9d3e-2f8f0c1d7a11").is_ok());
    assert!(validate_job_id("job_1").is_ok());
    for job_id in ["", ".", "..", "../up", "/tmp/x", "a/b", "a\\b", "job 1"] {
        assert!(
            matches!(validate_job_id(job_id), Err(JobError::InvalidSubmission(_))),
            "{:?} should be rejected",
            job_id
        );
    }
}

#[test]
fn test_purge_withTraversalId_shouldLeaveOtherDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let staging = StagingArea::new(dir.path().join("up").join("jobs"), dir.path().join("out"), 5, 4096);
    let (job_id, _) = staging.stage_upload(&[Upload::new("a.srt", common::SAMPLE_SRT)]).unwrap();
    let keep = common::create_test_file(dir.path(), "keep.txt", "keep").unwrap();

    for job_id in ["..", "../..", "", "/"] {
        assert!(matches!(staging.purge(job_id), Err(JobError::InvalidSubmission(_))));
    }

    assert!(keep.exists());
    assert_eq!(staging.staged_files(&job_id).unwrap().len(), 1);
}

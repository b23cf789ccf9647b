/*!
 * Tests for error types and conversions
 */

use subtrans::errors::{AppError, JobError, ProviderError, SubtitleError, TimestampError};

#[test]
fn test_timestampError_malformed_shouldNameFormatAndInput() {
    let error = TimestampError::MalformedTimestamp {
        input: "1:2:3".to_string(),
        format: "srt".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("srt"));
    assert!(display.contains("'1:2:3'"));
}

#[test]
fn test_subtitleError_fromTimestampError_shouldBeTransparent() {
    let error: SubtitleError = TimestampError::TimestampOutOfRange { value: -5 }.into();
    assert_eq!(error.to_string(), "Timestamp out of range: -5");
    assert!(matches!(error, SubtitleError::Timestamp(_)));
}

#[test]
fn test_subtitleError_parseError_shouldReportBlock() {
    let error = SubtitleError::ParseError {
        block: 4,
        reason: "missing timestamp line".to_string(),
    };
    assert_eq!(error.to_string(), "Parse error in block 4: missing timestamp line");
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_translationFailed_shouldDisplayReason() {
    let error = ProviderError::TranslationFailed("Empty translation".to_string());
    assert_eq!(error.to_string(), "Translation failed: Empty translation");
}

#[test]
fn test_jobError_notReady_shouldNameStatus() {
    let error = JobError::NotReady {
        job_id: "abc".to_string(),
        status: "processing".to_string(),
    };
    assert_eq!(error.to_string(), "Job abc is not ready (status: processing)");
}

#[test]
fn test_jobError_storage_shouldCarryPathAndMessage() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = JobError::storage("/tmp/out", io);
    match error {
        JobError::StorageIO { path, message } => {
            assert_eq!(path, "/tmp/out");
            assert!(message.contains("denied"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_appError_conversions_shouldWrapSources() {
    let from_job: AppError = JobError::JobNotFound("x".to_string()).into();
    assert!(matches!(from_job, AppError::Job(_)));
    assert!(from_job.to_string().contains("Job not found: x"));

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(from_anyhow, AppError::Unknown(_)));
}

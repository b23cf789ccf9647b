/*!
 * Integration tests for the command line controller
 */

use std::path::PathBuf;

use subtrans::app_controller::{Controller, RunOptions};
use subtrans::jobs::JobStatus;
use subtrans::providers::MockProvider;

use crate::common;

fn quiet() -> RunOptions {
    RunOptions {
        quiet: true,
        ..RunOptions::default()
    }
}

#[test]
fn test_collectInputs_withDirectory_shouldFindSubtitleFiles() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("season1");
    std::fs::create_dir_all(&nested).unwrap();
    common::create_test_file(dir.path(), "a.srt", common::SAMPLE_SRT).unwrap();
    common::create_test_file(&nested, "b.vtt", common::SAMPLE_VTT).unwrap();
    common::create_test_file(dir.path(), "notes.txt", "ignored").unwrap();

    let files = Controller::collect_inputs(&[dir.path().to_path_buf()]).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.srt", "b.vtt"]);
}

#[test]
fn test_collectInputs_withEmptyDirectory_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(Controller::collect_inputs(&[dir.path().to_path_buf()]).is_err());
}

#[tokio::test]
async fn test_run_withDefaultService_shouldTranslateEveryFile() {
    let dir = common::create_temp_dir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    common::create_test_file(&input, "a.srt", common::SAMPLE_SRT).unwrap();
    common::create_test_file(&input, "b.sbv", common::SAMPLE_SBV).unwrap();

    let provider = MockProvider::working();
    let controller = Controller::with_registry(
        common::test_config(dir.path()),
        common::mock_registry("google", provider.clone()),
    );
    let job = controller.run(&[input], quiet()).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.service, "google");
    assert_eq!(job.results.len(), 2);
    assert!(job.results.iter().all(|result| result.output_path.as_ref().unwrap().exists()));
    assert_eq!(provider.request_count(), 4);
}

#[tokio::test]
async fn test_run_withUnknownService_shouldFailAndCleanUp() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "a.srt", common::SAMPLE_SRT).unwrap();
    let config = common::test_config(dir.path());
    let upload_root = PathBuf::from(&config.jobs.upload_dir);
    let controller = Controller::with_registry(config, common::mock_registry("google", MockProvider::working()));

    let options = RunOptions {
        service: Some("babelfish".to_string()),
        ..quiet()
    };
    assert!(controller.run(&[input], options).await.is_err());

    let leftovers = std::fs::read_dir(&upload_root)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

// Unit tests for domain models

use super::*;
use crate::domain::errors::{DomainError, InvalidRequest};

#[test]
fn test_trim_request_parse_seconds_and_minutes() {
    let request = TrimRequest::parse("1:30", "125.4").unwrap();
    assert_eq!(request.start, 90.0);
    assert!((request.end - 125.4).abs() < 1e-9);
    assert!(request.is_executable());
}

#[test]
fn test_trim_request_rejects_bad_text() {
    assert_eq!(
        TrimRequest::parse("abc", "10"),
        Err(DomainError::InvalidRequest(InvalidRequest::BadStartTime))
    );
    assert_eq!(
        TrimRequest::parse("0", "1:75"),
        Err(DomainError::InvalidRequest(InvalidRequest::BadEndTime))
    );
    assert!(TrimRequest::parse("-1", "10").is_err());
}

#[test]
fn test_trim_request_empty_range_not_executable() {
    let request = TrimRequest::parse("10", "5").unwrap();
    assert!(!request.is_executable());
}

#[test]
fn test_tool_policy_from_preference() {
    assert_eq!(ToolPolicy::from_preference(true), ToolPolicy::Installed);
    assert_eq!(ToolPolicy::from_preference(false), ToolPolicy::Bundled);
}

#[test]
fn test_media_source_defaults() {
    let source = MediaSource::new(PathBuf::from("/videos/holiday.mov"));
    assert_eq!(
        source.output_path.as_deref(),
        Some(Path::new("/videos/holiday-cut.mov"))
    );
    assert_eq!(source.start_text, "0");
    assert!(source.end_text.is_empty());
    assert!(source.is_input(Path::new("/videos/holiday.mov")));
    assert!(!source.is_input(Path::new("/videos/other.mov")));
}

#[test]
fn test_prediction_summary_with_frame_rate() {
    let prediction = CutPrediction {
        requested_start: 1.0,
        requested_end: 5.0,
        predicted_start: 0.0,
        predicted_end: 4.0,
        frame_rate: Some(25.0),
    };
    assert_eq!(
        prediction.summary(),
        "Requested 1s -> 5s | Predicted 0s -> 4s (frames ~0-100 @ 25.000fps)"
    );
}

#[test]
fn test_prediction_summary_without_frame_rate() {
    let prediction = CutPrediction {
        requested_start: 1.25,
        requested_end: 5.0,
        predicted_start: 1.25,
        predicted_end: 5.0,
        frame_rate: None,
    };
    assert_eq!(
        prediction.to_string(),
        "Requested 1.25s -> 5s | Predicted 1.25s -> 5s"
    );
}

#[test]
fn test_cut_job_from_plan() {
    let plan = CutPlan {
        input: PathBuf::from("in.mp4"),
        output: PathBuf::from("out.mp4"),
        start: 2.0,
        end: 7.5,
    };
    let job = CutJob::from_plan(&plan, true);
    assert_eq!(job.duration, 5.5);
    assert!(job.overwrite);
}

#[test]
fn test_process_result_trimmed_output() {
    let result = ProcessResult {
        exit_code: 0,
        output: "  12.5\n".to_string(),
    };
    assert!(result.success());
    assert_eq!(result.trimmed_output(), "12.5");
}

// Unit tests for business rules

use std::path::{Path, PathBuf};

use super::*;

fn brute_force_nearest(target: f64, times: &[f64]) -> Option<f64> {
    times
        .iter()
        .copied()
        .filter(|time| *time <= target)
        .fold(None, |best: Option<f64>, time| Some(best.map_or(time, |b| b.max(time))))
}

#[test]
fn test_nearest_time_matches_maximum_at_or_before() {
    let lists: [&[f64]; 5] = [
        &[],
        &[0.0],
        &[0.0, 2.0, 4.0, 6.0],
        &[1.5, 1.5, 3.25, 10.0],
        &[0.033, 0.066, 0.1, 0.133, 5.0],
    ];
    let targets = [-1.0, 0.0, 0.05, 1.5, 2.0, 3.9, 6.0, 100.0];

    for times in lists {
        for target in targets {
            assert_eq!(
                nearest_time_at_or_before(target, times),
                brute_force_nearest(target, times),
                "target {} in {:?}",
                target,
                times
            );
        }
    }
}

#[test]
fn test_nearest_time_none_when_all_after_target() {
    assert_eq!(nearest_time_at_or_before(0.5, &[1.0, 2.0]), None);
    assert_eq!(nearest_time_at_or_before(0.5, &[]), None);
}

#[test]
fn test_parse_packet_times_sorts_and_skips_junk() {
    let output = "4.000000\n0.000000,K_\n\nN/A\n2.000000,\n  6.0  \nwarning: something\n";
    assert_eq!(parse_packet_times(output), vec![0.0, 2.0, 4.0, 6.0]);
}

#[test]
fn test_parse_frame_rate_fraction() {
    let rate = parse_frame_rate("30000/1001\n").unwrap();
    assert!((rate - 29.97).abs() < 0.001);
}

#[test]
fn test_parse_frame_rate_unknown() {
    assert_eq!(parse_frame_rate("0/0"), None);
    assert_eq!(parse_frame_rate("25/0"), None);
    assert_eq!(parse_frame_rate(""), None);
    assert_eq!(parse_frame_rate("n/a"), None);
}

#[test]
fn test_parse_frame_rate_plain_number() {
    assert_eq!(parse_frame_rate("25"), Some(25.0));
    assert_eq!(parse_frame_rate(" 23.976 "), Some(23.976));
}

#[test]
fn test_predict_boundaries_snaps_to_packets() {
    let prediction = predict_boundaries(1.0, 5.0, &[0.0, 2.0, 4.0, 6.0], Some(30.0));
    assert_eq!(prediction.requested_start, 1.0);
    assert_eq!(prediction.requested_end, 5.0);
    assert_eq!(prediction.predicted_start, 0.0);
    assert_eq!(prediction.predicted_end, 4.0);
    assert_eq!(prediction.frame_rate, Some(30.0));
}

#[test]
fn test_predict_boundaries_without_packets_uses_request() {
    let prediction = predict_boundaries(1.5, 3.0, &[], None);
    assert_eq!(prediction.predicted_start, 1.5);
    assert_eq!(prediction.predicted_end, 3.0);
}

#[test]
fn test_predict_boundaries_start_before_first_packet() {
    let prediction = predict_boundaries(0.5, 1.0, &[2.0, 4.0], None);
    assert_eq!(prediction.predicted_start, 0.5);
    assert_eq!(prediction.predicted_end, 1.0);
}

#[test]
fn test_predicted_end_never_before_start() {
    let times = [0.0, 0.5, 2.0, 2.1, 7.0, 9.5];
    for (start, end) in [(0.0, 0.1), (2.05, 2.06), (3.0, 1.0), (9.6, 20.0), (0.4, 0.45)] {
        let prediction = predict_boundaries(start, end, &times, None);
        assert!(
            prediction.predicted_end >= prediction.predicted_start,
            "{:?}",
            prediction
        );
    }
}

#[test]
fn test_parse_duration_output() {
    let ok = ProcessResult {
        exit_code: 0,
        output: "12.500000\n".to_string(),
    };
    assert_eq!(parse_duration_output(&ok), Ok(12.5));

    for text in ["", "N/A", "0", "-4"] {
        let result = ProcessResult {
            exit_code: 0,
            output: text.to_string(),
        };
        assert_eq!(parse_duration_output(&result), Err(DomainError::DurationUnavailable));
    }

    let failed = ProcessResult {
        exit_code: 1,
        output: "  no such file \n".to_string(),
    };
    assert_eq!(
        parse_duration_output(&failed),
        Err(DomainError::CommandFailed {
            exit_code: 1,
            output: "no such file".to_string()
        })
    );
}

fn plan(output: &str, start: &str, end: &str, duration: Option<f64>) -> Result<CutPlan, InvalidRequest> {
    plan_cut(
        Some(Path::new("/media/in.mp4")),
        Some(Path::new(output)),
        start,
        end,
        duration,
    )
}

#[test]
fn test_plan_cut_valid() {
    let plan = plan("/media/out.mp4", "1:00", "90", Some(120.0)).unwrap();
    assert_eq!(plan.input, PathBuf::from("/media/in.mp4"));
    assert_eq!(plan.output, PathBuf::from("/media/out.mp4"));
    assert_eq!(plan.start, 60.0);
    assert_eq!(plan.end, 90.0);
}

#[test]
fn test_plan_cut_missing_paths() {
    assert_eq!(
        plan_cut(None, Some(Path::new("/media/out.mp4")), "0", "1", None),
        Err(InvalidRequest::MissingInput)
    );
    assert_eq!(
        plan_cut(Some(Path::new("/media/in.mp4")), None, "0", "1", None),
        Err(InvalidRequest::MissingOutput)
    );
}

#[test]
fn test_plan_cut_rejects_same_output() {
    assert_eq!(
        plan("/media/./in.mp4", "0", "5", None),
        Err(InvalidRequest::OutputMatchesInput)
    );
}

#[test]
fn test_plan_cut_rejects_bad_times() {
    assert_eq!(plan("/media/out.mp4", "x", "5", None), Err(InvalidRequest::BadStartTime));
    assert_eq!(plan("/media/out.mp4", "0", "", None), Err(InvalidRequest::BadEndTime));
    assert_eq!(plan("/media/out.mp4", "5", "5", None), Err(InvalidRequest::EmptyRange));
    assert_eq!(plan("/media/out.mp4", "6", "5", None), Err(InvalidRequest::EmptyRange));
}

#[test]
fn test_plan_cut_clamps_end_to_duration() {
    assert_eq!(
        plan("/media/out.mp4", "0", "20", Some(12.5)),
        Err(InvalidRequest::EndClamped { end: 12.5 })
    );
    assert!(plan("/media/out.mp4", "0", "12.5", Some(12.5)).is_ok());
}

#[test]
fn test_plan_cut_accepts_rounded_clamped_end() {
    let duration = 12.347;
    let shown = crate::utils::time::format_time_for_input(duration);
    assert_eq!(shown, "12.35");

    let plan = plan("/media/out.mp4", "0", &shown, Some(duration)).unwrap();
    assert_eq!(plan.end, duration);
}

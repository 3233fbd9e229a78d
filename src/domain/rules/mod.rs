// Domain rules - Parsing of tool output, cut-point prediction and cut validation

use std::path::Path;

use crate::domain::errors::{DomainError, DomainResult, InvalidRequest};
use crate::domain::model::{CutPlan, CutPrediction, ProcessResult};
use crate::utils::path::same_file_path;
use crate::utils::time::parse_time;

/// How far an end time may exceed the known duration before it is clamped.
/// One centisecond, the resolution of the time text fields.
pub const END_CLAMP_TOLERANCE: f64 = 0.01;

/// Largest timestamp `<= target` in an ascending list.
///
/// Stops at the first timestamp past the target, so the list must be sorted.
pub fn nearest_time_at_or_before(target: f64, sorted_times: &[f64]) -> Option<f64> {
    let mut best = None;
    for &time in sorted_times {
        if time <= target {
            best = Some(time);
        } else {
            break;
        }
    }
    best
}

/// Parse CSV packet rows into ascending timestamps. The first field of each row
/// is the timestamp; rows that don't start with a number are skipped.
pub fn parse_packet_times(output: &str) -> Vec<f64> {
    let mut times: Vec<f64> = output.lines().filter_map(parse_first_csv_number).collect();
    times.sort_by(|a, b| a.total_cmp(b));
    times
}

fn parse_first_csv_number(line: &str) -> Option<f64> {
    let raw = line.trim();
    if raw.is_empty() {
        return None;
    }
    let token = raw.split(',').next().unwrap_or(raw).trim();
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse an average frame rate given as `30`, `29.97` or `30000/1001`.
///
/// Empty text, `0/0` and a zero denominator all mean "unknown".
pub fn parse_frame_rate(output: &str) -> Option<f64> {
    let value = output.trim();
    if value.is_empty() || value == "0/0" {
        return None;
    }

    if let Some((numerator, denominator)) = value.split_once('/') {
        let numerator = numerator.trim().parse::<f64>().ok()?;
        let denominator = denominator.trim().parse::<f64>().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator).filter(|rate| rate.is_finite());
    }

    value.parse::<f64>().ok().filter(|rate| rate.is_finite())
}

/// Map a requested range onto the nearest cuttable packet boundaries.
///
/// The start snaps back to the packet at or before it; the end keeps the
/// requested length from the snapped start and snaps back the same way, but
/// never before the predicted start.
pub fn predict_boundaries(
    requested_start: f64,
    requested_end: f64,
    sorted_times: &[f64],
    frame_rate: Option<f64>,
) -> CutPrediction {
    let requested_duration = (requested_end - requested_start).max(0.0);

    let predicted_start =
        nearest_time_at_or_before(requested_start, sorted_times).unwrap_or(requested_start);
    let nominal_end = predicted_start + requested_duration;
    let end_candidate = nearest_time_at_or_before(nominal_end, sorted_times).unwrap_or(nominal_end);
    let predicted_end = predicted_start.max(end_candidate);

    CutPrediction {
        requested_start,
        requested_end,
        predicted_start,
        predicted_end,
        frame_rate,
    }
}

/// Interpret the duration probe output
pub fn parse_duration_output(result: &ProcessResult) -> DomainResult<f64> {
    if !result.success() {
        return Err(DomainError::CommandFailed {
            exit_code: result.exit_code,
            output: result.trimmed_output().to_string(),
        });
    }

    result
        .trimmed_output()
        .parse::<f64>()
        .ok()
        .filter(|duration| duration.is_finite() && *duration > 0.0)
        .ok_or(DomainError::DurationUnavailable)
}

/// Validate a cut request against the current selection.
///
/// An end past the known duration is reported as [`InvalidRequest::EndClamped`]
/// carrying the clamped value; the caller shows it and waits for a resubmit.
/// An end within [`END_CLAMP_TOLERANCE`] of the duration is accepted and
/// capped at the duration.
pub fn plan_cut(
    input: Option<&Path>,
    output: Option<&Path>,
    start_text: &str,
    end_text: &str,
    known_duration: Option<f64>,
) -> Result<CutPlan, InvalidRequest> {
    let input = input.ok_or(InvalidRequest::MissingInput)?;
    let output = output.ok_or(InvalidRequest::MissingOutput)?;

    if same_file_path(input, output) {
        return Err(InvalidRequest::OutputMatchesInput);
    }

    let start = parse_time(start_text).ok_or(InvalidRequest::BadStartTime)?;
    let mut end = parse_time(end_text).ok_or(InvalidRequest::BadEndTime)?;

    if let Some(duration) = known_duration {
        if end - duration >= END_CLAMP_TOLERANCE {
            return Err(InvalidRequest::EndClamped { end: duration });
        }
        end = end.min(duration);
    }

    if end - start <= 0.0 {
        return Err(InvalidRequest::EmptyRange);
    }

    Ok(CutPlan {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        start,
        end,
    })
}

#[cfg(test)]
mod tests;

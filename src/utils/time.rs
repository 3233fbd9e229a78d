//! Time text parsing and formatting for the trim range fields
//!
//! Accepted input is either plain seconds (`12.5`) or `minutes:seconds`
//! (`2:05.4`) where the seconds component lies in `[0, 60)`.

/// Parse a time field into seconds. Returns `None` for empty, negative,
/// non-finite or malformed text.
pub fn parse_time(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then_some(seconds);
    }

    let (minutes, seconds) = trimmed.split_once(':')?;
    if seconds.contains(':') {
        return None;
    }

    let minutes = parse_non_negative(minutes)?;
    let seconds = parse_non_negative(seconds)?;
    if seconds >= 60.0 {
        return None;
    }

    Some(minutes * 60.0 + seconds)
}

fn parse_non_negative(part: &str) -> Option<f64> {
    part.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Format seconds for an input field: `12`, `12.50`, `2:05` or `2:05.40`.
///
/// Rounds to centiseconds first so the seconds component never reads `60`.
pub fn format_time_for_input(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    if centis < 6000 {
        return format_seconds(centis as f64 / 100.0);
    }

    let minutes = centis / 6000;
    let remainder = centis % 6000;
    if remainder % 100 == 0 {
        format!("{}:{:02}", minutes, remainder / 100)
    } else {
        format!("{}:{:02}.{:02}", minutes, remainder / 100, remainder % 100)
    }
}

/// Whole seconds when within 5ms of an integer, otherwise two decimals
pub fn format_seconds(value: f64) -> String {
    let clamped = value.max(0.0);
    let rounded = clamped.round();
    if (rounded - clamped).abs() < 0.005 {
        format!("{}", rounded as u64)
    } else {
        format!("{:.2}", clamped)
    }
}

/// Two-decimal rendering used on ffmpeg command lines
pub fn format_command_seconds(value: f64) -> String {
    format!("{:.2}", value)
}

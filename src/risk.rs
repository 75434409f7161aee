use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::models::{RiskLevel, SurveyResponse};

/// Number of most recent surveys that count toward compliance.
pub const COMPLIANCE_WINDOW: usize = 3;

static WEIGHT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*lbs?").expect("weight pattern is valid")
});

static HEIGHT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\d+)'(\d+)""#).expect("height pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Pounds from a string like `"232 lbs"`. The number must be followed by a
/// `lb`/`lbs` unit; anything else is 0.
pub fn parse_weight(raw: &str) -> f64 {
    WEIGHT_PATTERN
        .captures(raw)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Total inches from a string like `5'9"`, or 0 when the pattern does not match.
pub fn parse_height(raw: &str) -> u32 {
    HEIGHT_PATTERN
        .captures(raw)
        .and_then(|caps| {
            let feet = caps[1].parse::<u32>().ok()?;
            let inches = caps[2].parse::<u32>().ok()?;
            feet.checked_mul(12)?.checked_add(inches)
        })
        .unwrap_or(0)
}

pub fn calculate_bmi(weight_lbs: f64, height_inches: u32) -> f64 {
    if height_inches == 0 {
        return 0.0;
    }
    let height = f64::from(height_inches);
    weight_lbs / (height * height) * 703.0
}

/// Share of the last [`COMPLIANCE_WINDOW`] surveys where the member answered
/// exactly `"Yes"`, as an unrounded percentage.
///
/// `surveys` must already be in chronological order.
pub fn compliance_rate(surveys: &[SurveyResponse]) -> f64 {
    let window = &surveys[surveys.len().saturating_sub(COMPLIANCE_WINDOW)..];
    if window.is_empty() {
        return 0.0;
    }
    let adherent = window
        .iter()
        .filter(|s| s.taking_medication == "Yes")
        .count();
    adherent as f64 / window.len() as f64 * 100.0
}

pub fn average_activity(surveys: &[SurveyResponse]) -> f64 {
    if surveys.is_empty() {
        return 0.0;
    }
    let total: i64 = surveys.iter().map(|s| i64::from(s.activity_days)).sum();
    total as f64 / surveys.len() as f64
}

pub fn compliance_points(compliance: f64) -> u32 {
    if compliance < 60.0 {
        4
    } else if compliance < 80.0 {
        2
    } else {
        0
    }
}

/// Negative `weight_change` is a gain.
pub fn weight_points(weight_change: f64) -> u32 {
    if weight_change < -2.0 {
        3
    } else if weight_change < 5.0 {
        1
    } else {
        0
    }
}

pub fn side_effect_points(has_side_effects: &str) -> u32 {
    if has_side_effects == "Yes" {
        2
    } else {
        0
    }
}

pub fn activity_points(average_activity: f64) -> u32 {
    if average_activity < 2.0 {
        1
    } else {
        0
    }
}

pub fn risk_score(
    compliance: f64,
    weight_change: f64,
    has_side_effects: &str,
    average_activity: f64,
) -> u32 {
    compliance_points(compliance)
        + weight_points(weight_change)
        + side_effect_points(has_side_effects)
        + activity_points(average_activity)
}

pub fn risk_level_for_score(score: u32) -> RiskLevel {
    match score {
        0..=2 => RiskLevel::Low,
        3..=5 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

pub fn classify_risk(
    compliance: f64,
    weight_change: f64,
    has_side_effects: &str,
    average_activity: f64,
) -> RiskLevel {
    risk_level_for_score(risk_score(
        compliance,
        weight_change,
        has_side_effects,
        average_activity,
    ))
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Lowercased name with whitespace runs collapsed to `-`.
pub fn member_id(name: &str) -> String {
    WHITESPACE.replace_all(&name.to_lowercase(), "-").into_owned()
}

pub fn parse_submitted_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp);
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// `Jan 15, 2024` style label; unparseable input is shown as-is.
pub fn format_display_date(raw: &str) -> String {
    match parse_submitted_at(raw) {
        Some(timestamp) => timestamp.format("%b %-d, %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

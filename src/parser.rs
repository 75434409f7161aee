//! Fixed-position CSV reader for program survey exports.
//!
//! Columns are assigned by index, never by header name:
//! `Name, TakingMedication, HasSideEffects, Symptoms, PrescriptionDuration,
//! ActivityDays, FirstTime, CurrentWeight, Height, SubmittedAt, Token`.
//! Parsing is best-effort: bad rows degrade to defaults and never fail the
//! batch.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::models::SurveyResponse;

pub const COLUMN_COUNT: usize = 11;

const COLUMNS: [&str; COLUMN_COUNT] = [
    "name",
    "taking_medication",
    "has_side_effects",
    "symptoms",
    "prescription_duration",
    "activity_days",
    "first_time",
    "current_weight",
    "height",
    "submitted_at",
    "token",
];

pub fn parse_csv(text: &str) -> Vec<SurveyResponse> {
    parse_bytes(text.as_bytes())
}

pub fn parse_reader<R: Read>(mut input: R) -> Vec<SurveyResponse> {
    let mut bytes = Vec::new();
    if let Err(err) = input.read_to_end(&mut bytes) {
        warn!(error = %err, read = bytes.len(), "survey input ended early");
    }
    parse_bytes(&bytes)
}

/// Each line is its own record, so an unbalanced quote cannot swallow the
/// rows after it.
fn parse_bytes(bytes: &[u8]) -> Vec<SurveyResponse> {
    let mut surveys = Vec::new();

    for (index, raw_line) in bytes.split(|b| *b == b'\n').enumerate().skip(1) {
        let line = index as u64 + 1;
        let raw_line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
        if raw_line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match read_line_record(raw_line) {
            Ok(record) => surveys.push(survey_from_record(&record, line)),
            Err(err) => warn!(line, error = %err, "skipping unreadable survey row"),
        }
    }

    debug!(rows = surveys.len(), "parsed survey csv");
    surveys
}

fn read_line_record(raw_line: &[u8]) -> csv::Result<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw_line);
    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

fn survey_from_record(record: &StringRecord, line: u64) -> SurveyResponse {
    if record.len() < COLUMN_COUNT {
        debug!(
            line,
            fields = record.len(),
            "short survey row, missing columns default to empty"
        );
    }

    let text = |index: usize| record.get(index).map(str::trim).unwrap_or("").to_string();

    let activity_days = match record.get(5).map(str::trim) {
        None | Some("") => {
            debug!(line, column = COLUMNS[5], "missing value, defaulting to 0");
            0
        }
        Some(raw) => parse_leading_int(raw).unwrap_or_else(|| {
            debug!(line, column = COLUMNS[5], value = raw, "invalid value, defaulting to 0");
            0
        }),
    };

    SurveyResponse {
        name: text(0),
        taking_medication: text(1),
        has_side_effects: text(2),
        symptoms: text(3),
        prescription_duration: text(4),
        activity_days,
        first_time: text(6),
        current_weight: text(7),
        height: text(8),
        submitted_at: text(9),
        token: text(10),
    }
}

/// Reads an optional sign followed by leading digits, ignoring any trailing
/// text: `"3 days"` is 3, `"2.5"` is 2, `"x"` is `None`.
pub fn parse_leading_int(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i32>().ok().map(|value| sign * value)
}

//! CSV output: profile exports and per-member slices of the raw survey file.

use std::io::Write;

use anyhow::Result;
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use crate::models::MemberProfile;

#[derive(Serialize)]
struct ProfileRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Risk Level")]
    risk_level: &'a str,
    #[serde(rename = "Program Compliance (%)")]
    program_compliance: u32,
    #[serde(rename = "Initial Weight (lbs)")]
    initial_weight: f64,
    #[serde(rename = "Current Weight (lbs)")]
    current_weight: f64,
    #[serde(rename = "Weight Change (lbs)")]
    weight_change: f64,
    #[serde(rename = "BMI")]
    bmi: f64,
    #[serde(rename = "Average Activity (days/week)")]
    average_activity: f64,
    #[serde(rename = "Total Surveys")]
    total_surveys: usize,
    #[serde(rename = "Last Survey")]
    last_survey_date: &'a str,
    #[serde(rename = "Last Medication Compliance")]
    last_medication_compliance: &'a str,
    #[serde(rename = "Last Side Effects")]
    last_side_effects: &'a str,
    #[serde(rename = "Prescription Duration")]
    prescription_duration: &'a str,
}

impl<'a> From<&'a MemberProfile> for ProfileRow<'a> {
    fn from(profile: &'a MemberProfile) -> Self {
        Self {
            name: &profile.name,
            risk_level: profile.risk_level.as_str(),
            program_compliance: profile.program_compliance,
            initial_weight: profile.initial_weight,
            current_weight: profile.current_weight,
            weight_change: profile.weight_change,
            bmi: profile.bmi,
            average_activity: profile.average_activity,
            total_surveys: profile.total_surveys,
            last_survey_date: &profile.last_survey_date,
            last_medication_compliance: &profile.last_medication_compliance,
            last_side_effects: &profile.last_side_effects,
            prescription_duration: &profile.prescription_duration,
        }
    }
}

/// Writes one fully quoted row per profile, preceded by a header row.
pub fn write_profiles_csv<W: Write>(profiles: &[MemberProfile], out: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    for profile in profiles {
        writer.serialize(ProfileRow::from(profile))?;
    }
    writer.flush()?;

    debug!(rows = profiles.len(), "wrote profile csv");
    Ok(())
}

pub fn profiles_to_csv(profiles: &[MemberProfile]) -> Result<String> {
    let mut buffer = Vec::new();
    write_profiles_csv(profiles, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Header line plus the raw lines whose first field is exactly `name`.
///
/// Lines are kept verbatim so the slice reads like the original export.
pub fn member_csv_slice(csv_text: &str, name: &str) -> String {
    let mut lines = csv_text.lines();
    let Some(header) = lines.next() else {
        return String::new();
    };

    let mut slice = String::from(header);
    let mut matched = 0usize;
    for line in lines {
        if first_field(line) == name {
            slice.push('\n');
            slice.push_str(line);
            matched += 1;
        }
    }

    debug!(member = name, rows = matched, "sliced member csv");
    slice
}

fn first_field(line: &str) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    reader
        .records()
        .next()
        .and_then(|record| record.ok())
        .and_then(|record| record.get(0).map(|field| field.trim().to_string()))
        .unwrap_or_default()
}

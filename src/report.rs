use std::fmt::Write;

use crate::models::MemberProfile;
use crate::roster::{self, SortKey};

pub fn build_report(program: Option<&str>, profiles: &[MemberProfile]) -> String {
    let summary = roster::program_summary(profiles);
    let risk_mix = roster::summarize_by_risk(profiles);

    let mut output = String::new();
    let program_label = program.unwrap_or("all members");

    let _ = writeln!(output, "# Member Risk Report");
    let _ = writeln!(output, "Generated for {}", program_label);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Program Overview");
    let _ = writeln!(output, "- Total members: {}", summary.total_members);
    let _ = writeln!(output, "- High risk members: {}", summary.high_risk);
    let _ = writeln!(output, "- Average compliance: {}%", summary.avg_compliance);
    let _ = writeln!(
        output,
        "- Average weight change: {:+.1} lbs",
        summary.avg_weight_change
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");

    if risk_mix.is_empty() {
        let _ = writeln!(output, "No members in this program.");
    } else {
        for entry in risk_mix.iter() {
            let _ = writeln!(
                output,
                "- {}: {} members (avg compliance {:.0}%)",
                entry.risk_level, entry.count, entry.avg_compliance
            );
        }
    }

    let mut ranked = profiles.to_vec();
    roster::sort_members(&mut ranked, SortKey::Compliance);
    roster::sort_members(&mut ranked, SortKey::Risk);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Members");

    if ranked.is_empty() {
        let _ = writeln!(output, "No members in this program.");
    } else {
        for profile in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({} risk) compliance {}%, weight change {:+.1} lbs, activity {:.1} days/week, BMI {:.1}",
                profile.name,
                profile.risk_level,
                profile.program_compliance,
                profile.weight_change,
                profile.average_activity,
                profile.bmi
            );
        }
    }

    let mut recent = profiles.to_vec();
    recent.sort_by(|a, b| b.last_submitted_at.cmp(&a.last_submitted_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Symptom Notes");

    let notes: Vec<_> = recent
        .iter()
        .filter_map(|profile| {
            let latest = profile.survey_responses.last()?;
            (!latest.symptoms.is_empty()).then_some((profile, latest))
        })
        .take(5)
        .collect();

    if notes.is_empty() {
        let _ = writeln!(output, "No symptom notes recorded.");
    } else {
        for (profile, latest) in notes {
            let _ = writeln!(
                output,
                "- {} on {} (side effects: {}): {}",
                profile.name, profile.last_survey_date, latest.has_side_effects, latest.symptoms
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MemberAggregator;
    use crate::models::SurveyResponse;

    fn survey(name: &str, taking: &str, side: &str, weight: &str, date: &str, symptoms: &str) -> SurveyResponse {
        SurveyResponse {
            name: name.to_string(),
            taking_medication: taking.to_string(),
            has_side_effects: side.to_string(),
            symptoms: symptoms.to_string(),
            activity_days: 1,
            current_weight: weight.to_string(),
            submitted_at: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn report_lists_high_risk_first() {
        let surveys = vec![
            survey("Ethan Kim", "No", "Yes", "250 lbs", "2024-01-15", "Dizziness"),
            survey("Ethan Kim", "No", "Yes", "255 lbs", "2024-02-14", "Headaches after injections"),
            survey("Sophia Patel", "Yes", "No", "205 lbs", "2024-01-15", "No issues"),
            survey("Sophia Patel", "Yes", "No", "195 lbs", "2024-03-15", ""),
        ];
        let profiles = MemberAggregator::deterministic().aggregate(&surveys);
        let report = build_report(Some("GLP-1 Weight Management Program"), &profiles);

        assert!(report.contains("Generated for GLP-1 Weight Management Program"));
        assert!(report.contains("- Total members: 2"));
        assert!(report.contains("- High risk members: 1"));

        let high = report.find("- Ethan Kim (High risk)").unwrap();
        let low = report.find("- Sophia Patel (Low risk)").unwrap();
        assert!(high < low);

        assert!(report.contains("Headaches after injections"));
        assert!(!report.contains("- Sophia Patel on"));
    }

    #[test]
    fn empty_report_has_placeholders() {
        let report = build_report(None, &[]);
        assert!(report.contains("Generated for all members"));
        assert!(report.contains("No members in this program."));
        assert!(report.contains("No symptom notes recorded."));
    }
}

use std::collections::HashMap;

use tracing::debug;

use crate::enrichment::{Enricher, NoEnrichment};
use crate::models::{MemberProfile, SurveyResponse, WeightPoint};
use crate::risk;

/// Builds member profiles from survey responses.
///
/// Construct one per aggregation run; it holds nothing between calls apart
/// from the enrichment strategy.
pub struct MemberAggregator<E> {
    enricher: E,
}

impl MemberAggregator<NoEnrichment> {
    pub fn deterministic() -> Self {
        Self::new(NoEnrichment)
    }
}

impl<E: Enricher> MemberAggregator<E> {
    pub fn new(enricher: E) -> Self {
        Self { enricher }
    }

    /// One profile per distinct `name`, in order of first appearance.
    pub fn aggregate(&mut self, surveys: &[SurveyResponse]) -> Vec<MemberProfile> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&SurveyResponse>> = HashMap::new();

        for survey in surveys {
            groups
                .entry(survey.name.as_str())
                .or_insert_with(|| {
                    order.push(survey.name.as_str());
                    Vec::new()
                })
                .push(survey);
        }

        debug!(members = order.len(), surveys = surveys.len(), "grouped surveys");

        order
            .into_iter()
            .filter_map(|name| {
                let group = groups.remove(name)?;
                Some(self.build_profile(name, group))
            })
            .collect()
    }

    fn build_profile(&mut self, name: &str, group: Vec<&SurveyResponse>) -> MemberProfile {
        let mut sorted: Vec<SurveyResponse> = group.into_iter().cloned().collect();
        // Stable: unparseable timestamps (None) lead, in input order.
        sorted.sort_by_key(|s| risk::parse_submitted_at(&s.submitted_at));

        // Groups are built from existing surveys, so `sorted` is never empty.
        let first = &sorted[0];
        let last = &sorted[sorted.len() - 1];

        let initial_weight = risk::parse_weight(&first.current_weight);
        let current_weight = risk::parse_weight(&last.current_weight);
        let weight_change = initial_weight - current_weight;

        let compliance = risk::compliance_rate(&sorted);
        let average_activity = risk::average_activity(&sorted);
        let bmi = risk::calculate_bmi(current_weight, risk::parse_height(&last.height));
        let risk_level = risk::classify_risk(
            compliance,
            weight_change,
            &last.has_side_effects,
            average_activity,
        );

        let weight_history = sorted
            .iter()
            .map(|s| WeightPoint {
                date: risk::format_display_date(&s.submitted_at),
                weight: risk::parse_weight(&s.current_weight),
            })
            .collect();

        let details = self.enricher.enrich(name, &sorted);

        MemberProfile {
            id: risk::member_id(name),
            name: name.to_string(),
            height: last.height.clone(),
            total_surveys: sorted.len(),
            last_survey_date: risk::format_display_date(&last.submitted_at),
            last_submitted_at: risk::parse_submitted_at(&last.submitted_at),
            program_compliance: compliance.round() as u32,
            current_weight,
            initial_weight,
            weight_change: risk::round_to_tenth(weight_change),
            bmi: risk::round_to_tenth(bmi),
            risk_level,
            last_medication_compliance: last.taking_medication.clone(),
            last_side_effects: last.has_side_effects.clone(),
            average_activity: risk::round_to_tenth(average_activity),
            prescription_duration: last.prescription_duration.clone(),
            weight_history,
            details,
            survey_responses: sorted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    fn survey(
        name: &str,
        taking: &str,
        side_effects: &str,
        activity: i32,
        weight: &str,
        date: &str,
    ) -> SurveyResponse {
        SurveyResponse {
            name: name.to_string(),
            taking_medication: taking.to_string(),
            has_side_effects: side_effects.to_string(),
            activity_days: activity,
            current_weight: weight.to_string(),
            height: "5'9\"".to_string(),
            submitted_at: date.to_string(),
            prescription_duration: "3 months".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn groups_by_exact_name_in_first_seen_order() {
        let surveys = vec![
            survey("Maria Lopez", "Yes", "No", 3, "194 lbs", "2024-01-15"),
            survey("Alex Johnson", "Yes", "No", 3, "232 lbs", "2024-01-15"),
            survey("Maria Lopez", "Yes", "No", 3, "190 lbs", "2024-02-14"),
            survey("maria lopez", "Yes", "No", 3, "190 lbs", "2024-02-14"),
        ];
        let profiles = MemberAggregator::deterministic().aggregate(&surveys);
        let names: Vec<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Maria Lopez", "Alex Johnson", "maria lopez"]);
        assert_eq!(profiles[0].total_surveys, 2);
    }

    #[test]
    fn weights_follow_chronology_not_input_order() {
        let surveys = vec![
            survey("Alex Johnson", "Yes", "No", 3, "190 lbs", "2024-03-15"),
            survey("Alex Johnson", "Yes", "No", 3, "200 lbs", "2024-01-15"),
            survey("Alex Johnson", "Yes", "No", 3, "195 lbs", "2024-02-14"),
        ];
        let profile = &MemberAggregator::deterministic().aggregate(&surveys)[0];
        assert_eq!(profile.initial_weight, 200.0);
        assert_eq!(profile.current_weight, 190.0);
        assert_eq!(profile.weight_change, 10.0);
        assert_eq!(profile.last_survey_date, "Mar 15, 2024");
        let history: Vec<_> = profile.weight_history.iter().map(|p| p.weight).collect();
        assert_eq!(history, vec![200.0, 195.0, 190.0]);
    }

    #[test]
    fn weight_gain_is_negative_change() {
        let surveys = vec![
            survey("Ethan Kim", "Yes", "No", 3, "250 lbs", "2024-01-15"),
            survey("Ethan Kim", "Yes", "No", 3, "253.46 lbs", "2024-02-14"),
        ];
        let profile = &MemberAggregator::deterministic().aggregate(&surveys)[0];
        assert_eq!(profile.weight_change, -3.5);
    }

    #[test]
    fn compliance_window_is_last_three() {
        let dates = ["2024-01-15", "2024-02-14", "2024-03-15", "2024-04-14", "2024-05-14"];
        let answers = ["Yes", "No", "Yes", "Yes", "No"];
        let surveys: Vec<_> = dates
            .iter()
            .zip(answers)
            .map(|(date, answer)| survey("Nora Williams", answer, "No", 3, "200 lbs", date))
            .collect();
        let profile = &MemberAggregator::deterministic().aggregate(&surveys)[0];
        assert_eq!(profile.program_compliance, 67);
        assert_eq!(profile.last_medication_compliance, "No");
    }

    #[test]
    fn single_survey_member_degrades_gracefully() {
        let surveys = vec![survey("James Carter", "Yes", "No", 4, "257 lbs", "2024-01-15")];
        let profile = &MemberAggregator::deterministic().aggregate(&surveys)[0];
        assert_eq!(profile.average_activity, 4.0);
        assert_eq!(profile.program_compliance, 100);
        assert_eq!(profile.weight_change, 0.0);
        // 0 change earns the minimal-loss point, nothing else scores.
        assert_eq!(profile.risk_level, RiskLevel::Low);
    }

    #[test]
    fn risk_uses_unrounded_inputs_and_latest_side_effects() {
        let surveys = vec![
            survey("Ethan Kim", "Yes", "No", 0, "266 lbs", "2024-01-15"),
            survey("Ethan Kim", "Yes", "No", 5, "262 lbs", "2024-02-14"),
            survey("Ethan Kim", "Yes", "No", 5, "254 lbs", "2024-03-15"),
            survey("Ethan Kim", "No, missed a few doses.", "Yes", 2, "256 lbs", "2024-04-14"),
            survey("Ethan Kim", "No, missed a few doses.", "Yes", 2, "258 lbs", "2024-05-14"),
        ];
        let profile = &MemberAggregator::deterministic().aggregate(&surveys)[0];
        assert_eq!(profile.program_compliance, 33);
        assert_eq!(profile.weight_change, 8.0);
        assert_eq!(profile.average_activity, 2.8);
        assert_eq!(profile.risk_level, RiskLevel::High);
    }

    #[test]
    fn unparseable_weight_and_height_become_zero() {
        let mut only = survey("Lisa Wang", "Yes", "No", 3, "heavy", "2024-01-15");
        only.height = "tall".to_string();
        let profile = &MemberAggregator::deterministic().aggregate(&[only])[0];
        assert_eq!(profile.current_weight, 0.0);
        assert_eq!(profile.bmi, 0.0);
    }

    #[test]
    fn bmi_and_id_derive_from_latest_survey() {
        let surveys = vec![
            survey("Alex Johnson", "Yes", "No", 3, "232 lbs", "2024-01-15"),
            survey("Alex Johnson", "Yes", "No", 3, "225 lbs", "2024-05-14"),
        ];
        let profile = &MemberAggregator::deterministic().aggregate(&surveys)[0];
        assert_eq!(profile.id, "alex-johnson");
        assert_eq!(profile.bmi, 33.2);
        assert!(profile.details.is_none());
    }

    #[test]
    fn empty_input_yields_no_profiles() {
        assert!(MemberAggregator::deterministic().aggregate(&[]).is_empty());
    }
}

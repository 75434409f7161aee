//! Pluggable sources for the illustrative detail fields on a profile.
//!
//! Nothing produced here feeds weight, compliance or risk; swapping the
//! enricher never changes a member's classification.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{FillRecord, MemberDetails, StaffInteraction, SurveyResponse};
use crate::risk::format_display_date;

const GLP1_MEDICATIONS: [&str; 4] = ["Semaglutide", "Liraglutide", "Dulaglutide", "Exenatide"];
const GENDERS: [&str; 2] = ["Male", "Female"];
const GOALS: [&str; 4] = [
    "Lose 20 lbs",
    "Improve energy",
    "Better glucose control",
    "Reduce medication side effects",
];
const OTHER_MEDICATIONS: [&str; 2] = ["Metformin", "Lisinopril"];

pub trait Enricher {
    /// `surveys` is the member's history in chronological order and is never
    /// empty.
    fn enrich(&mut self, name: &str, surveys: &[SurveyResponse]) -> Option<MemberDetails>;
}

/// Leaves profiles without detail fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEnrichment;

impl Enricher for NoEnrichment {
    fn enrich(&mut self, _name: &str, _surveys: &[SurveyResponse]) -> Option<MemberDetails> {
        None
    }
}

/// Fills detail fields with random placeholder data for demos.
pub struct MockEnrichment<R> {
    rng: R,
}

impl<R: Rng> MockEnrichment<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Enricher for MockEnrichment<R> {
    fn enrich(&mut self, _name: &str, surveys: &[SurveyResponse]) -> Option<MemberDetails> {
        let first_date = format_display_date(&surveys.first()?.submitted_at);
        let last_date = format_display_date(&surveys.last()?.submitted_at);
        let rng = &mut self.rng;

        let other_count = rng.gen_range(0..=OTHER_MEDICATIONS.len());
        let goal_count = rng.gen_range(1..=3);
        let pa_expiration = Utc::now().date_naive() + Duration::days(365);

        Some(MemberDetails {
            age: rng.gen_range(30..60),
            gender: GENDERS.choose(rng).copied().unwrap_or("Female").to_string(),
            glp1_medication: GLP1_MEDICATIONS
                .choose(rng)
                .copied()
                .unwrap_or("Semaglutide")
                .to_string(),
            fill_history: vec![
                FillRecord {
                    date: first_date.clone(),
                    medication: "Semaglutide".to_string(),
                    quantity: "30 day supply".to_string(),
                },
                FillRecord {
                    date: last_date.clone(),
                    medication: "Semaglutide".to_string(),
                    quantity: "30 day supply".to_string(),
                },
            ],
            other_medications: OTHER_MEDICATIONS[..other_count]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            pa_expiration_date: pa_expiration.format("%-m/%-d/%Y").to_string(),
            member_goals: GOALS[..goal_count].iter().map(|g| g.to_string()).collect(),
            staff_interactions: vec![
                StaffInteraction {
                    date: last_date,
                    kind: "Check-in Call".to_string(),
                    notes: "Patient reports feeling well, no new side effects".to_string(),
                },
                StaffInteraction {
                    date: first_date,
                    kind: "Initial Consultation".to_string(),
                    notes: "Started GLP-1 therapy, discussed expectations".to_string(),
                },
            ],
        })
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One submitted check-in survey, as read from the program CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub name: String,
    pub taking_medication: String,
    pub has_side_effects: String,
    pub symptoms: String,
    pub prescription_duration: String,
    pub activity_days: i32,
    pub first_time: String,
    pub current_weight: String,
    pub height: String,
    pub submitted_at: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Ordering weight used when ranking members, higher is riskier.
    pub fn rank(self) -> u8 {
        match self {
            RiskLevel::High => 3,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub date: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    pub date: String,
    pub medication: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffInteraction {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: String,
}

/// Illustrative detail fields produced by an [`crate::enrichment::Enricher`].
///
/// None of these feed into scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    pub age: u32,
    pub gender: String,
    pub glp1_medication: String,
    pub fill_history: Vec<FillRecord>,
    pub other_medications: Vec<String>,
    pub pa_expiration_date: String,
    pub member_goals: Vec<String>,
    pub staff_interactions: Vec<StaffInteraction>,
}

/// Longitudinal view of one member, rebuilt from scratch on every aggregation.
///
/// `weight_change` is `initial_weight - current_weight`: positive means the
/// member lost weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: String,
    pub name: String,
    pub height: String,
    pub total_surveys: usize,
    pub last_survey_date: String,
    pub last_submitted_at: Option<NaiveDateTime>,
    pub program_compliance: u32,
    pub current_weight: f64,
    pub initial_weight: f64,
    pub weight_change: f64,
    pub bmi: f64,
    pub risk_level: RiskLevel,
    pub last_medication_compliance: String,
    pub last_side_effects: String,
    pub average_activity: f64,
    pub prescription_duration: String,
    pub survey_responses: Vec<SurveyResponse>,
    pub weight_history: Vec<WeightPoint>,
    #[serde(flatten)]
    pub details: Option<MemberDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    pub total_members: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub avg_compliance: u32,
    pub avg_weight_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskLevelSummary {
    pub risk_level: RiskLevel,
    pub count: usize,
    pub avg_compliance: f64,
}

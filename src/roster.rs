use crate::models::{MemberProfile, ProgramSummary, RiskLevel, RiskLevelSummary};
use crate::risk::round_to_tenth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// High risk first
    #[default]
    Risk,
    /// Lowest compliance first
    Compliance,
    /// Smallest weight loss first
    WeightLoss,
}

pub fn filter_by_risk(profiles: &[MemberProfile], level: Option<RiskLevel>) -> Vec<MemberProfile> {
    profiles
        .iter()
        .filter(|p| level.map_or(true, |level| p.risk_level == level))
        .cloned()
        .collect()
}

pub fn search_by_name(profiles: &[MemberProfile], query: &str) -> Vec<MemberProfile> {
    let needle = query.trim().to_lowercase();
    profiles
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn sort_members(profiles: &mut [MemberProfile], key: SortKey) {
    match key {
        SortKey::Risk => profiles.sort_by(|a, b| b.risk_level.rank().cmp(&a.risk_level.rank())),
        SortKey::Compliance => profiles.sort_by_key(|p| p.program_compliance),
        SortKey::WeightLoss => profiles.sort_by(|a, b| a.weight_change.total_cmp(&b.weight_change)),
    }
}

pub fn program_summary(profiles: &[MemberProfile]) -> ProgramSummary {
    let count_of = |level: RiskLevel| profiles.iter().filter(|p| p.risk_level == level).count();

    let (avg_compliance, avg_weight_change) = if profiles.is_empty() {
        (0, 0.0)
    } else {
        let n = profiles.len() as f64;
        let compliance: f64 = profiles.iter().map(|p| f64::from(p.program_compliance)).sum();
        let weight: f64 = profiles.iter().map(|p| p.weight_change).sum();
        ((compliance / n).round() as u32, round_to_tenth(weight / n))
    };

    ProgramSummary {
        total_members: profiles.len(),
        high_risk: count_of(RiskLevel::High),
        medium_risk: count_of(RiskLevel::Medium),
        low_risk: count_of(RiskLevel::Low),
        avg_compliance,
        avg_weight_change,
    }
}

/// Member count and mean compliance per risk level, High first. Levels with
/// no members are left out.
pub fn summarize_by_risk(profiles: &[MemberProfile]) -> Vec<RiskLevelSummary> {
    [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low]
        .into_iter()
        .filter_map(|risk_level| {
            let compliance: Vec<u32> = profiles
                .iter()
                .filter(|p| p.risk_level == risk_level)
                .map(|p| p.program_compliance)
                .collect();
            if compliance.is_empty() {
                return None;
            }
            let total: u32 = compliance.iter().sum();
            Some(RiskLevelSummary {
                risk_level,
                count: compliance.len(),
                avg_compliance: f64::from(total) / compliance.len() as f64,
            })
        })
        .collect()
}

//! Survey ingestion and member risk scoring for care-team dashboards.
//!
//! Raw program CSV goes through [`parser`] into survey responses, then
//! [`aggregate::MemberAggregator`] rebuilds one profile per member with weight
//! trend, compliance, activity, BMI and a High/Medium/Low risk level.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod export;
pub mod models;
pub mod parser;
pub mod report;
pub mod risk;
pub mod roster;

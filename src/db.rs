use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::SurveyResponse;
use crate::parser;

pub const SEED_PROGRAM: &str = "GLP-1 Weight Management Program";
const SEED_CSV: &str = include_str!("../fixtures/glp1_program.csv");

const INSERT_SURVEY: &str = r#"
    INSERT INTO member_dashboard.survey_responses
    (id, program, member_name, taking_medication, has_side_effects, symptoms,
     prescription_duration, activity_days, first_time, current_weight, height,
     submitted_at, token, source_key)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (program, source_key) DO NOTHING
"#;

const SELECT_SURVEYS: &str = r#"
    SELECT member_name, taking_medication, has_side_effects, symptoms,
           prescription_duration, activity_days, first_time, current_weight, height,
           submitted_at, token
    FROM member_dashboard.survey_responses
    WHERE program = $1
    ORDER BY imported_at, source_key
"#;

pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config.require_database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    debug!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let surveys = parser::parse_csv(SEED_CSV);
    import_surveys(pool, SEED_PROGRAM, &surveys).await
}

/// Dedup key for a stored row. Rows without a token get a fresh key so they
/// are never merged; the token itself is stored as submitted.
fn source_key(survey: &SurveyResponse) -> String {
    if survey.token.is_empty() {
        format!("import-{}", Uuid::new_v4())
    } else {
        survey.token.clone()
    }
}

/// Stores raw survey rows for `program`. Rows whose token was already
/// imported for the program are skipped; returns how many were inserted.
pub async fn import_surveys(
    pool: &PgPool,
    program: &str,
    surveys: &[SurveyResponse],
) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for survey in surveys {
        let result = sqlx::query(INSERT_SURVEY)
            .bind(Uuid::new_v4())
            .bind(program)
            .bind(&survey.name)
            .bind(&survey.taking_medication)
            .bind(&survey.has_side_effects)
            .bind(&survey.symptoms)
            .bind(&survey.prescription_duration)
            .bind(survey.activity_days)
            .bind(&survey.first_time)
            .bind(&survey.current_weight)
            .bind(&survey.height)
            .bind(&survey.submitted_at)
            .bind(&survey.token)
            .bind(source_key(survey))
            .execute(pool)
            .await
            .with_context(|| format!("failed to store survey for {}", survey.name))?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    info!(program, inserted, total = surveys.len(), "imported surveys");
    Ok(inserted)
}

pub async fn fetch_surveys(pool: &PgPool, program: &str) -> anyhow::Result<Vec<SurveyResponse>> {
    let rows = sqlx::query(SELECT_SURVEYS)
        .bind(program)
        .fetch_all(pool)
        .await?;

    let mut surveys = Vec::with_capacity(rows.len());

    for row in rows {
        surveys.push(SurveyResponse {
            name: row.get("member_name"),
            taking_medication: row.get("taking_medication"),
            has_side_effects: row.get("has_side_effects"),
            symptoms: row.get("symptoms"),
            prescription_duration: row.get("prescription_duration"),
            activity_days: row.get("activity_days"),
            first_time: row.get("first_time"),
            current_weight: row.get("current_weight"),
            height: row.get("height"),
            submitted_at: row.get("submitted_at"),
            token: row.get("token"),
        });
    }

    debug!(program, rows = surveys.len(), "fetched surveys");
    Ok(surveys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_get_unique_source_keys() {
        let blank = SurveyResponse::default();
        let first = source_key(&blank);
        assert!(first.starts_with("import-"));
        assert_ne!(first, source_key(&blank));

        let tokened = SurveyResponse {
            token: "TOKEN_0001".to_string(),
            ..Default::default()
        };
        assert_eq!(source_key(&tokened), "TOKEN_0001");
    }

    #[test]
    fn token_round_trips_through_its_own_column() {
        assert!(INSERT_SURVEY.contains("submitted_at, token, source_key)"));
        assert!(INSERT_SURVEY.contains("$14"));
        assert!(SELECT_SURVEYS.contains("submitted_at, token\n"));
    }
}

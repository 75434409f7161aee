use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use member_dashboard::aggregate::MemberAggregator;
use member_dashboard::config::Config;
use member_dashboard::enrichment::MockEnrichment;
use member_dashboard::models::{RiskLevel, SurveyResponse};
use member_dashboard::roster::SortKey;
use member_dashboard::{db, export, parser, report, roster};

#[derive(Parser)]
#[command(name = "member-dashboard")]
#[command(about = "Member survey aggregation and risk scoring for care teams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where survey responses come from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Survey CSV export
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Program previously imported into the database
    #[arg(long)]
    program: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the bundled GLP-1 sample program
    Seed,
    /// Import survey responses from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        program: String,
    },
    /// Rank members by risk
    Score {
        #[command(flatten)]
        source: Source,
        #[arg(long, value_enum)]
        risk: Option<RiskLevel>,
        #[arg(long, value_enum, default_value_t = SortKey::Risk)]
        sort: SortKey,
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print member profiles as JSON
    Profiles {
        #[command(flatten)]
        source: Source,
        /// Fill demo-only detail fields with random data
        #[arg(long)]
        mock_details: bool,
        /// Seed for reproducible mock details
        #[arg(long, requires = "mock_details")]
        seed: Option<u64>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export member profiles as CSV
    Export {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = "members.csv")]
        out: PathBuf,
    },
    /// Print one member's rows from a survey CSV, header included
    Slice {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        member: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "member_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = db::connect(&Config::from_env()?).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = db::connect(&Config::from_env()?).await?;
            let inserted = db::seed(&pool).await?;
            println!("Inserted {inserted} seed surveys into {}.", db::SEED_PROGRAM);
        }
        Commands::Import { csv, program } => {
            let surveys = read_csv(&csv)?;
            let pool = db::connect(&Config::from_env()?).await?;
            let inserted = db::import_surveys(&pool, &program, &surveys).await?;
            println!("Inserted {inserted} surveys from {}.", csv.display());
        }
        Commands::Score {
            source,
            risk,
            sort,
            search,
            limit,
        } => {
            let (surveys, _) = load_surveys(&source).await?;
            let profiles = MemberAggregator::deterministic().aggregate(&surveys);
            let mut members = roster::filter_by_risk(&profiles, risk);
            if let Some(query) = search.as_deref() {
                members = roster::search_by_name(&members, query);
            }
            roster::sort_members(&mut members, sort);

            if members.is_empty() {
                println!("No members match these filters.");
                return Ok(());
            }

            println!("Showing {} of {} members:", members.len().min(limit), profiles.len());
            for member in members.iter().take(limit) {
                println!(
                    "- {} ({} risk) compliance {}%, weight change {:+.1} lbs, activity {:.1}, BMI {:.1}, {} surveys",
                    member.name,
                    member.risk_level,
                    member.program_compliance,
                    member.weight_change,
                    member.average_activity,
                    member.bmi,
                    member.total_surveys
                );
            }
        }
        Commands::Profiles {
            source,
            mock_details,
            seed,
        } => {
            let (surveys, _) = load_surveys(&source).await?;
            let profiles = if mock_details {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                MemberAggregator::new(MockEnrichment::new(rng)).aggregate(&surveys)
            } else {
                MemberAggregator::deterministic().aggregate(&surveys)
            };
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        }
        Commands::Report { source, out } => {
            let (surveys, label) = load_surveys(&source).await?;
            let profiles = MemberAggregator::deterministic().aggregate(&surveys);
            let report = report::build_report(Some(label.as_str()), &profiles);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { source, out } => {
            let (surveys, _) = load_surveys(&source).await?;
            let profiles = MemberAggregator::deterministic().aggregate(&surveys);
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_profiles_csv(&profiles, file)?;
            println!("Exported {} members to {}.", profiles.len(), out.display());
        }
        Commands::Slice { csv, member } => {
            let text = std::fs::read_to_string(&csv)
                .with_context(|| format!("failed to read {}", csv.display()))?;
            println!("{}", export::member_csv_slice(&text, &member));
        }
    }

    Ok(())
}

fn read_csv(path: &Path) -> anyhow::Result<Vec<SurveyResponse>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let surveys = parser::parse_csv(&text);
    info!(path = %path.display(), surveys = surveys.len(), "loaded survey csv");
    Ok(surveys)
}

/// Only the `--program` path reads database settings.
async fn load_surveys(source: &Source) -> anyhow::Result<(Vec<SurveyResponse>, String)> {
    if let Some(path) = &source.csv {
        return Ok((read_csv(path)?, path.display().to_string()));
    }

    let program = source
        .program
        .as_deref()
        .context("either --csv or --program is required")?;
    let pool = db::connect(&Config::from_env()?).await?;
    let surveys = db::fetch_surveys(&pool, program).await?;
    Ok((surveys, program.to_string()))
}

//! Credit Scorer CLI
//!
//! A command-line tool for scoring applicants, submitting labeled feedback
//! and checking on a running credit scorer service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{score, status};
use scoring_lib::PredictionRequest;
use std::path::PathBuf;

/// Credit Scorer CLI
#[derive(Parser)]
#[command(name = "csr")]
#[command(author, version, about = "CLI for the Credit Scorer service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CSR_API_URL env var)
    #[arg(long, env = "CSR_API_URL")]
    pub api_url: Option<String>,

    /// Path of the health acknowledgment endpoint
    #[arg(long, env = "CSR_HEALTH_PATH")]
    pub health_path: Option<String>,

    /// Path of the scoring endpoint
    #[arg(long, env = "CSR_PREDICT_PATH")]
    pub predict_path: Option<String>,

    /// Path of the feedback endpoint
    #[arg(long, env = "CSR_FEEDBACK_PATH")]
    pub feedback_path: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the service is up
    Ping,

    /// Show component health, readiness and the resident model
    Status,

    /// Score a single applicant
    Predict(ApplicantArgs),

    /// Submit labeled outcomes and retrain the model
    Feedback {
        /// Feedback file: a JSON array, or CSV in the seed dataset layout
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ApplicantArgs {
    /// Loan duration in months
    #[arg(long, allow_negative_numbers = true)]
    pub duration: i64,

    /// Credit amount
    #[arg(long, allow_negative_numbers = true)]
    pub amount: i64,

    /// Installment rate in percentage of disposable income
    #[arg(long, allow_negative_numbers = true)]
    pub installment_rate: i64,

    /// Years at present residence
    #[arg(long, allow_negative_numbers = true)]
    pub residence_since: i64,

    /// Age in years
    #[arg(long, allow_negative_numbers = true)]
    pub age: i64,

    /// Number of existing credits at this bank
    #[arg(long, allow_negative_numbers = true)]
    pub existing_credits: i64,

    /// Number of people liable to provide maintenance for
    #[arg(long, allow_negative_numbers = true)]
    pub dependents: i64,
}

impl From<ApplicantArgs> for PredictionRequest {
    fn from(args: ApplicantArgs) -> Self {
        PredictionRequest {
            duration_in_month: args.duration,
            credit_amount: args.amount,
            installment_rate: args.installment_rate,
            present_residence_since: args.residence_since,
            age_in_years: args.age,
            existing_credits: args.existing_credits,
            dependents: args.dependents,
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let api_url = config.resolve_api_url(cli.api_url);
    let routes = config.resolve_routes(cli.health_path, cli.predict_path, cli.feedback_path);
    let client = client::ApiClient::new(&api_url, routes)?;

    match cli.command {
        Commands::Ping => score::ping(&client, cli.format).await?,
        Commands::Status => status::show_status(&client, cli.format).await?,
        Commands::Predict(args) => score::predict(&client, args.into(), cli.format).await?,
        Commands::Feedback { file } => score::feedback(&client, &file, cli.format).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

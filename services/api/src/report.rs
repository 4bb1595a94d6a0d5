use crate::infra::{build_report_service, parse_date};
use chrono::NaiveDate;
use clap::Args;
use overdue_report::config::AppConfig;
use overdue_report::error::AppError;
use overdue_report::telemetry;
use overdue_report::workflows::overdue::{SearchOutcome, SearchRequest};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Earliest incorporation date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) incorporated_from: NaiveDate,
    /// Latest incorporation date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) incorporated_to: NaiveDate,
    /// Number of search results to examine
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) volume: i64,
    /// Write the artifact here instead of the configured reports directory
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.output_dir.clone() {
        config.reports.directory = dir;
    }

    telemetry::init(&config.telemetry)?;

    let service = build_report_service(&config.registry, &config.reports)?;
    let outcome = service.search(search_request(&args)).await?;
    render_outcome(&outcome, &config.reports.directory);
    Ok(())
}

fn search_request(args: &ReportArgs) -> SearchRequest {
    SearchRequest {
        incorporated_from: args.incorporated_from.format("%Y-%m-%d").to_string(),
        incorporated_to: args.incorporated_to.format("%Y-%m-%d").to_string(),
        volume: args.volume,
    }
}

fn render_outcome(outcome: &SearchOutcome, directory: &std::path::Path) {
    println!("Overdue filing report");
    println!("- Overdue companies: {}", outcome.overdue_count);
    println!("- Artifact: {}", directory.join(&outcome.filename).display());
}

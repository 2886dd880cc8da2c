//! CLI entry point for jobcrew.

mod cli;

use clap::Parser;
use jobcrew::api::GeminiClient;
use jobcrew::config::{load_config_with_source, Config};
use jobcrew::crew::{Crew, CrewReport};
use jobcrew::error::CrewError;
use jobcrew::preflight::{check_connection, quota_tips, validate_config_ready};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.verbose);

    if args.quota_tips {
        eprintln!("{}", quota_tips());
        return;
    }

    let loaded = match load_config_with_source(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    info!(source = %loaded.source, "configuration loaded");
    let mut config = loaded.config;
    args.apply_overrides(&mut config);

    if let Err(e) = run(&args, &config).await {
        eprintln!("error: {e}");
        if e.is_rate_limited() {
            eprintln!("\n{}", quota_tips());
        }
        std::process::exit(1);
    }
}

async fn run(args: &cli::Args, config: &Config) -> Result<(), CrewError> {
    validate_config_ready(config).map_err(CrewError::Preflight)?;

    if args.check_connection {
        let client = GeminiClient::new(&config.model, config.network.api_timeout());
        check_connection(&client).await?;
    }

    let crew = Crew::new(config)?;
    info!(
        model = %config.model.model,
        max_retries = crew.executor().policy().max_retries(),
        tasks = crew.tasks().len(),
        "starting job posting crew"
    );
    let report = crew.kickoff(&args.inputs()).await?;
    write_report(&report, args.output.as_deref())
}

fn write_report(report: &CrewReport, output: Option<&str>) -> Result<(), CrewError> {
    match output {
        Some(path) => {
            report.write_markdown(Path::new(path))?;
            info!(path, "job posting written");
        }
        None => print!("{}", report.to_markdown()),
    }
    Ok(())
}

/// Logs go to stderr so the posting on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "jobcrew=debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

//! CLI argument parsing via clap.

use clap::Parser;
use jobcrew::config::Config;
use jobcrew::crew::CrewInputs;

/// Research a company and write a job posting with a crew of AI agents.
#[derive(Debug, Parser)]
#[command(name = "jobcrew", version)]
pub struct Args {
    /// Company website domain, e.g. `acme.com`.
    #[arg(long = "company-domain", required_unless_present = "quota_tips")]
    pub company_domain: Option<String>,

    /// Short description of the company.
    #[arg(long = "company-description", required_unless_present = "quota_tips")]
    pub company_description: Option<String>,

    /// The role the hiring manager needs to fill.
    #[arg(long = "hiring-needs", required_unless_present = "quota_tips")]
    pub hiring_needs: Option<String>,

    /// Benefits to highlight in the posting.
    #[arg(long = "specific-benefits", default_value = "Not specified")]
    pub specific_benefits: String,

    /// Path to config file (default: ./jobcrew.toml or ~/.config/jobcrew/jobcrew.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Write the posting to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Skip the trailing industry-analysis task.
    #[arg(long = "skip-industry-analysis")]
    pub skip_industry_analysis: bool,

    /// Override the number of attempts per remote call.
    #[arg(long = "max-retries", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: Option<u32>,

    /// Log debug output and every task result.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Send one small model request before starting the crew.
    #[arg(long = "check-connection")]
    pub check_connection: bool,

    /// Print quota management tips and exit.
    #[arg(long = "quota-tips")]
    pub quota_tips: bool,
}

impl Args {
    pub fn inputs(&self) -> CrewInputs {
        CrewInputs {
            company_domain: self.company_domain.clone().unwrap_or_default(),
            company_description: self.company_description.clone().unwrap_or_default(),
            hiring_needs: self.hiring_needs.clone().unwrap_or_default(),
            specific_benefits: self.specific_benefits.clone(),
        }
    }

    /// CLI flags win over file and environment settings.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if self.skip_industry_analysis {
            config.crew.include_industry_analysis = false;
        }
        if self.verbose {
            config.crew.verbose = true;
        }
    }
}

//! jobcrew: a crew of AI agents that researches a company and writes a job
//! posting, built around a rate-limit-aware retry executor.
//!
//! Every remote call (Gemini, web search, scraping) runs through
//! [`retry::RetryExecutor`], which spaces attempts with exponential backoff
//! and waits out quota exhaustion instead of failing the run.
//!
//! # Quick start
//!
//! ```no_run
//! use jobcrew::config::load_config;
//! use jobcrew::crew::{Crew, CrewInputs};
//!
//! # async fn example() -> Result<(), jobcrew::error::CrewError> {
//! let config = load_config(None)?;
//! let crew = Crew::new(&config)?;
//! let report = crew
//!     .kickoff(&CrewInputs {
//!         company_domain: "acme.com".into(),
//!         company_description: "Acme builds anvils.".into(),
//!         hiring_needs: "Senior Rust engineer".into(),
//!         specific_benefits: "Four-day week".into(),
//!     })
//!     .await?;
//! println!("{}", report.to_markdown());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod crew;
pub mod error;
pub mod preflight;
pub mod prompt;
pub mod retry;
#[cfg(test)]
pub mod testsupport;
pub mod tools;

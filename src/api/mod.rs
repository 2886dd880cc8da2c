//! HTTP client for the generative-language API.
//!
//! The API layer is split into:
//! - `gemini`: request/response wire types for `:generateContent`
//! - `client`: the HTTP client that sends one request per call
//!
//! Clients never retry on their own; callers wrap them in a
//! [`RetryExecutor`](crate::retry::RetryExecutor).

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::SystemTime;

mod client;
mod gemini;

pub use client::GeminiClient;

/// One text-generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    /// Persona/system instruction for the agent issuing the call.
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Minimal model API interface used by the crew.
///
/// This trait lets tests provide deterministic mock responses without network
/// calls while the production path uses [`GeminiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError>;
}

/// Parse a `Retry-After` header as delta-seconds or an HTTP-date.
pub(crate) fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let at = httpdate::parse_http_date(raw).ok()?;
    // A date in the past means "retry now".
    Some(
        at.duration_since(SystemTime::now())
            .map(|delta| delta.as_secs())
            .unwrap_or(0),
    )
}

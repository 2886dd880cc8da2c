//! Wire types for the Gemini `:generateContent` endpoint.

use serde::{Deserialize, Serialize};

use super::GenerateRequest;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

impl GenerateContentBody {
    pub(super) fn from_request(request: &GenerateRequest) -> Self {
        let system_instruction = request
            .system_instruction
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| text_content(None, text));
        let generation_config = (request.temperature.is_some()
            || request.max_output_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        });
        Self {
            contents: vec![text_content(Some("user"), &request.prompt)],
            system_instruction,
            generation_config,
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub(super) fn into_text(self) -> Result<String, ApiError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "unspecified".to_string());
            return Err(ApiError::InvalidResponse(format!(
                "no candidates returned (block reason: {reason})"
            )));
        };
        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unspecified");
            return Err(ApiError::InvalidResponse(format!(
                "candidate contained no text (finish reason: {reason})"
            )));
        }
        Ok(text)
    }
}

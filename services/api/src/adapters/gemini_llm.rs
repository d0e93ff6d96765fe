//! services/api/src/adapters/gemini_llm.rs
//!
//! This module contains the adapter for Google's Gemini text model.
//! It implements the `TextGenerationService` port from the `core` crate.

use std::time::Duration;

use async_trait::async_trait;
use kalakriti_core::ports::{PortError, PortResult, TextGenerationService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

//=========================================================================================
// API Request/Response Types
//=========================================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using the Gemini REST API.
#[derive(Clone)]
pub struct GeminiTextAdapter {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiTextAdapter {
    /// Creates a new `GeminiTextAdapter`. Fails only if the HTTP client cannot be built.
    pub fn new(api_key: String, model: String, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Points the adapter at a different endpoint, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Concatenates the text parts of the first candidate.
    fn extract_text(response: GeminiResponse) -> PortResult<String> {
        if let Some(err) = response.error {
            return Err(PortError::Unexpected(format!("Gemini API error: {}", err.message)));
        }

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| PortError::Unexpected("Gemini returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(PortError::Unexpected(format!(
                "Gemini response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for GeminiTextAdapter {
    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!(model = %self.model, "Sending request to Gemini API");
        let response = self
            .client
            .post(self.build_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read response: {}", e.without_url())))?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            error!(status = %status, "Gemini rejected the API key");
            return Err(PortError::Unauthorized);
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(status = %status, error = %e, "Failed to parse Gemini response");
            PortError::Unexpected(format!("Failed to parse Gemini response: {}", e))
        })?;

        if !status.is_success() && parsed.error.is_none() {
            return Err(PortError::Unexpected(format!("Gemini API returned {}", status)));
        }

        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GeminiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response = parse(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]}, "finishReason": "STOP"}]}"#,
        );
        assert_eq!(GeminiTextAdapter::extract_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn api_error_is_reported() {
        let response = parse(r#"{"error": {"code": 400, "message": "API key not valid"}}"#);
        match GeminiTextAdapter::extract_text(response) {
            Err(PortError::Unexpected(msg)) => assert!(msg.contains("API key not valid")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn blocked_candidate_has_no_text() {
        let response = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        match GeminiTextAdapter::extract_text(response) {
            Err(PortError::Unexpected(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn url_names_model_and_key() {
        let adapter = GeminiTextAdapter::new("k".into(), "gemini-1.5-flash-latest".into(), Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:9999");
        assert_eq!(
            adapter.build_url(),
            "http://localhost:9999/models/gemini-1.5-flash-latest:generateContent?key=k"
        );
    }
}

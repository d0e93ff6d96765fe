//! services/api/src/adapters/translate.rs
//!
//! This module contains the adapter for the Google Cloud Translation (v2) API.
//! It implements the `TranslationService` port from the `core` crate.

use std::time::Duration;

use async_trait::async_trait;
use kalakriti_core::ports::{PortError, PortResult, TranslationService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const API_BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

//=========================================================================================
// API Request/Response Types
//=========================================================================================

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    source: &'a str,
    /// "text" keeps the reply free of HTML entities.
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: Option<TranslateData>,
    error: Option<TranslateError>,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct TranslateError {
    message: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TranslationService` using Cloud Translation.
#[derive(Clone)]
pub struct GoogleTranslateAdapter {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleTranslateAdapter {
    /// Creates a new `GoogleTranslateAdapter`. Fails only if the HTTP client cannot be built.
    pub fn new(api_key: String, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            base_url: API_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn extract_translation(response: TranslateResponse) -> PortResult<String> {
        if let Some(err) = response.error {
            return Err(PortError::Unexpected(format!("Translation API error: {}", err.message)));
        }
        response
            .data
            .and_then(|data| data.translations.into_iter().next())
            .map(|t| t.translated_text)
            .ok_or_else(|| PortError::Unexpected("Translation API returned no translations".to_string()))
    }
}

//=========================================================================================
// `TranslationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TranslationService for GoogleTranslateAdapter {
    async fn translate(&self, text: &str, target_language: &str) -> PortResult<String> {
        let request = TranslateRequest {
            q: text,
            target: target_language,
            source: kalakriti_core::localization::SOURCE_LANGUAGE,
            format: "text",
        };

        debug!(target_language, chars = text.chars().count(), "Sending translation request");
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read response: {}", e.without_url())))?;

        let parsed: TranslateResponse = serde_json::from_str(&body).map_err(|e| {
            error!(status = %status, error = %e, "Failed to parse translation response");
            PortError::Unexpected(format!("Failed to parse translation response: {}", e))
        })?;

        if !status.is_success() && parsed.error.is_none() {
            return Err(PortError::Unexpected(format!("Translation API returned {}", status)));
        }

        Self::extract_translation(parsed)
    }
}

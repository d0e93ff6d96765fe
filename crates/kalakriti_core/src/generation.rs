//! crates/kalakriti_core/src/generation.rs
//!
//! The AI content pipeline: assemble a prompt, make exactly one model call,
//! and turn the reply into a typed result or a typed error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::conversation::Turn;
use crate::domain::{ProductDescriptions, ProductRecord, SocialPlan};
use crate::extraction::{descriptions_from_value, extract_json, plan_from_value};
use crate::ports::{PortError, TextGenerationService};
use crate::prompts;

/// Why a generation request produced no content. Callers display these; they
/// are never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("AI model not configured. Please check your API key.")]
    ModelUnavailable,
    #[error("Could not find a JSON object in the AI response")]
    MalformedResponse,
    #[error("Could not parse the AI response: {0}")]
    ParseFailure(String),
    #[error("The AI provider returned an error: {0}")]
    ProviderError(String),
    #[error("The AI provider did not respond in time")]
    Timeout,
}

/// Front door to the text model. Holds `None` when the model client could not
/// be configured at start-up; every request then fails without a network call.
#[derive(Clone)]
pub struct ContentGenerator {
    model: Option<Arc<dyn TextGenerationService>>,
    timeout: Duration,
}

impl ContentGenerator {
    pub fn new(model: Option<Arc<dyn TextGenerationService>>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// A generator whose model is permanently unavailable.
    pub fn unconfigured() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Story-driven copy, feature bullets and a social caption for one product.
    pub async fn generate_product_descriptions(
        &self,
        artisan_story: &str,
        product_name: &str,
        materials: &str,
    ) -> Result<ProductDescriptions, GenerationError> {
        let prompt = prompts::product_descriptions_prompt(artisan_story, product_name, materials);
        let reply = self.complete("product_descriptions", &prompt).await?;
        let value = extract_json(&reply).map_err(|e| {
            warn!(kind = "product_descriptions", error = %e, "Unusable model reply");
            e
        })?;
        Ok(descriptions_from_value(&value))
    }

    /// A three-post social media campaign for one product.
    pub async fn generate_social_plan(
        &self,
        artisan_story: &str,
        product_name: &str,
        campaign_goal: &str,
    ) -> Result<SocialPlan, GenerationError> {
        let prompt = prompts::social_plan_prompt(artisan_story, product_name, campaign_goal);
        let reply = self.complete("social_plan", &prompt).await?;
        let value = extract_json(&reply).map_err(|e| {
            warn!(kind = "social_plan", error = %e, "Unusable model reply");
            e
        })?;
        Ok(plan_from_value(&value))
    }

    /// Answers the customer's latest message using only the artisan's story,
    /// the product details and the conversation so far. Returns plain text.
    pub async fn answer_customer_query(
        &self,
        artisan_story: &str,
        product: &ProductRecord,
        conversation: &[Turn],
    ) -> Result<String, GenerationError> {
        let prompt = prompts::customer_query_prompt(artisan_story, product, conversation);
        let reply = self.complete("customer_query", &prompt).await?;
        Ok(reply.trim().to_string())
    }

    /// One bounded model call. No retries.
    async fn complete(&self, kind: &'static str, prompt: &str) -> Result<String, GenerationError> {
        let model = self.model.as_ref().ok_or(GenerationError::ModelUnavailable)?;

        debug!(kind, prompt_len = prompt.len(), "Sending prompt to text model");
        let reply = match tokio::time::timeout(self.timeout, model.generate_text(prompt)).await {
            Err(_) => {
                warn!(kind, timeout_secs = self.timeout.as_secs(), "Text model timed out");
                return Err(GenerationError::Timeout);
            }
            Ok(Err(e)) => {
                warn!(kind, error = %e, "Text model call failed");
                return Err(match e {
                    PortError::Unexpected(msg) | PortError::NotFound(msg) => {
                        GenerationError::ProviderError(msg)
                    }
                    PortError::Unauthorized => {
                        GenerationError::ProviderError("Unauthorized".to_string())
                    }
                });
            }
            Ok(Ok(reply)) => reply,
        };

        info!(kind, reply_len = reply.len(), "Text model replied");
        Ok(reply)
    }
}

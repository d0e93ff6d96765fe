//! services/api/src/adapters/image_gen.rs
//!
//! This module contains the adapter for OpenAI's image generation (DALL-E).
//! It implements the `ImageGenerationService` port from the `core` crate.
//! Size and quality are fixed: one 1024x1024 HD image per request.

use async_openai::{
    config::OpenAIConfig,
    types::images::{CreateImageRequestArgs, Image, ImageModel, ImageQuality, ImageResponseFormat, ImageSize},
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use kalakriti_core::ports::{ImageGenerationService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ImageGenerationService` port using the OpenAI Images API.
#[derive(Clone)]
pub struct OpenAiImageAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiImageAdapter {
    /// Creates a new `OpenAiImageAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn image_model(&self) -> ImageModel {
        match self.model.as_str() {
            "dall-e-3" => ImageModel::DallE3,
            "dall-e-2" => ImageModel::DallE2,
            other => ImageModel::Other(other.to_string()),
        }
    }
}

//=========================================================================================
// `ImageGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageGenerationService for OpenAiImageAdapter {
    async fn generate_image(&self, prompt: &str) -> PortResult<String> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(self.image_model())
            .n(1)
            .size(ImageSize::S1024x1024)
            .quality(ImageQuality::HD)
            .response_format(ImageResponseFormat::Url)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .images()
            .generate(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        match response.data.first().map(|image| image.as_ref()) {
            Some(Image::Url { url, .. }) => Ok(url.clone()),
            Some(Image::B64Json { .. }) => Err(PortError::Unexpected(
                "Image provider returned inline data instead of a URL.".to_string(),
            )),
            None => Err(PortError::Unexpected(
                "Image provider returned no images.".to_string(),
            )),
        }
    }
}

//! crates/kalakriti_core/src/imaging.rs
//!
//! Thin front door to the image-generation provider.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::ports::ImageGenerationService;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageGenError {
    #[error("Image generation is not configured. Please check your API key.")]
    ProviderUnconfigured,
    #[error("The image provider returned an error: {0}")]
    ProviderError(String),
    #[error("The image provider did not respond in time")]
    Timeout,
}

#[derive(Clone)]
pub struct ImageGateway {
    backend: Option<Arc<dyn ImageGenerationService>>,
    timeout: Duration,
}

impl ImageGateway {
    pub fn new(backend: Option<Arc<dyn ImageGenerationService>>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn unconfigured() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// One attempt; returns the URL of the generated image.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, ImageGenError> {
        let backend = self.backend.as_ref().ok_or(ImageGenError::ProviderUnconfigured)?;

        match tokio::time::timeout(self.timeout, backend.generate_image(prompt)).await {
            Ok(Ok(url)) => {
                info!("Image generated");
                Ok(url)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Image generation failed");
                Err(ImageGenError::ProviderError(e.to_string()))
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Image generation timed out");
                Err(ImageGenError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeImages {
        calls: AtomicUsize,
        result: Result<&'static str, &'static str>,
        delay: Duration,
    }

    #[async_trait]
    impl ImageGenerationService for FakeImages {
        async fn generate_image(&self, _prompt: &str) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result
                .map(str::to_string)
                .map_err(|e| PortError::Unexpected(e.to_string()))
        }
    }

    #[tokio::test]
    async fn unconfigured_gateway_refuses() {
        let gateway = ImageGateway::unconfigured();
        assert_eq!(
            gateway.generate_image("a blue scarf").await,
            Err(ImageGenError::ProviderUnconfigured)
        );
    }

    #[tokio::test]
    async fn returns_url_from_backend() {
        let backend = Arc::new(FakeImages {
            calls: AtomicUsize::new(0),
            result: Ok("https://images.example/scarf.png"),
            delay: Duration::ZERO,
        });
        let gateway = ImageGateway::new(Some(backend.clone()), Duration::from_secs(1));
        assert_eq!(
            gateway.generate_image("a blue scarf").await.unwrap(),
            "https://images.example/scarf.png"
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_not_retried() {
        let backend = Arc::new(FakeImages {
            calls: AtomicUsize::new(0),
            result: Err("content policy violation"),
            delay: Duration::ZERO,
        });
        let gateway = ImageGateway::new(Some(backend.clone()), Duration::from_secs(1));
        match gateway.generate_image("a blue scarf").await {
            Err(ImageGenError::ProviderError(msg)) => assert!(msg.contains("content policy")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let backend = Arc::new(FakeImages {
            calls: AtomicUsize::new(0),
            result: Ok("https://images.example/late.png"),
            delay: Duration::from_secs(5),
        });
        let gateway = ImageGateway::new(Some(backend.clone()), Duration::from_millis(20));
        assert_eq!(
            gateway.generate_image("a blue scarf").await,
            Err(ImageGenError::Timeout)
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}

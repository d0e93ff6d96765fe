//! crates/kalakriti_core/src/localization.rs
//!
//! Translation of UI strings. Translation is a nicety, never a failure: any
//! problem on the way to the backend returns the original text.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::ports::TranslationService;

/// Source language of every string in the marketplace.
pub const SOURCE_LANGUAGE: &str = "en";

/// Languages offered to visitors, as `(display name, code)`.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[("English", "en"), ("Hindi", "hi"), ("Gujarati", "gu")];

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(_, c)| *c == code)
}

/// Bounded `(text, language) -> translation` map, least recently used evicted first.
type TranslationCache = LruCache<(String, String), String>;

/// Translates text through an optional backend.
#[derive(Clone)]
pub struct Localizer {
    backend: Option<Arc<dyn TranslationService>>,
    cache: Option<Arc<Mutex<TranslationCache>>>,
    timeout: Duration,
}

impl Localizer {
    /// `cache_capacity` of zero disables caching.
    pub fn new(backend: Option<Arc<dyn TranslationService>>, timeout: Duration, cache_capacity: usize) -> Self {
        let cache = NonZeroUsize::new(cache_capacity).map(|capacity| Arc::new(Mutex::new(LruCache::new(capacity))));
        Self {
            backend,
            cache,
            timeout,
        }
    }

    /// A localizer that always returns its input.
    pub fn passthrough() -> Self {
        Self::new(None, Duration::from_secs(30), 0)
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns `text` in `target_language`, or `text` itself when the target is
    /// English, the input is empty, the backend is missing, or the call fails.
    pub async fn translate(&self, text: &str, target_language: &str) -> String {
        if text.is_empty() || target_language == SOURCE_LANGUAGE {
            return text.to_string();
        }
        let Some(backend) = self.backend.as_ref() else {
            return text.to_string();
        };

        if let Some(hit) = self.cached(text, target_language).await {
            debug!(target_language, "Translation cache hit");
            return hit;
        }

        match tokio::time::timeout(self.timeout, backend.translate(text, target_language)).await {
            Ok(Ok(translated)) => {
                self.remember(text, target_language, &translated).await;
                translated
            }
            Ok(Err(e)) => {
                warn!(target_language, error = %e, "Translation failed, using original text");
                text.to_string()
            }
            Err(_) => {
                warn!(target_language, "Translation timed out, using original text");
                text.to_string()
            }
        }
    }

    async fn cached(&self, text: &str, language: &str) -> Option<String> {
        let mut cache = self.cache.as_ref()?.lock().await;
        cache.get(&(text.to_string(), language.to_string())).cloned()
    }

    async fn remember(&self, text: &str, language: &str, translated: &str) {
        if let Some(cache) = self.cache.as_ref() {
            cache
                .lock()
                .await
                .put((text.to_string(), language.to_string()), translated.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Upper-cases its input and tags it with the language.
    struct FakeTranslator {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeTranslator {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl TranslationService for FakeTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Unexpected("service disabled".into()));
            }
            Ok(format!("[{}] {}", target_language, text.to_uppercase()))
        }
    }

    struct SlowTranslator;

    #[async_trait]
    impl TranslationService for SlowTranslator {
        async fn translate(&self, text: &str, _target_language: &str) -> PortResult<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn english_never_reaches_the_backend() {
        let backend = FakeTranslator::new(false);
        let localizer = Localizer::new(Some(backend.clone()), Duration::from_secs(1), 0);
        for text in ["Price", "Search for a craft or product", ""] {
            assert_eq!(localizer.translate(text, "en").await, text);
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unconfigured_backend_passes_text_through() {
        let localizer = Localizer::passthrough();
        assert!(!localizer.is_configured());
        for lang in ["hi", "gu", "fr"] {
            assert_eq!(localizer.translate("Price", lang).await, "Price");
        }
    }

    #[tokio::test]
    async fn failing_backend_passes_text_through() {
        let backend = FakeTranslator::new(true);
        let localizer = Localizer::new(Some(backend.clone()), Duration::from_secs(1), 8);
        assert_eq!(localizer.translate("Price", "hi").await, "Price");
        assert_eq!(localizer.translate("Price", "hi").await, "Price");
        // Failures are not cached.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_input_is_returned_unchanged() {
        let backend = FakeTranslator::new(false);
        let localizer = Localizer::new(Some(backend.clone()), Duration::from_secs(1), 0);
        assert_eq!(localizer.translate("", "hi").await, "");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn without_cache_every_call_hits_backend() {
        let backend = FakeTranslator::new(false);
        let localizer = Localizer::new(Some(backend.clone()), Duration::from_secs(1), 0);
        assert_eq!(localizer.translate("price", "hi").await, "[hi] PRICE");
        assert_eq!(localizer.translate("price", "hi").await, "[hi] PRICE");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cache_is_keyed_by_text_and_language() {
        let backend = FakeTranslator::new(false);
        let localizer = Localizer::new(Some(backend.clone()), Duration::from_secs(1), 8);
        assert_eq!(localizer.translate("price", "hi").await, "[hi] PRICE");
        assert_eq!(localizer.translate("price", "hi").await, "[hi] PRICE");
        assert_eq!(localizer.translate("price", "gu").await, "[gu] PRICE");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cache_evicts_least_recently_used() {
        let backend = FakeTranslator::new(false);
        let localizer = Localizer::new(Some(backend.clone()), Duration::from_secs(1), 2);
        localizer.translate("a", "hi").await;
        localizer.translate("b", "hi").await;
        // Touch "a" so "b" becomes the eviction candidate.
        localizer.translate("a", "hi").await;
        localizer.translate("c", "hi").await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

        localizer.translate("a", "hi").await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        localizer.translate("b", "hi").await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn slow_backend_passes_text_through() {
        let backend = Arc::new(SlowTranslator);
        let localizer = Localizer::new(Some(backend), Duration::from_millis(20), 8);
        assert_eq!(localizer.translate("Price", "hi").await, "Price");
    }

    #[test]
    fn supported_languages() {
        assert!(is_supported_language("hi"));
        assert!(is_supported_language("gu"));
        assert!(!is_supported_language("xx"));
    }
}

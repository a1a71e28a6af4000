//! Bounded-concurrency image generation fan-out
//!
//! Wraps the image provider with a fixed child-friendly prompt template,
//! a semaphore capping in-flight requests, and a bounded rate-limit retry
//! loop. Failures are isolated per item: one failed generation never
//! aborts the batch, and failed items are dropped from the output rather
//! than kept as placeholders.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::image_client::{ImageError, ImageProvider};

const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(1);

const PROMPT_PREFIX: &str = "Create a cheerful, child-friendly illustration with the following characteristics:\n\
    - Cute and simple cartoon style\n\
    - Vibrant and bright colors\n\
    - Soft edges and rounded shapes\n\
    - Clean and clear composition\n\
    - Safe and appropriate for young children\n\
    - Simple background with minimal details\n\
    - 2D style with minimal shading\n\n\
    The illustration should show:";

const PROMPT_SUFFIX: &str = "Make it simple and easily recognizable for children.";

/// One successfully illustrated input, paired back with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustratedText {
    pub text_pt: String,
    pub text_en: String,
    pub url: String,
}

/// Fan-out caller enforcing a maximum concurrent in-flight request count
pub struct BoundedImageFetcher {
    provider: Arc<dyn ImageProvider>,
    semaphore: Arc<Semaphore>,
    max_attempts: u32,
    base_backoff: Duration,
}

impl BoundedImageFetcher {
    /// Create a fetcher allowing `concurrency` simultaneous provider calls
    /// and at most `max_attempts` tries per item under rate limiting.
    pub fn new(provider: Arc<dyn ImageProvider>, concurrency: usize, max_attempts: u32) -> Self {
        Self::with_backoff(provider, concurrency, max_attempts, DEFAULT_BASE_BACKOFF)
    }

    /// Like [`BoundedImageFetcher::new`] with an explicit base backoff
    pub fn with_backoff(
        provider: Arc<dyn ImageProvider>,
        concurrency: usize,
        max_attempts: u32,
        base_backoff: Duration,
    ) -> Self {
        Self {
            provider,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Apply the fixed style template to a raw prompt
    pub fn format_prompt(prompt: &str) -> String {
        format!("{PROMPT_PREFIX} {prompt}. {PROMPT_SUFFIX}")
    }

    /// Generate one image, returning `None` on any failure.
    ///
    /// The semaphore permit is acquired once and held across retries, so a
    /// rate-limit storm cannot grow the number of in-flight requests. On
    /// `RateLimited` the call backs off (base x 2^(attempt-1)) and retries
    /// up to the attempt bound; every other failure gives up immediately.
    pub async fn fetch_one(&self, prompt: &str) -> Option<String> {
        // Never closed, so acquire can only fail after a drop we don't do
        let _permit = self.semaphore.acquire().await.ok()?;
        let formatted = Self::format_prompt(prompt);

        for attempt in 1..=self.max_attempts {
            match self.provider.generate(&formatted).await {
                Ok(url) => return Some(url),
                Err(ImageError::RateLimited) if attempt < self.max_attempts => {
                    let backoff = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::debug!(
                        prompt = %prompt,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Image provider rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(ImageError::RateLimited) => {
                    tracing::warn!(
                        prompt = %prompt,
                        attempts = self.max_attempts,
                        "Giving up on image after repeated rate limiting"
                    );
                    return None;
                }
                Err(e) => {
                    tracing::error!(prompt = %prompt, error = %e, "Image generation failed");
                    return None;
                }
            }
        }

        None
    }

    /// Generate images for a batch of (source-text, prompt-text) pairs.
    ///
    /// Issues up to the configured number of concurrent provider calls;
    /// additional items queue on the semaphore. Results are paired back
    /// with their originating input by position, and items that produced
    /// no image are dropped from the output.
    pub async fn fetch_batch(&self, items: &[(String, String)]) -> Vec<IllustratedText> {
        let results = join_all(
            items
                .iter()
                .map(|(_, text_en)| self.fetch_one(text_en)),
        )
        .await;

        let illustrated: Vec<IllustratedText> = items
            .iter()
            .zip(results)
            .filter_map(|((text_pt, text_en), url)| {
                url.map(|url| IllustratedText {
                    text_pt: text_pt.clone(),
                    text_en: text_en.clone(),
                    url,
                })
            })
            .collect();

        tracing::info!(
            requested = items.len(),
            generated = illustrated.len(),
            "Image batch complete"
        );

        illustrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    /// Mock provider tracking in-flight concurrency and per-prompt behavior
    struct MockProvider {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicU32,
        rate_limit_first: u32,
        fail_on: Option<&'static str>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicU32::new(0),
                rate_limit_first: 0,
                fail_on: None,
            }
        }

        fn rate_limiting(first_n: u32) -> Self {
            Self {
                rate_limit_first: first_n,
                ..Self::new()
            }
        }

        fn failing_on(text: &'static str) -> Self {
            Self {
                fail_on: Some(text),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl ImageProvider for MockProvider {
        async fn generate(&self, prompt: &str) -> Result<String, ImageError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if call <= self.rate_limit_first {
                return Err(ImageError::RateLimited);
            }

            if let Some(needle) = self.fail_on {
                if prompt.contains(needle) {
                    return Err(ImageError::EmptyResponse);
                }
            }

            Ok(format!("https://img.example/{}", call))
        }
    }

    fn pairs(n: usize) -> Vec<(String, String)> {
        (0..n)
            .map(|i| (format!("pt {}", i), format!("en {}", i)))
            .collect()
    }

    #[test]
    fn prompt_template_wraps_input() {
        let prompt = BoundedImageFetcher::format_prompt("a red cat");
        assert!(prompt.starts_with("Create a cheerful, child-friendly illustration"));
        assert!(prompt.contains("The illustration should show: a red cat."));
        assert!(prompt.ends_with("Make it simple and easily recognizable for children."));
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_cap() {
        let provider = Arc::new(MockProvider::new());
        let fetcher = BoundedImageFetcher::new(provider.clone(), 2, 1);

        let results = fetcher.fetch_batch(&pairs(8)).await;

        assert_eq!(results.len(), 8);
        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn results_pair_back_with_source_text() {
        let provider = Arc::new(MockProvider::new());
        let fetcher = BoundedImageFetcher::new(provider, 3, 1);

        let input = pairs(4);
        let results = fetcher.fetch_batch(&input).await;

        assert_eq!(results.len(), 4);
        for (result, (text_pt, text_en)) in results.iter().zip(&input) {
            assert_eq!(&result.text_pt, text_pt);
            assert_eq!(&result.text_en, text_en);
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let provider = Arc::new(MockProvider::failing_on("en 2"));
        let fetcher = BoundedImageFetcher::new(provider, 3, 1);

        let results = fetcher.fetch_batch(&pairs(5)).await;

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.text_en != "en 2"));
    }

    #[tokio::test]
    async fn rate_limit_retries_are_bounded() {
        let provider = Arc::new(MockProvider::rate_limiting(u32::MAX));
        let fetcher = BoundedImageFetcher::with_backoff(
            provider.clone(),
            1,
            3,
            Duration::from_millis(1),
        );

        let url = fetcher.fetch_one("stormy").await;

        assert!(url.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rate_limited_item_eventually_succeeds() {
        let provider = Arc::new(MockProvider::rate_limiting(2));
        let fetcher = BoundedImageFetcher::with_backoff(
            provider.clone(),
            1,
            3,
            Duration::from_millis(1),
        );

        let url = fetcher.fetch_one("patient").await;

        assert_eq!(url.as_deref(), Some("https://img.example/3"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }
}

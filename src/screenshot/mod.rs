//! Screenshot acquisition chain.
//!
//! An ordered list of rendering providers is tried with bounded retries and
//! exponential backoff until one returns an artifact that passes validation.
//! Chain exhaustion is not an error: the pipeline continues heuristic-only.

mod providers;
mod validation;

pub use providers::HttpScreenshotProvider;
pub use validation::ArtifactValidator;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chain::{run_chain, AttemptResult, ChainSlot, ProviderFailure, RetryPolicy};
use crate::config::ValidationConfig;
use crate::types::{ProviderAttemptRecord, ScreenshotArtifact, ScreenshotRef};

/// Image format requested from rendering providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// Page-ready condition a provider should wait for before capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitCondition {
    Load,
    DomContentLoaded,
    NetworkIdle,
}

impl WaitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitCondition::Load => "load",
            WaitCondition::DomContentLoaded => "domcontentloaded",
            WaitCondition::NetworkIdle => "networkidle",
        }
    }
}

/// Shared capture configuration passed to every provider attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub quality: u8,
    pub full_page: bool,
    pub wait_until: WaitCondition,
    pub block_ads: bool,
    pub block_cookie_banners: bool,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            format: ImageFormat::Png,
            quality: 80,
            full_page: false,
            wait_until: WaitCondition::NetworkIdle,
            block_ads: true,
            block_cookie_banners: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A rendering service that can capture a page.
pub trait ScreenshotProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Attempts this provider will receive before the chain moves on.
    fn max_retries(&self) -> u32 {
        2
    }

    fn render<'a>(
        &'a self,
        url: &'a str,
        config: &'a CaptureConfig,
    ) -> BoxFuture<'a, AttemptResult<ScreenshotRef>>;
}

/// Drives the ordered provider list to the first validated artifact.
pub struct ScreenshotChain {
    providers: Vec<Box<dyn ScreenshotProvider>>,
    policy: RetryPolicy,
    validation: ValidationConfig,
    validator: ArtifactValidator,
    call_timeout: Duration,
}

impl ScreenshotChain {
    pub fn new(
        providers: Vec<Box<dyn ScreenshotProvider>>,
        policy: RetryPolicy,
        validation: ValidationConfig,
        validator: ArtifactValidator,
        call_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            policy,
            validation,
            validator,
            call_timeout,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Tries every provider in order. Returns the first accepted artifact
    /// (or None when the chain is exhausted) plus the full attempt trail.
    pub async fn acquire(
        &self,
        url: &str,
        capture: &CaptureConfig,
        cancel: &CancellationToken,
    ) -> (Option<ScreenshotArtifact>, Vec<ProviderAttemptRecord>) {
        if self.providers.is_empty() {
            return (None, Vec::new());
        }

        let slots: Vec<ChainSlot> = self
            .providers
            .iter()
            .map(|p| ChainSlot {
                name: p.name().to_string(),
                max_retries: p.max_retries(),
            })
            .collect();

        let outcome = run_chain(&slots, &self.policy, cancel, move |index, attempt_index| {
            let provider = &self.providers[index];
            async move {
                let reference = match tokio::time::timeout(
                    self.call_timeout,
                    provider.render(url, capture),
                )
                .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(ProviderFailure::failed(format!(
                            "render timed out after {:?}",
                            self.call_timeout
                        )))
                    }
                };

                let validation = self.validator.validate(&reference, &self.validation).await;
                if !validation.is_valid || validation.score < self.validation.min_score {
                    return Err(ProviderFailure::invalid(validation.reasons));
                }

                Ok(ScreenshotArtifact {
                    reference,
                    provider: provider.name().to_string(),
                    attempt_index,
                    validation,
                })
            }
        })
        .await;

        if let Some(artifact) = &outcome.value {
            info!(
                provider = %artifact.provider,
                score = artifact.validation.score,
                "screenshot accepted"
            );
        } else {
            info!("screenshot chain exhausted, continuing heuristic-only");
        }

        (outcome.value, outcome.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttemptOutcome;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct ScriptedProvider {
        name: String,
        retries: u32,
        calls: Arc<AtomicU32>,
        result: fn() -> AttemptResult<ScreenshotRef>,
    }

    impl ScreenshotProvider for ScriptedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn max_retries(&self) -> u32 {
            self.retries
        }

        fn render<'a>(
            &'a self,
            _url: &'a str,
            _config: &'a CaptureConfig,
        ) -> BoxFuture<'a, AttemptResult<ScreenshotRef>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = (self.result)();
            Box::pin(async move { result })
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            provider_cooldown: Duration::from_millis(1),
        }
    }

    fn png_bytes() -> ScreenshotRef {
        // Valid PNG magic followed by padding past the small-capture penalty.
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.resize(20 * 1024, 0);
        ScreenshotRef::Bytes {
            data,
            content_type: Some("image/png".into()),
        }
    }

    fn chain(providers: Vec<Box<dyn ScreenshotProvider>>) -> ScreenshotChain {
        ScreenshotChain::new(
            providers,
            fast_policy(),
            ValidationConfig::default(),
            ArtifactValidator::new(Duration::from_secs(1)).unwrap(),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn failing_provider_exhausts_then_next_succeeds() {
        let fail_calls = Arc::new(AtomicU32::new(0));
        let ok_calls = Arc::new(AtomicU32::new(0));
        let chain = chain(vec![
            Box::new(ScriptedProvider {
                name: "flaky".into(),
                retries: 3,
                calls: fail_calls.clone(),
                result: || Err(ProviderFailure::failed("service down")),
            }),
            Box::new(ScriptedProvider {
                name: "steady".into(),
                retries: 2,
                calls: ok_calls.clone(),
                result: || Ok(png_bytes()),
            }),
        ]);

        let cancel = CancellationToken::new();
        let (artifact, attempts) = chain
            .acquire("https://example.com", &CaptureConfig::default(), &cancel)
            .await;

        let artifact = artifact.expect("second provider should succeed");
        assert_eq!(artifact.provider, "steady");
        assert!(artifact.validation.is_valid);
        assert_eq!(fail_calls.load(Ordering::SeqCst), 3);
        assert_eq!(ok_calls.load(Ordering::SeqCst), 1);
        assert_eq!(attempts.len(), 4);
        assert_eq!(attempts[3].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn invalid_artifacts_are_recorded_as_invalid() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = chain(vec![Box::new(ScriptedProvider {
            name: "blank-shots".into(),
            retries: 2,
            calls: calls.clone(),
            result: || {
                // Valid PNG magic but under the small-capture threshold.
                Ok(ScreenshotRef::Bytes {
                    data: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
                    content_type: Some("image/png".into()),
                })
            },
        })]);

        let cancel = CancellationToken::new();
        let (artifact, attempts) = chain
            .acquire("https://example.com", &CaptureConfig::default(), &cancel)
            .await;

        assert!(artifact.is_none());
        assert_eq!(attempts.len(), 2);
        assert!(attempts
            .iter()
            .all(|r| r.outcome == AttemptOutcome::Invalid));
    }

    #[tokio::test]
    async fn empty_chain_yields_no_artifact() {
        let chain = chain(Vec::new());
        let cancel = CancellationToken::new();
        let (artifact, attempts) = chain
            .acquire("https://example.com", &CaptureConfig::default(), &cancel)
            .await;
        assert!(artifact.is_none());
        assert!(attempts.is_empty());
    }
}

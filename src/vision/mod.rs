//! Vision inference chain.
//!
//! A validated screenshot is submitted to an ordered list of vision-capable
//! inference providers. Each completion passes through strict sanitization
//! before its profile fragment can reach fusion. Any failure advances the
//! chain; full exhaustion (or no screenshot) yields an absent vision profile.

mod providers;
mod schema;

pub use providers::HttpVisionProvider;
pub use schema::{
    extract_json_object, sanitize_fragment, RawVisionFragment, VisionProfile,
    VISION_DEFAULT_FONT, VISION_FALLBACK_ACCENT, VISION_FALLBACK_PRIMARY,
    VISION_FALLBACK_SECONDARY,
};

use futures::future::BoxFuture;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chain::{run_chain, AttemptResult, ChainSlot, ProviderFailure, RetryPolicy};
use crate::types::{ProviderAttemptRecord, ScreenshotArtifact};

/// Instructions sent with the screenshot to every vision provider.
pub const BRAND_ANALYSIS_INSTRUCTIONS: &str = "\
Analyze this website screenshot and describe the brand identity. Respond \
with a single JSON object and nothing else, using this exact shape: \
{\"name\": string, \"primaryColor\": \"#RRGGBB\", \"secondaryColor\": \
\"#RRGGBB\", \"accentColor\": \"#RRGGBB\", \"fontFamily\": string, \
\"logoUrl\": string or null, \"personality\": {\"primaryTrait\": string, \
\"secondaryTraits\": [string], \"industry\": string, \"designApproach\": \
string}, \"confidence\": {\"name\": 0-1, \"colors\": 0-1, \"typography\": \
0-1, \"logo\": 0-1, \"personality\": 0-1, \"overall\": 0-1}}. Colors must \
be six-digit hex. Confidence values reflect how certain you are about each \
attribute.";

/// An inference service that can analyze a screenshot.
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    fn max_retries(&self) -> u32 {
        1
    }

    /// Returns the raw completion text, expected to contain the JSON
    /// fragment described by the instructions.
    fn infer<'a>(
        &'a self,
        artifact: &'a ScreenshotArtifact,
        instructions: &'a str,
    ) -> BoxFuture<'a, AttemptResult<String>>;
}

/// Drives the ordered provider list to the first sanitized profile.
pub struct VisionChain {
    providers: Vec<Box<dyn VisionProvider>>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl VisionChain {
    pub fn new(
        providers: Vec<Box<dyn VisionProvider>>,
        policy: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            policy,
            call_timeout,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Submits the artifact provider by provider until one returns a
    /// completion that parses. Returns the sanitized profile (or None) and
    /// the attempt trail.
    pub async fn infer(
        &self,
        artifact: &ScreenshotArtifact,
        cancel: &CancellationToken,
    ) -> (Option<VisionProfile>, Vec<ProviderAttemptRecord>) {
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

        let outcome = run_chain(&slots, &self.policy, cancel, move |index, _attempt| {
            let provider = &self.providers[index];
            async move {
                let completion = match tokio::time::timeout(
                    self.call_timeout,
                    provider.infer(artifact, BRAND_ANALYSIS_INSTRUCTIONS),
                )
                .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(ProviderFailure::failed(format!(
                            "inference timed out after {:?}",
                            self.call_timeout
                        )))
                    }
                };

                let json = extract_json_object(&completion).ok_or_else(|| {
                    ProviderFailure::failed("completion contained no JSON object")
                })?;
                let fragment: RawVisionFragment = serde_json::from_str(json)
                    .map_err(|e| ProviderFailure::failed(format!("fragment parse failed: {e}")))?;

                Ok(sanitize_fragment(fragment))
            }
        })
        .await;

        if outcome.value.is_some() {
            info!("vision inference produced a profile fragment");
        } else {
            info!("vision chain exhausted, fusing heuristic-only");
        }

        (outcome.value, outcome.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttemptOutcome, ScreenshotRef, ScreenshotValidation};

    struct ScriptedVision {
        name: String,
        completion: Result<String, String>,
    }

    impl VisionProvider for ScriptedVision {
        fn name(&self) -> &str {
            &self.name
        }

        fn infer<'a>(
            &'a self,
            _artifact: &'a ScreenshotArtifact,
            _instructions: &'a str,
        ) -> BoxFuture<'a, AttemptResult<String>> {
            let result = self
                .completion
                .clone()
                .map_err(ProviderFailure::failed);
            Box::pin(async move { result })
        }
    }

    fn artifact() -> ScreenshotArtifact {
        ScreenshotArtifact {
            reference: ScreenshotRef::Url("https://cdn.example.com/shot.png".into()),
            provider: "render-api".into(),
            attempt_index: 0,
            validation: ScreenshotValidation {
                is_valid: true,
                score: 70.0,
                reasons: Vec::new(),
            },
        }
    }

    fn chain(providers: Vec<Box<dyn VisionProvider>>) -> VisionChain {
        VisionChain::new(
            providers,
            RetryPolicy {
                base_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(2),
                provider_cooldown: std::time::Duration::from_millis(1),
            },
            Duration::from_secs(2),
        )
    }

    fn good_completion() -> String {
        r##"Here is the analysis:
{"name": "Acme", "primaryColor": "#1A2B3C", "secondaryColor": "#E8F0FA",
 "accentColor": "#3CB371", "fontFamily": "Inter, sans-serif",
 "logoUrl": "https://acme.example.com/logo.svg",
 "personality": {"primaryTrait": "professional", "secondaryTraits": ["minimal"],
                 "industry": "technology", "designApproach": "modern"},
 "confidence": {"name": 0.9, "colors": 0.8, "typography": 0.7,
                "logo": 0.6, "personality": 0.7, "overall": 0.74}}"##
            .to_string()
    }

    #[tokio::test]
    async fn malformed_json_falls_through_to_next_provider() {
        let chain = chain(vec![
            Box::new(ScriptedVision {
                name: "garbled".into(),
                completion: Ok("I could not produce JSON, sorry.".into()),
            }),
            Box::new(ScriptedVision {
                name: "solid".into(),
                completion: Ok(good_completion()),
            }),
        ]);

        let cancel = CancellationToken::new();
        let (profile, attempts) = chain.infer(&artifact(), &cancel).await;

        let profile = profile.expect("second provider should parse");
        assert_eq!(profile.name, "Acme");
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].outcome, AttemptOutcome::Failure);
        assert!(attempts[0]
            .error_reason
            .as_deref()
            .unwrap()
            .contains("no JSON object"));
        assert_eq!(attempts[1].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn http_failure_falls_through_to_next_provider() {
        let chain = chain(vec![
            Box::new(ScriptedVision {
                name: "down".into(),
                completion: Err("status 503".into()),
            }),
            Box::new(ScriptedVision {
                name: "up".into(),
                completion: Ok(good_completion()),
            }),
        ]);

        let cancel = CancellationToken::new();
        let (profile, attempts) = chain.infer(&artifact(), &cancel).await;
        assert!(profile.is_some());
        assert_eq!(attempts[0].provider, "down");
        assert_eq!(attempts[1].provider, "up");
    }

    #[tokio::test]
    async fn exhausted_chain_yields_absent_profile() {
        let chain = chain(vec![Box::new(ScriptedVision {
            name: "hopeless".into(),
            completion: Ok("not json at all".into()),
        })]);

        let cancel = CancellationToken::new();
        let (profile, attempts) = chain.infer(&artifact(), &cancel).await;
        assert!(profile.is_none());
        assert_eq!(attempts.len(), 1);
    }
}

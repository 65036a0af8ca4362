//! Pipeline orchestration.
//!
//! Fetch -> {heuristics in parallel with screenshot -> vision} -> fusion.
//! Only the fetch stage can fail the whole request; every provider problem
//! downstream degrades into lower confidence instead.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{BexError, Result};
use crate::fetch::{DocumentSource, HttpDocumentFetcher};
use crate::fusion::fuse;
use crate::heuristics;
use crate::screenshot::{
    ArtifactValidator, HttpScreenshotProvider, ScreenshotChain, ScreenshotProvider,
};
use crate::types::{BrandProfile, ProviderAttemptRecord};
use crate::vision::{HttpVisionProvider, VisionChain, VisionProvider};

/// Result of one extraction request.
#[derive(Debug)]
pub struct Extraction {
    pub profile: BrandProfile,
    /// Diagnostic trail of every screenshot/vision provider attempt.
    pub attempts: Vec<ProviderAttemptRecord>,
    pub elapsed: Duration,
}

/// The brand extraction pipeline. Construction wires up the document
/// fetcher and both provider chains; nothing outlives a single
/// `extract_brand_profile` call.
pub struct BrandExtractor {
    config: Config,
    fetcher: Box<dyn DocumentSource>,
    screenshots: ScreenshotChain,
    vision: VisionChain,
}

impl BrandExtractor {
    /// Builds the pipeline with HTTP providers from the config's lists.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let fetcher: Box<dyn DocumentSource> =
            Box::new(HttpDocumentFetcher::new(config.timeouts.fetch)?);

        let screenshot_providers = config
            .screenshot_providers
            .iter()
            .map(|settings| {
                HttpScreenshotProvider::from_settings(settings, config.timeouts.provider)
                    .map(|p| Box::new(p) as Box<dyn ScreenshotProvider>)
            })
            .collect::<Result<Vec<_>>>()?;

        let vision_providers = config
            .vision_providers
            .iter()
            .map(|settings| {
                HttpVisionProvider::from_settings(settings, config.timeouts.provider)
                    .map(|p| Box::new(p) as Box<dyn VisionProvider>)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::assemble(config, fetcher, screenshot_providers, vision_providers)
    }

    /// Builds the pipeline with injected sources. The seam used by tests
    /// and by callers bringing their own provider implementations.
    pub fn with_sources(
        config: Config,
        fetcher: Box<dyn DocumentSource>,
        screenshot_providers: Vec<Box<dyn ScreenshotProvider>>,
        vision_providers: Vec<Box<dyn VisionProvider>>,
    ) -> Result<Self> {
        config.validate()?;
        Self::assemble(config, fetcher, screenshot_providers, vision_providers)
    }

    fn assemble(
        config: Config,
        fetcher: Box<dyn DocumentSource>,
        screenshot_providers: Vec<Box<dyn ScreenshotProvider>>,
        vision_providers: Vec<Box<dyn VisionProvider>>,
    ) -> Result<Self> {
        let validator = ArtifactValidator::new(config.timeouts.validation)?;
        let screenshots = ScreenshotChain::new(
            screenshot_providers,
            config.retry.clone(),
            config.validation.clone(),
            validator,
            config.timeouts.provider,
        );
        let vision = VisionChain::new(
            vision_providers,
            config.retry.clone(),
            config.timeouts.provider,
        );

        Ok(Self {
            config,
            fetcher,
            screenshots,
            vision,
        })
    }

    /// Derives a brand profile for `url`. Never fails past the fetch stage:
    /// exhausted provider chains only lower the resulting confidence.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract_brand_profile(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Extraction> {
        let start = Instant::now();

        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BexError::Config(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let document = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(BexError::fetch(url, None, "extraction cancelled"))
            }
            result = self.fetcher.fetch(&parsed) => result?,
        };
        info!(html_len = document.html.len(), "document fetched");

        let capture = self.config.effective_capture();

        // The heuristic branch is network-free; it runs alongside the
        // screenshot/vision branch and both must settle before fusion.
        let heuristic_branch = async { heuristics::extract_profile(&document) };
        let visual_branch = async {
            let (artifact, mut records) = self.screenshots.acquire(url, &capture, cancel).await;
            match artifact {
                Some(artifact) => {
                    let (profile, vision_records) = self.vision.infer(&artifact, cancel).await;
                    records.extend(vision_records);
                    (profile, records)
                }
                None => (None, records),
            }
        };

        let (heuristic, (vision, attempts)) = tokio::join!(heuristic_branch, visual_branch);

        let profile = fuse(&heuristic, vision.as_ref(), &self.config.fusion);
        let elapsed = start.elapsed();
        info!(
            overall = profile.confidence.overall,
            attempts = attempts.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "extraction complete"
        );

        Ok(Extraction {
            profile,
            attempts,
            elapsed,
        })
    }
}

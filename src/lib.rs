//! Brand Extractor (bex) Library
//!
//! A pipeline that derives a structured brand identity profile from a
//! website URL: name, primary/secondary/accent colors, typeface, logo
//! reference, personality descriptor, and per-attribute confidence. The
//! pipeline orchestrates unreliable external stages (document retrieval,
//! screenshot rendering, vision inference) with bounded retry/backoff and
//! fuses their results into one answer that is never empty.
//!
//! # Module Overview
//!
//! - [`fetch`] - Document retrieval (page markup + stylesheets)
//! - [`heuristics`] - Pure markup/CSS parsing into brand attributes
//! - [`color`] - Color filtering, ranking, and triad harmonization
//! - [`screenshot`] - Screenshot provider chain with validation
//! - [`vision`] - Vision inference chain with strict sanitization
//! - [`fusion`] - Confidence-weighted merge of both branches
//! - [`chain`] - Generic provider chain-runner (retry/backoff)
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types and structures
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use bex_lib::{BrandExtractor, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> bex_lib::Result<()> {
//! let extractor = BrandExtractor::new(Config::default())?;
//! let cancel = CancellationToken::new();
//! let extraction = extractor
//!     .extract_brand_profile("https://example.com", &cancel)
//!     .await?;
//! println!("{} uses {}", extraction.profile.name, extraction.profile.primary_color);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod color;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fusion;
pub mod heuristics;
pub mod output;
pub mod personality;
pub mod pipeline;
pub mod screenshot;
pub mod types;
pub mod viewport;
pub mod vision;

pub use chain::{backoff_delay, run_chain, AttemptResult, ChainSlot, ProviderFailure, RetryPolicy};
pub use color::{harmonize_colors, hex_to_hsl, hsl_to_hex, is_valid_hex, ColorTriad};
pub use config::{
    Config, FusionWeights, ResponseMode, ScreenshotProviderSettings, Timeouts, ValidationConfig,
    VisionProviderSettings,
};
pub use error::{BexError, ErrorCategory, ErrorPayload, Result};
pub use fetch::{DocumentSource, HttpDocumentFetcher};
pub use fusion::fuse;
pub use heuristics::{extract_profile, HeuristicProfile};
pub use output::{BexOutput, ErrorOutput, ExtractOutput, BEX_OUTPUT_VERSION};
pub use personality::{
    derive_personality, BrandTrait, DesignApproach, IndustryContext, PersonalityDescriptor,
    StructuralSignals,
};
pub use pipeline::{BrandExtractor, Extraction};
pub use screenshot::{
    ArtifactValidator, CaptureConfig, HttpScreenshotProvider, ImageFormat, ScreenshotChain,
    ScreenshotProvider, WaitCondition,
};
pub use types::{
    AttemptOutcome, BrandProfile, CapturedDocument, ColorCandidate, ColorSource, ConfidenceScores,
    HslColor, ProviderAttemptRecord, ScreenshotArtifact, ScreenshotRef, ScreenshotValidation,
    PLACEHOLDER_NAME,
};
pub use viewport::Viewport;
pub use vision::{
    HttpVisionProvider, VisionChain, VisionProfile, VisionProvider, BRAND_ANALYSIS_INSTRUCTIONS,
};

//! Core data types shared across the extraction pipeline.

mod core;
mod profile;

pub use self::core::{
    AttemptOutcome, CapturedDocument, ColorCandidate, ColorSource, HslColor,
    ProviderAttemptRecord, ScreenshotArtifact, ScreenshotRef, ScreenshotValidation,
};
pub use self::profile::{BrandProfile, ConfidenceScores, PLACEHOLDER_NAME};
pub(crate) use self::profile::round2;

pub use crate::viewport::Viewport;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// A fetched page: raw markup plus collected stylesheet text.
///
/// Created once per extraction request and discarded after parsing.
#[derive(Debug, Clone)]
pub struct CapturedDocument {
    pub url: Url,
    pub html: String,
    pub stylesheet_text: String,
    pub fetched_at: DateTime<Utc>,
}

/// HSL representation of a color. Hue in degrees, saturation and
/// lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Where a color candidate was found in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSource {
    CssLiteral,
    CssVariable,
    InlineStyle,
    BrandElement,
    Svg,
    Gradient,
    CssInJs,
}

/// A deduplicated color observation with its occurrence count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCandidate {
    pub hex: String,
    pub hsl: HslColor,
    pub frequency: u32,
    pub source: ColorSource,
}

/// Reference to a captured screenshot: a hosted URL or raw bytes.
#[derive(Debug, Clone)]
pub enum ScreenshotRef {
    Url(String),
    Bytes {
        data: Vec<u8>,
        content_type: Option<String>,
    },
}

impl ScreenshotRef {
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            ScreenshotRef::Url(_) => None,
            ScreenshotRef::Bytes { data, .. } => Some(data.len()),
        }
    }
}

/// Outcome of validating a screenshot reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotValidation {
    pub is_valid: bool,
    pub score: f32,
    pub reasons: Vec<String>,
}

/// A validated screenshot produced by one provider attempt.
#[derive(Debug, Clone)]
pub struct ScreenshotArtifact {
    pub reference: ScreenshotRef,
    pub provider: String,
    pub attempt_index: u32,
    pub validation: ScreenshotValidation,
}

/// How a single provider attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success,
    Failure,
    Invalid,
}

/// Diagnostic record for one provider attempt. The full trail is returned
/// alongside the profile for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAttemptRecord {
    pub provider: String,
    pub attempt_index: u32,
    pub outcome: AttemptOutcome,
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

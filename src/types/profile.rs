use serde::{Deserialize, Serialize};

use crate::personality::PersonalityDescriptor;

/// Brand name used when no acceptable candidate exists on either side.
pub const PLACEHOLDER_NAME: &str = "Unknown Brand";

/// Per-attribute reliability estimates, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceScores {
    pub name: f32,
    pub colors: f32,
    pub typography: f32,
    pub logo: f32,
    pub personality: f32,
    pub overall: f32,
}

impl ConfidenceScores {
    /// Clamps every sub-score into `[0, 1]` and recomputes `overall` as the
    /// mean of the five sub-scores, rounded to two decimals.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.clamp(0.0, 1.0);
        self.colors = self.colors.clamp(0.0, 1.0);
        self.typography = self.typography.clamp(0.0, 1.0);
        self.logo = self.logo.clamp(0.0, 1.0);
        self.personality = self.personality.clamp(0.0, 1.0);
        self.overall = round2(
            (self.name + self.colors + self.typography + self.logo + self.personality) / 5.0,
        );
        self
    }
}

pub(crate) fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// The structured brand identity derived for a website. The sole durable
/// output of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub personality: PersonalityDescriptor,
    pub confidence: ConfidenceScores,
}

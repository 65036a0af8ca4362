//! Strict validation and sanitization of vision-provider responses.
//!
//! Provider completions are untrusted text. The raw fragment is parsed with
//! every field optional, then normalized field by field: anything outside
//! bounds is replaced with a fixed fallback rather than propagated.

use serde::Deserialize;
use url::Url;

use crate::color::normalize_hex;
use crate::personality::{BrandTrait, DesignApproach, IndustryContext, PersonalityDescriptor};
use crate::types::{round2, ConfidenceScores, PLACEHOLDER_NAME};

/// Fallback constants substituted for out-of-schema vision values.
pub const VISION_FALLBACK_PRIMARY: &str = "#2563EB";
pub const VISION_FALLBACK_SECONDARY: &str = "#F3F4F6";
pub const VISION_FALLBACK_ACCENT: &str = "#F59E0B";
pub const VISION_DEFAULT_FONT: &str = "Helvetica, Arial, sans-serif";

const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Loosely-typed fragment as deserialized straight from provider JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawVisionFragment {
    pub name: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub font_family: Option<String>,
    pub logo_url: Option<String>,
    pub personality: Option<RawPersonality>,
    pub confidence: Option<RawConfidence>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPersonality {
    pub primary_trait: Option<String>,
    pub secondary_traits: Option<Vec<String>>,
    pub industry: Option<String>,
    pub design_approach: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawConfidence {
    pub name: Option<f64>,
    pub colors: Option<f64>,
    pub typography: Option<f64>,
    pub logo: Option<f64>,
    pub personality: Option<f64>,
    pub overall: Option<f64>,
}

/// Typed, sanitized brand-profile fragment from one vision provider.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionProfile {
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub logo_url: Option<String>,
    pub personality: Option<PersonalityDescriptor>,
    pub confidence: ConfidenceScores,
}

/// Extracts the first balanced JSON object from free-form completion text.
/// Brace matching skips string literals so embedded `{`/`}` do not confuse it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Converts a raw fragment into a typed profile, replacing every
/// out-of-bounds value with its fallback.
pub fn sanitize_fragment(fragment: RawVisionFragment) -> VisionProfile {
    let name = fragment
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() < 100)
        .map(str::to_owned)
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

    let primary_color = sanitize_color(fragment.primary_color.as_deref(), VISION_FALLBACK_PRIMARY);
    let secondary_color =
        sanitize_color(fragment.secondary_color.as_deref(), VISION_FALLBACK_SECONDARY);
    let accent_color = sanitize_color(fragment.accent_color.as_deref(), VISION_FALLBACK_ACCENT);

    let font_family = fragment
        .font_family
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() < 50)
        .map(str::to_owned)
        .unwrap_or_else(|| VISION_DEFAULT_FONT.to_string());

    let logo_url = fragment
        .logo_url
        .as_deref()
        .and_then(|raw| Url::parse(raw).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string());

    let personality = fragment.personality.and_then(sanitize_personality);
    let confidence = sanitize_confidence(fragment.confidence.unwrap_or_default());

    VisionProfile {
        name,
        primary_color,
        secondary_color,
        accent_color,
        font_family,
        logo_url,
        personality,
        confidence,
    }
}

fn sanitize_color(raw: Option<&str>, fallback: &str) -> String {
    raw.and_then(normalize_hex)
        .unwrap_or_else(|| fallback.to_string())
}

/// A descriptor is only kept when the primary trait maps onto the taxonomy;
/// unknown secondary values are dropped, missing parts get defaults.
fn sanitize_personality(raw: RawPersonality) -> Option<PersonalityDescriptor> {
    let primary_trait = raw.primary_trait.as_deref().and_then(BrandTrait::parse)?;

    let secondary_traits = raw
        .secondary_traits
        .unwrap_or_default()
        .iter()
        .filter_map(|s| BrandTrait::parse(s))
        .collect();

    let industry = raw
        .industry
        .as_deref()
        .and_then(IndustryContext::parse)
        .unwrap_or(IndustryContext::General);
    let design_approach = raw
        .design_approach
        .as_deref()
        .and_then(DesignApproach::parse)
        .unwrap_or(DesignApproach::Modern);

    Some(
        PersonalityDescriptor {
            primary_trait,
            secondary_traits,
            industry,
            design_approach,
        }
        .normalized(),
    )
}

fn sanitize_confidence(raw: RawConfidence) -> ConfidenceScores {
    let sub = |v: Option<f64>| match v {
        Some(v) if (0.0..=1.0).contains(&v) => v as f32,
        _ => NEUTRAL_CONFIDENCE as f32,
    };

    let name = sub(raw.name);
    let colors = sub(raw.colors);
    let typography = sub(raw.typography);
    let logo = sub(raw.logo);
    let personality = sub(raw.personality);

    // A provided overall is kept only when in range; otherwise it is
    // recomputed as the mean of the five sub-scores.
    let overall = match raw.overall {
        Some(v) if (0.0..=1.0).contains(&v) => round2(v as f32),
        _ => round2((name + colors + typography + logo + personality) / 5.0),
    };

    ConfidenceScores {
        name,
        colors,
        typography,
        logo,
        personality,
        overall,
    }
}

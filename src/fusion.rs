//! Result fusion.
//!
//! Merges the always-present heuristic profile with the optional vision
//! profile into the final brand profile. Per-attribute precedence rules
//! favor whichever source is more trustworthy for that attribute; confidence
//! sub-scores are combined with configurable vision/heuristic weights.

use crate::color::{DEFAULT_ACCENT, DEFAULT_PRIMARY, DEFAULT_SECONDARY};
use crate::config::FusionWeights;
use crate::heuristics::HeuristicProfile;
use crate::types::{BrandProfile, ConfidenceScores, PLACEHOLDER_NAME};
use crate::vision::{
    VisionProfile, VISION_DEFAULT_FONT, VISION_FALLBACK_ACCENT, VISION_FALLBACK_PRIMARY,
    VISION_FALLBACK_SECONDARY,
};

/// Colors that carry no brand information: pure black/white plus both
/// sources' fallback constants. Fusion never emits one of these while a
/// non-generic candidate exists on either side.
const GENERIC_COLORS: [&str; 8] = [
    "#000000",
    "#FFFFFF",
    DEFAULT_PRIMARY,
    DEFAULT_SECONDARY,
    DEFAULT_ACCENT,
    VISION_FALLBACK_PRIMARY,
    VISION_FALLBACK_SECONDARY,
    VISION_FALLBACK_ACCENT,
];

fn is_generic(hex: &str) -> bool {
    GENERIC_COLORS.iter().any(|g| g.eq_ignore_ascii_case(hex))
}

fn pick_color(vision: Option<&str>, heuristic: &str, slot_default: &str) -> String {
    match vision {
        Some(v) if !is_generic(v) => v.to_string(),
        Some(v) => {
            if !is_generic(heuristic) {
                heuristic.to_string()
            } else {
                v.to_string()
            }
        }
        None => {
            if !is_generic(heuristic) {
                heuristic.to_string()
            } else {
                slot_default.to_string()
            }
        }
    }
}

fn fuse_confidence(
    heuristic: &ConfidenceScores,
    vision: &ConfidenceScores,
    weights: &FusionWeights,
) -> ConfidenceScores {
    let wv = weights.vision_weight;
    let wh = weights.heuristic_weight;
    ConfidenceScores {
        name: wv * vision.name + wh * heuristic.name,
        colors: wv * vision.colors + wh * heuristic.colors,
        typography: wv * vision.typography + wh * heuristic.typography,
        logo: wv * vision.logo + wh * heuristic.logo,
        personality: wv * vision.personality + wh * heuristic.personality,
        overall: 0.0,
    }
    .normalized()
}

/// Merges both sources into the final profile. With vision absent the
/// heuristic profile is returned verbatim, carrying its own lower
/// confidence scores.
pub fn fuse(
    heuristic: &HeuristicProfile,
    vision: Option<&VisionProfile>,
    weights: &FusionWeights,
) -> BrandProfile {
    let name = match vision {
        Some(v) if v.name != PLACEHOLDER_NAME && v.name.len() > 1 => v.name.clone(),
        _ if heuristic.name != PLACEHOLDER_NAME => heuristic.name.clone(),
        _ => PLACEHOLDER_NAME.to_string(),
    };

    let primary_color = pick_color(
        vision.map(|v| v.primary_color.as_str()),
        &heuristic.triad.primary,
        DEFAULT_PRIMARY,
    );
    let secondary_color = pick_color(
        vision.map(|v| v.secondary_color.as_str()),
        &heuristic.triad.secondary,
        DEFAULT_SECONDARY,
    );
    let accent_color = pick_color(
        vision.map(|v| v.accent_color.as_str()),
        &heuristic.triad.accent,
        DEFAULT_ACCENT,
    );

    let font_family = match vision {
        Some(v) if v.font_family != VISION_DEFAULT_FONT => v.font_family.clone(),
        _ => heuristic
            .font_family
            .clone()
            .unwrap_or_else(|| VISION_DEFAULT_FONT.to_string()),
    };

    // Literal attribute extraction beats visual inference for the logo.
    let logo_url = heuristic
        .logo_url
        .clone()
        .or_else(|| vision.and_then(|v| v.logo_url.clone()));

    let personality = vision
        .and_then(|v| v.personality.clone())
        .unwrap_or_else(|| heuristic.personality.clone());

    let confidence = match vision {
        Some(v) => fuse_confidence(&heuristic.confidence, &v.confidence, weights),
        None => heuristic.confidence,
    };

    BrandProfile {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTriad;
    use crate::heuristics::NameSource;
    use crate::personality::{BrandTrait, PersonalityDescriptor, StructuralSignals};

    fn heuristic() -> HeuristicProfile {
        HeuristicProfile {
            name: "Acme".into(),
            name_source: NameSource::Title,
            logo_url: Some("https://acme.example.com/logo.svg".into()),
            font_family: Some("Inter, sans-serif".into()),
            candidates: Vec::new(),
            triad: ColorTriad {
                primary: "#1A2B3C".into(),
                secondary: "#D7E3EE".into(),
                accent: "#3C6E1A".into(),
            },
            signals: StructuralSignals::default(),
            personality: PersonalityDescriptor::default(),
            confidence: ConfidenceScores {
                name: 0.55,
                colors: 0.4,
                typography: 0.45,
                logo: 0.5,
                personality: 0.3,
                overall: 0.44,
            },
        }
    }

    fn vision() -> VisionProfile {
        VisionProfile {
            name: "Acme Corporation".into(),
            primary_color: "#C0392B".into(),
            secondary_color: "#FDF2F0".into(),
            accent_color: "#2980B9".into(),
            font_family: "Futura, sans-serif".into(),
            logo_url: Some("https://cdn.example.com/seen-logo.png".into()),
            personality: Some(PersonalityDescriptor {
                primary_trait: BrandTrait::Bold,
                secondary_traits: vec![BrandTrait::Creative],
                ..PersonalityDescriptor::default()
            }),
            confidence: ConfidenceScores {
                name: 0.9,
                colors: 0.8,
                typography: 0.7,
                logo: 0.6,
                personality: 0.7,
                overall: 0.74,
            },
        }
    }

    #[test]
    fn vision_wins_each_attribute_when_non_generic() {
        let fused = fuse(&heuristic(), Some(&vision()), &FusionWeights::default());
        assert_eq!(fused.name, "Acme Corporation");
        assert_eq!(fused.primary_color, "#C0392B");
        assert_eq!(fused.font_family, "Futura, sans-serif");
        assert_eq!(fused.personality.primary_trait, BrandTrait::Bold);
    }

    #[test]
    fn non_generic_vision_color_beats_generic_heuristic() {
        let mut h = heuristic();
        h.triad.primary = DEFAULT_PRIMARY.into();
        let fused = fuse(&h, Some(&vision()), &FusionWeights::default());
        assert_eq!(fused.primary_color, "#C0392B");
    }

    #[test]
    fn generic_vision_color_falls_back_to_heuristic() {
        let mut v = vision();
        v.primary_color = "#000000".into();
        let fused = fuse(&heuristic(), Some(&v), &FusionWeights::default());
        assert_eq!(fused.primary_color, "#1A2B3C");
    }

    #[test]
    fn both_generic_keeps_vision_raw_value() {
        let mut h = heuristic();
        h.triad.primary = DEFAULT_PRIMARY.into();
        let mut v = vision();
        v.primary_color = "#FFFFFF".into();
        let fused = fuse(&h, Some(&v), &FusionWeights::default());
        assert_eq!(fused.primary_color, "#FFFFFF");
    }

    #[test]
    fn placeholder_vision_name_falls_back_to_heuristic() {
        let mut v = vision();
        v.name = PLACEHOLDER_NAME.into();
        let fused = fuse(&heuristic(), Some(&v), &FusionWeights::default());
        assert_eq!(fused.name, "Acme");
    }

    #[test]
    fn default_vision_font_falls_back_to_heuristic() {
        let mut v = vision();
        v.font_family = VISION_DEFAULT_FONT.into();
        let fused = fuse(&heuristic(), Some(&v), &FusionWeights::default());
        assert_eq!(fused.font_family, "Inter, sans-serif");
    }

    #[test]
    fn heuristic_logo_preferred_over_vision() {
        let fused = fuse(&heuristic(), Some(&vision()), &FusionWeights::default());
        assert_eq!(
            fused.logo_url.as_deref(),
            Some("https://acme.example.com/logo.svg")
        );

        let mut h = heuristic();
        h.logo_url = None;
        let fused = fuse(&h, Some(&vision()), &FusionWeights::default());
        assert_eq!(
            fused.logo_url.as_deref(),
            Some("https://cdn.example.com/seen-logo.png")
        );
    }

    #[test]
    fn confidence_weighted_seventy_thirty() {
        let fused = fuse(&heuristic(), Some(&vision()), &FusionWeights::default());
        // name: 0.7 * 0.9 + 0.3 * 0.55 = 0.795
        assert!((fused.confidence.name - 0.795).abs() < 1e-4);
        // colors: 0.7 * 0.8 + 0.3 * 0.4 = 0.68
        assert!((fused.confidence.colors - 0.68).abs() < 1e-4);
        // overall is the rounded mean of the five weighted sub-scores.
        let mean = (fused.confidence.name
            + fused.confidence.colors
            + fused.confidence.typography
            + fused.confidence.logo
            + fused.confidence.personality)
            / 5.0;
        assert!((fused.confidence.overall - (mean * 100.0).round() / 100.0).abs() < 1e-4);
    }

    #[test]
    fn vision_absent_returns_heuristic_verbatim() {
        let h = heuristic();
        let fused = fuse(&h, None, &FusionWeights::default());
        assert_eq!(fused.name, h.name);
        assert_eq!(fused.primary_color, h.triad.primary);
        assert_eq!(fused.confidence, h.confidence);
        assert!(fused.confidence.overall < 0.5);
    }

    #[test]
    fn vision_absent_generic_heuristic_uses_slot_defaults() {
        let mut h = heuristic();
        h.triad = ColorTriad::fallback();
        let fused = fuse(&h, None, &FusionWeights::default());
        assert_eq!(fused.primary_color, DEFAULT_PRIMARY);
        assert_eq!(fused.secondary_color, DEFAULT_SECONDARY);
        assert_eq!(fused.accent_color, DEFAULT_ACCENT);
    }
}

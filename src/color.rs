//! Color theory engine: filters raw color candidates, ranks them, and
//! harmonizes the winner into a primary/secondary/accent triad.
//!
//! All transforms run in HSL space. The triad is deterministic for a given
//! candidate set and never degenerates: a single seed color still yields
//! three distinct, balanced colors via hue rotation.

use std::cmp::Ordering;
use std::sync::LazyLock;

use palette::{convert::FromColorUnclamped, Hsl, Srgb};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{ColorCandidate, ColorSource, HslColor};

/// Strict six-digit hex pattern. Profile colors must match this.
static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex regex"));

/// Fallback triad used when no candidate survives filtering.
pub const DEFAULT_PRIMARY: &str = "#336699";
pub const DEFAULT_SECONDARY: &str = "#E8ECF0";
pub const DEFAULT_ACCENT: &str = "#996633";

/// Channel spread at or below which a color counts as near-gray.
const GRAY_SPREAD: i16 = 15;
/// Frequency difference treated as a near-tie during ranking.
const NEAR_TIE: u32 = 2;

/// A harmonized brand color triad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTriad {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl ColorTriad {
    pub fn fallback() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            secondary: DEFAULT_SECONDARY.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

/// Returns true for a strict `#RRGGBB` string.
pub fn is_valid_hex(hex: &str) -> bool {
    HEX_RE.is_match(hex)
}

/// Parses a strict `#RRGGBB` string into channels.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    if !is_valid_hex(hex) {
        return None;
    }
    let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
    let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
    let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
    Some((r, g, b))
}

/// Converts a strict hex color to HSL (hue degrees, sat/lightness percent).
pub fn hex_to_hsl(hex: &str) -> Option<HslColor> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let srgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let hsl: Hsl = Hsl::from_color_unclamped(srgb);
    Some(HslColor {
        h: hsl.hue.into_positive_degrees(),
        s: hsl.saturation * 100.0,
        l: hsl.lightness * 100.0,
    })
}

/// Converts HSL back to an uppercase `#RRGGBB` string.
pub fn hsl_to_hex(color: &HslColor) -> String {
    let hsl = Hsl::new(
        color.h.rem_euclid(360.0),
        (color.s / 100.0).clamp(0.0, 1.0),
        (color.l / 100.0).clamp(0.0, 1.0),
    );
    let srgb: Srgb = Srgb::from_color_unclamped(hsl);
    let clamp = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02X}{:02X}{:02X}",
        clamp(srgb.red),
        clamp(srgb.green),
        clamp(srgb.blue)
    )
}

/// Normalizes a raw CSS hex token (`#abc` or `#aabbcc`) to uppercase
/// `#RRGGBB`, or `None` when it is not a hex color.
pub fn normalize_hex(raw: &str) -> Option<String> {
    let token = raw.trim();
    let digits = token.strip_prefix('#')?;
    match digits.len() {
        3 if digits.chars().all(|c| c.is_ascii_hexdigit()) => {
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            Some(format!("#{}", expanded.to_ascii_uppercase()))
        }
        6 if digits.chars().all(|c| c.is_ascii_hexdigit()) => {
            Some(format!("#{}", digits.to_ascii_uppercase()))
        }
        _ => None,
    }
}

/// Builds a candidate from a raw hex token, computing its HSL form.
pub fn candidate(raw_hex: &str, frequency: u32, source: ColorSource) -> Option<ColorCandidate> {
    let hex = normalize_hex(raw_hex)?;
    let hsl = hex_to_hsl(&hex)?;
    Some(ColorCandidate {
        hex,
        hsl,
        frequency,
        source,
    })
}

fn is_near_gray(hex: &str) -> bool {
    let Some((r, g, b)) = hex_to_rgb(hex) else {
        return true;
    };
    let (r, g, b) = (r as i16, g as i16, b as i16);
    let spread = (r - g).abs().max((g - b).abs()).max((r - b).abs());
    spread <= GRAY_SPREAD
}

/// Drops pure black/white, near-grays, and probable background/text tones.
pub fn filter_candidates(candidates: &[ColorCandidate]) -> Vec<ColorCandidate> {
    candidates
        .iter()
        .filter(|c| {
            let hex = c.hex.to_ascii_uppercase();
            if hex == "#000000" || hex == "#FFFFFF" {
                return false;
            }
            if is_near_gray(&hex) {
                return false;
            }
            if c.hsl.s < 20.0 {
                return false;
            }
            if c.hsl.l > 85.0 || c.hsl.l < 15.0 {
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Sorts survivors by frequency descending; near-ties fall back to higher
/// saturation.
pub fn rank_candidates(mut survivors: Vec<ColorCandidate>) -> Vec<ColorCandidate> {
    survivors.sort_by(|a, b| {
        if a.frequency.abs_diff(b.frequency) <= NEAR_TIE {
            b.hsl
                .s
                .partial_cmp(&a.hsl.s)
                .unwrap_or(Ordering::Equal)
        } else {
            b.frequency.cmp(&a.frequency)
        }
    });
    survivors
}

/// Filters, ranks, and harmonizes candidates into a triad.
///
/// Primary is the most saturated of the top five survivors. Secondary is a
/// light, desaturated near-complement (hue +180, saturation at 30% of the
/// primary's, lightness raised to at most 90). Accent rotates hue +120 with
/// saturation boosted to at least 40 and lightness clamped to [30, 70].
pub fn harmonize_colors(candidates: &[ColorCandidate]) -> ColorTriad {
    let survivors = rank_candidates(filter_candidates(candidates));
    if survivors.is_empty() {
        return ColorTriad::fallback();
    }

    let primary = survivors
        .iter()
        .take(5)
        .max_by(|a, b| {
            a.hsl
                .s
                .partial_cmp(&b.hsl.s)
                .unwrap_or(Ordering::Equal)
        })
        .expect("non-empty survivor set");
    let p = primary.hsl;

    let secondary = HslColor {
        h: (p.h + 180.0).rem_euclid(360.0),
        s: p.s * 0.3,
        l: (p.l + 40.0).min(90.0),
    };
    let accent = HslColor {
        h: (p.h + 120.0).rem_euclid(360.0),
        s: p.s.max(40.0),
        l: p.l.clamp(30.0, 70.0),
    };

    ColorTriad {
        primary: primary.hex.clone(),
        secondary: hsl_to_hex(&secondary),
        accent: hsl_to_hex(&accent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(hex: &str, freq: u32) -> ColorCandidate {
        candidate(hex, freq, ColorSource::CssLiteral).expect("valid candidate")
    }

    #[test]
    fn normalize_expands_shorthand() {
        assert_eq!(normalize_hex("#a1c"), Some("#AA11CC".to_string()));
        assert_eq!(normalize_hex("#1a2b3c"), Some("#1A2B3C".to_string()));
        assert_eq!(normalize_hex("#12"), None);
        assert_eq!(normalize_hex("red"), None);
    }

    #[test]
    fn hex_hsl_round_trip_within_tolerance() {
        for hex in ["#1A2B3C", "#FF6600", "#3CB371", "#7B2FBE", "#C0FFEE"] {
            let hsl = hex_to_hsl(hex).unwrap();
            let back = hsl_to_hex(&hsl);
            let (r1, g1, b1) = hex_to_rgb(hex).unwrap();
            let (r2, g2, b2) = hex_to_rgb(&back).unwrap();
            assert!(
                (r1 as i16 - r2 as i16).abs() <= 1
                    && (g1 as i16 - g2 as i16).abs() <= 1
                    && (b1 as i16 - b2 as i16).abs() <= 1,
                "round trip drifted: {hex} -> {back}"
            );
        }
    }

    #[test]
    fn filter_drops_black_white_and_grays() {
        let candidates = vec![
            cand("#000000", 10),
            cand("#FFFFFF", 10),
            cand("#808080", 5),
            cand("#7A7F84", 5), // spread 10, near-gray
            cand("#1A2B3C", 3),
        ];
        let survivors = filter_candidates(&candidates);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].hex, "#1A2B3C");
    }

    #[test]
    fn filter_drops_background_and_text_tones() {
        // Lightness ~90% reads as background, ~12% as text.
        let light = candidate("#E6D9F2", 4, ColorSource::CssLiteral).unwrap();
        let dark = candidate("#1F0A33", 4, ColorSource::CssLiteral).unwrap();
        let keep = cand("#CC3366", 1);
        let survivors = filter_candidates(&[light, dark, keep]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].hex, "#CC3366");
    }

    #[test]
    fn gray_majority_filtered_primary_chosen_by_saturation() {
        let candidates = vec![cand("#1A2B3C", 3), cand("#4D5E6F", 1), cand("#808080", 5)];
        let triad = harmonize_colors(&candidates);
        assert_eq!(triad.primary, "#1A2B3C");
        assert_ne!(triad.secondary, triad.primary);
        assert_ne!(triad.accent, triad.primary);
        assert_ne!(triad.secondary, triad.accent);
    }

    #[test]
    fn ranking_breaks_near_ties_by_saturation() {
        // Frequencies 5 vs 4 are a near-tie; #E74C3C is far more saturated.
        let a = cand("#6B7FA3", 5);
        let b = cand("#E74C3C", 4);
        let ranked = rank_candidates(vec![a, b]);
        assert_eq!(ranked[0].hex, "#E74C3C");

        // A decisive frequency gap wins regardless of saturation.
        let a = cand("#6B7FA3", 9);
        let b = cand("#E74C3C", 4);
        let ranked = rank_candidates(vec![a, b]);
        assert_eq!(ranked[0].hex, "#6B7FA3");
    }

    #[test]
    fn harmonize_is_deterministic() {
        let candidates = vec![cand("#2E86C1", 4), cand("#E67E22", 4), cand("#16A085", 2)];
        let first = harmonize_colors(&candidates);
        let second = harmonize_colors(&candidates);
        assert_eq!(first, second);
    }

    #[test]
    fn harmonize_empty_returns_fallback_triad() {
        assert_eq!(harmonize_colors(&[]), ColorTriad::fallback());
        let only_grays = vec![cand("#111111", 9), cand("#FEFEFE", 9)];
        assert_eq!(harmonize_colors(&only_grays), ColorTriad::fallback());
    }

    #[test]
    fn harmonize_single_seed_follows_closed_form() {
        let seed = cand("#1A2B3C", 3);
        let p = seed.hsl;
        let triad = harmonize_colors(&[seed.clone()]);

        let expected_secondary = hsl_to_hex(&HslColor {
            h: (p.h + 180.0).rem_euclid(360.0),
            s: p.s * 0.3,
            l: (p.l + 40.0).min(90.0),
        });
        let expected_accent = hsl_to_hex(&HslColor {
            h: (p.h + 120.0).rem_euclid(360.0),
            s: p.s.max(40.0),
            l: p.l.clamp(30.0, 70.0),
        });

        assert_eq!(triad.primary, "#1A2B3C");
        assert_eq!(triad.secondary, expected_secondary);
        assert_eq!(triad.accent, expected_accent);

        // Secondary lands light and desaturated, accent inside its clamps.
        let s_hsl = hex_to_hsl(&triad.secondary).unwrap();
        assert!(s_hsl.l > p.l);
        let a_hsl = hex_to_hsl(&triad.accent).unwrap();
        assert!(a_hsl.l >= 29.0 && a_hsl.l <= 71.0);
    }

    #[test]
    fn triad_distinct_when_multiple_candidates_available() {
        let candidates = vec![cand("#2E86C1", 5), cand("#E67E22", 3)];
        let triad = harmonize_colors(&candidates);
        assert_ne!(triad.primary, triad.secondary);
        assert_ne!(triad.primary, triad.accent);
        assert_ne!(triad.secondary, triad.accent);
    }
}

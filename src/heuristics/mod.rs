//! Heuristic brand extraction.
//!
//! Pure, network-free parsing of a captured document into a full brand
//! profile candidate: name, logo, font, harmonized colors, and a derived
//! personality. Always succeeds; missing signals only lower confidence.
//! Confidence ceilings are chosen so a heuristic-only profile stays below
//! 0.5 overall.

mod colors;
mod markup;

pub use colors::collect_color_candidates;
pub use markup::{extract_logo_url, extract_name, structural_signals, NameSource};

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use crate::color::{filter_candidates, harmonize_colors, hex_to_hsl, ColorTriad};
use crate::personality::{derive_personality, PersonalityDescriptor, StructuralSignals};
use crate::types::{CapturedDocument, ColorCandidate, ConfidenceScores, HslColor};

static FONT_FAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-family\s*:\s*([^;}{]+)").expect("font-family regex"));

/// Everything the heuristic branch derives from one document.
#[derive(Debug, Clone)]
pub struct HeuristicProfile {
    pub name: String,
    pub name_source: NameSource,
    pub logo_url: Option<String>,
    pub font_family: Option<String>,
    pub candidates: Vec<ColorCandidate>,
    pub triad: ColorTriad,
    pub signals: StructuralSignals,
    pub personality: PersonalityDescriptor,
    pub confidence: ConfidenceScores,
}

/// First `font-family` declaration whose leading face is not a generic
/// keyword. Returns the whole declared stack.
pub fn extract_font_family(css: &str) -> Option<String> {
    for caps in FONT_FAMILY_RE.captures_iter(css) {
        let stack = caps[1].trim();
        let first_face = stack
            .split(',')
            .next()
            .map(|face| face.trim().trim_matches(['"', '\'']).to_ascii_lowercase())
            .unwrap_or_default();
        if first_face.is_empty() || first_face.len() >= 50 {
            continue;
        }
        if first_face == "serif" || first_face == "sans-serif" {
            continue;
        }
        return Some(stack.to_string());
    }
    None
}

fn name_confidence(source: NameSource) -> f32 {
    match source {
        NameSource::Title => 0.55,
        NameSource::H1 => 0.45,
        NameSource::MetaTitle => 0.35,
        NameSource::Placeholder => 0.1,
    }
}

fn color_confidence(candidates: &[ColorCandidate]) -> f32 {
    let survivors = filter_candidates(candidates);
    if survivors.is_empty() {
        0.15
    } else {
        (0.2 + 0.05 * survivors.len() as f32).min(0.5)
    }
}

/// Extracts the full heuristic profile from a captured document.
pub fn extract_profile(doc: &CapturedDocument) -> HeuristicProfile {
    let dom = Html::parse_document(&doc.html);

    let (name, name_source) = extract_name(&dom);
    let logo_url = extract_logo_url(&dom, &doc.url);
    let font_family = extract_font_family(&doc.stylesheet_text);
    let candidates = collect_color_candidates(&dom, &doc.stylesheet_text);
    let triad = harmonize_colors(&candidates);
    let signals = structural_signals(&dom, &doc.stylesheet_text);

    let primary_hsl = hex_to_hsl(&triad.primary).unwrap_or(HslColor {
        h: 210.0,
        s: 50.0,
        l: 40.0,
    });
    let personality = derive_personality(&signals, &primary_hsl);

    let confidence = ConfidenceScores {
        name: name_confidence(name_source),
        colors: color_confidence(&candidates),
        typography: if font_family.is_some() { 0.45 } else { 0.15 },
        logo: if logo_url.is_some() { 0.5 } else { 0.05 },
        personality: 0.3,
        overall: 0.0,
    }
    .normalized();

    HeuristicProfile {
        name,
        name_source,
        logo_url,
        font_family,
        candidates,
        triad,
        signals,
        personality,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use url::Url;

    fn doc(html: &str, css: &str) -> CapturedDocument {
        CapturedDocument {
            url: Url::parse("https://acme.example.com/").unwrap(),
            html: html.to_string(),
            stylesheet_text: css.to_string(),
            fetched_at: Utc::now(),
        }
    }

    const RICH_PAGE: &str = r#"<html><head>
        <title>Acme - Home</title>
    </head><body>
        <nav>menu</nav>
        <img src="/assets/acme-logo.svg">
        <h1>Welcome to Acme</h1>
    </body></html>"#;

    const RICH_CSS: &str = r#"
        body { font-family: "Inter", sans-serif; color: #1A2B3C; }
        .site-header { background: #2E86C1; }
        .cta { background: #E67E22; }
    "#;

    #[test]
    fn extract_font_skips_generic_first_face() {
        assert_eq!(
            extract_font_family("body { font-family: sans-serif; } h1 { font-family: 'Inter', sans-serif; }"),
            Some("'Inter', sans-serif".to_string())
        );
        assert!(extract_font_family("body { font-family: serif; }").is_none());
        assert!(extract_font_family("body { margin: 0; }").is_none());
    }

    #[test]
    fn rich_page_extracts_every_attribute() {
        let profile = extract_profile(&doc(RICH_PAGE, RICH_CSS));

        assert_eq!(profile.name, "Acme");
        assert_eq!(profile.name_source, NameSource::Title);
        assert_eq!(
            profile.logo_url.as_deref(),
            Some("https://acme.example.com/assets/acme-logo.svg")
        );
        assert_eq!(profile.font_family.as_deref(), Some("\"Inter\", sans-serif"));
        assert!(!profile.candidates.is_empty());
        assert!(profile.signals.has_navigation);
        // Triad comes out of the harmonizer, not the fallback.
        assert_ne!(profile.triad, ColorTriad::fallback());
    }

    #[test]
    fn bare_page_still_produces_profile() {
        let profile = extract_profile(&doc("<html><body></body></html>", ""));

        assert_eq!(profile.name, crate::types::PLACEHOLDER_NAME);
        assert!(profile.logo_url.is_none());
        assert!(profile.font_family.is_none());
        assert_eq!(profile.triad, ColorTriad::fallback());
        assert!(profile.confidence.overall < 0.3);
    }

    #[test]
    fn heuristic_overall_confidence_stays_below_half() {
        // Even a page that hits every heuristic stays under 0.5 overall.
        let profile = extract_profile(&doc(RICH_PAGE, RICH_CSS));
        assert!(profile.confidence.overall < 0.5);
        assert!(profile.confidence.name >= 0.5);
    }
}

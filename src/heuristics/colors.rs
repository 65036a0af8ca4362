//! Color candidate scans.
//!
//! Each scan walks one place colors hide in a page: stylesheet literals,
//! custom properties, inline styles, brand-flavored selectors, SVG paint
//! attributes, gradient stops, and script-embedded (css-in-js) values.
//! Observations are merged per hex with frequency counts retained.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::color::{candidate, normalize_hex};
use crate::types::{ColorCandidate, ColorSource};

static HEX_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").expect("hex token regex")
});

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[\d.]+\s*)?\)")
        .expect("rgb regex")
});

static CSS_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[\w-]+\s*:\s*([^;}{]+)").expect("css variable regex"));

static GRADIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:linear|radial|conic)-gradient\(([^;{}]+)\)").expect("gradient regex")
});

static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("css rule regex"));

/// Selector substrings that mark a rule as brand-relevant.
const BRAND_TOKENS: &[&str] = &["brand", "logo", "header", "nav", "primary", "accent"];

/// Collects every hex/rgb color token in a chunk of text, normalized to
/// `#RRGGBB`.
fn color_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in HEX_TOKEN_RE.find_iter(text) {
        if let Some(hex) = normalize_hex(m.as_str()) {
            tokens.push(hex);
        }
    }
    for caps in RGB_RE.captures_iter(text) {
        let parse = |i: usize| caps[i].parse::<u16>().ok().filter(|v| *v <= 255);
        if let (Some(r), Some(g), Some(b)) = (parse(1), parse(2), parse(3)) {
            tokens.push(format!("#{r:02X}{g:02X}{b:02X}"));
        }
    }
    tokens
}

fn scan_css_literals(css: &str, out: &mut Vec<(String, ColorSource)>) {
    for hex in color_tokens(css) {
        out.push((hex, ColorSource::CssLiteral));
    }
}

fn scan_css_variables(css: &str, out: &mut Vec<(String, ColorSource)>) {
    for caps in CSS_VAR_RE.captures_iter(css) {
        for hex in color_tokens(&caps[1]) {
            out.push((hex, ColorSource::CssVariable));
        }
    }
}

fn scan_inline_styles(doc: &Html, out: &mut Vec<(String, ColorSource)>) {
    let sel = Selector::parse("[style]").expect("style attr selector");
    for el in doc.select(&sel) {
        if let Some(style) = el.value().attr("style") {
            for hex in color_tokens(style) {
                out.push((hex, ColorSource::InlineStyle));
            }
        }
    }
}

fn scan_brand_rules(css: &str, out: &mut Vec<(String, ColorSource)>) {
    for caps in RULE_RE.captures_iter(css) {
        let selector = caps[1].to_ascii_lowercase();
        if BRAND_TOKENS.iter().any(|token| selector.contains(token)) {
            for hex in color_tokens(&caps[2]) {
                out.push((hex, ColorSource::BrandElement));
            }
        }
    }
}

fn scan_svg(doc: &Html, out: &mut Vec<(String, ColorSource)>) {
    let sel = Selector::parse("svg, svg *").expect("svg selector");
    for el in doc.select(&sel) {
        for attr in ["fill", "stroke"] {
            if let Some(value) = el.value().attr(attr) {
                for hex in color_tokens(value) {
                    out.push((hex, ColorSource::Svg));
                }
            }
        }
    }
}

fn scan_gradients(css: &str, out: &mut Vec<(String, ColorSource)>) {
    for caps in GRADIENT_RE.captures_iter(css) {
        for hex in color_tokens(&caps[1]) {
            out.push((hex, ColorSource::Gradient));
        }
    }
}

fn scan_scripts(doc: &Html, out: &mut Vec<(String, ColorSource)>) {
    let sel = Selector::parse("script").expect("script selector");
    for el in doc.select(&sel) {
        let body = el.text().collect::<String>();
        for hex in color_tokens(&body) {
            out.push((hex, ColorSource::CssInJs));
        }
    }
}

/// Runs every scan and merges observations per hex. Frequency is the total
/// occurrence count; the source tag is the first scan that saw the color.
pub fn collect_color_candidates(doc: &Html, css: &str) -> Vec<ColorCandidate> {
    let mut observations: Vec<(String, ColorSource)> = Vec::new();

    scan_css_literals(css, &mut observations);
    scan_css_variables(css, &mut observations);
    scan_inline_styles(doc, &mut observations);
    scan_brand_rules(css, &mut observations);
    scan_svg(doc, &mut observations);
    scan_gradients(css, &mut observations);
    scan_scripts(doc, &mut observations);

    let mut candidates: Vec<ColorCandidate> = Vec::new();
    for (hex, source) in observations {
        if let Some(existing) = candidates.iter_mut().find(|c| c.hex == hex) {
            existing.frequency += 1;
        } else if let Some(c) = candidate(&hex, 1, source) {
            candidates.push(c);
        }
    }
    candidates
}

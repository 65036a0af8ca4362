//! Markup-level heuristics: brand name, logo reference, structural signals.

use scraper::{Html, Selector};
use url::Url;

use crate::personality::StructuralSignals;
use crate::types::PLACEHOLDER_NAME;

/// Where the brand name was found; drives its confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Title,
    H1,
    MetaTitle,
    Placeholder,
}

/// Name candidates are only accepted inside these bounds.
const MAX_NAME_LEN: usize = 50;

fn acceptable(name: &str) -> bool {
    !name.is_empty() && name.len() < MAX_NAME_LEN
}

/// Strips a trailing `" - X"` / `" | X"` segment from a page title.
fn trim_title_suffix(title: &str) -> String {
    let trimmed = title.trim();
    let cut = [" - ", " | "]
        .iter()
        .filter_map(|sep| trimmed.rfind(sep))
        .max();
    match cut {
        Some(idx) => trimmed[..idx].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Resolves the brand name by priority: trimmed `<title>`, first `<h1>`,
/// `meta[name=title]`, placeholder.
pub fn extract_name(doc: &Html) -> (String, NameSource) {
    let title_sel = Selector::parse("title").expect("title selector");
    if let Some(el) = doc.select(&title_sel).next() {
        let name = trim_title_suffix(&el.text().collect::<String>());
        if acceptable(&name) {
            return (name, NameSource::Title);
        }
    }

    let h1_sel = Selector::parse("h1").expect("h1 selector");
    if let Some(el) = doc.select(&h1_sel).next() {
        let name = el.text().collect::<String>().trim().to_string();
        if acceptable(&name) {
            return (name, NameSource::H1);
        }
    }

    let meta_sel = Selector::parse(r#"meta[name="title"]"#).expect("meta selector");
    if let Some(el) = doc.select(&meta_sel).next() {
        if let Some(content) = el.value().attr("content") {
            let name = content.trim().to_string();
            if acceptable(&name) {
                return (name, NameSource::MetaTitle);
            }
        }
    }

    (PLACEHOLDER_NAME.to_string(), NameSource::Placeholder)
}

fn looks_like_logo(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.contains("logo") || lower.contains("brand")
}

/// Ordered logo search: `img` sources mentioning logo/brand, then any
/// logo/brand `href`, then icon links. Relative paths resolve against the
/// page URL.
pub fn extract_logo_url(doc: &Html, base: &Url) -> Option<String> {
    let img_sel = Selector::parse("img[src]").expect("img selector");
    for el in doc.select(&img_sel) {
        if let Some(src) = el.value().attr("src") {
            if looks_like_logo(src) {
                if let Ok(resolved) = base.join(src) {
                    return Some(resolved.to_string());
                }
            }
        }
    }

    let href_sel = Selector::parse("[href]").expect("href selector");
    for el in doc.select(&href_sel) {
        if let Some(href) = el.value().attr("href") {
            if looks_like_logo(href) {
                if let Ok(resolved) = base.join(href) {
                    return Some(resolved.to_string());
                }
            }
        }
    }

    let icon_sel = Selector::parse(r#"link[rel~="icon"]"#).expect("icon selector");
    for el in doc.select(&icon_sel) {
        if let Some(href) = el.value().attr("href") {
            if let Ok(resolved) = base.join(href) {
                return Some(resolved.to_string());
            }
        }
    }

    None
}

/// Structural markers feeding the heuristic personality derivation.
pub fn structural_signals(doc: &Html, css: &str) -> StructuralSignals {
    let nav_sel = Selector::parse("nav, [role=\"navigation\"]").expect("nav selector");
    let form_sel = Selector::parse("form").expect("form selector");
    let video_sel = Selector::parse("video, iframe[src]").expect("video selector");

    let has_video = doc.select(&video_sel).any(|el| {
        el.value().name() == "video"
            || el
                .value()
                .attr("src")
                .map(|src| {
                    let lower = src.to_ascii_lowercase();
                    lower.contains("youtube") || lower.contains("vimeo")
                })
                .unwrap_or(false)
    });

    let has_animation =
        css.contains("@keyframes") || css.contains("animation:") || css.contains("transition:");

    StructuralSignals {
        has_navigation: doc.select(&nav_sel).next().is_some(),
        has_forms: doc.select(&form_sel).next().is_some(),
        has_video,
        has_animation,
    }
}

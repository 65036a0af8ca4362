//! Fixed brand-personality taxonomy and its heuristic derivation.
//!
//! Vision providers describe personality in free text; everything is mapped
//! onto the closed sets below before it can reach fusion.

use serde::{Deserialize, Serialize};

use crate::types::HslColor;

/// Personality traits a brand can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandTrait {
    Professional,
    Creative,
    Bold,
    Approachable,
    Minimal,
    Playful,
    Luxurious,
    Technical,
    Trustworthy,
    Energetic,
}

impl BrandTrait {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrandTrait::Professional => "professional",
            BrandTrait::Creative => "creative",
            BrandTrait::Bold => "bold",
            BrandTrait::Approachable => "approachable",
            BrandTrait::Minimal => "minimal",
            BrandTrait::Playful => "playful",
            BrandTrait::Luxurious => "luxurious",
            BrandTrait::Technical => "technical",
            BrandTrait::Trustworthy => "trustworthy",
            BrandTrait::Energetic => "energetic",
        }
    }

    /// Maps a free-text trait name onto the taxonomy, if it matches.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" | "corporate" | "formal" => Some(BrandTrait::Professional),
            "creative" | "artistic" | "expressive" => Some(BrandTrait::Creative),
            "bold" | "daring" | "strong" => Some(BrandTrait::Bold),
            "approachable" | "friendly" | "warm" | "welcoming" => Some(BrandTrait::Approachable),
            "minimal" | "minimalist" | "clean" => Some(BrandTrait::Minimal),
            "playful" | "fun" | "whimsical" => Some(BrandTrait::Playful),
            "luxurious" | "luxury" | "premium" | "elegant" => Some(BrandTrait::Luxurious),
            "technical" | "tech" | "engineering" => Some(BrandTrait::Technical),
            "trustworthy" | "reliable" | "dependable" => Some(BrandTrait::Trustworthy),
            "energetic" | "dynamic" | "vibrant" => Some(BrandTrait::Energetic),
            _ => None,
        }
    }
}

/// Industry bucket inferred for a brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndustryContext {
    Finance,
    Healthcare,
    Technology,
    Creative,
    Retail,
    Education,
    General,
}

impl IndustryContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndustryContext::Finance => "finance",
            IndustryContext::Healthcare => "healthcare",
            IndustryContext::Technology => "technology",
            IndustryContext::Creative => "creative",
            IndustryContext::Retail => "retail",
            IndustryContext::Education => "education",
            IndustryContext::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finance" | "financial" | "banking" | "fintech" => Some(IndustryContext::Finance),
            "healthcare" | "health" | "medical" | "wellness" => Some(IndustryContext::Healthcare),
            "technology" | "tech" | "software" | "saas" => Some(IndustryContext::Technology),
            "creative" | "design" | "media" | "agency" => Some(IndustryContext::Creative),
            "retail" | "ecommerce" | "e-commerce" | "commerce" => Some(IndustryContext::Retail),
            "education" | "edtech" | "academic" => Some(IndustryContext::Education),
            "general" => Some(IndustryContext::General),
            _ => None,
        }
    }
}

/// Overall design direction read off the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignApproach {
    Minimal,
    Bold,
    Classic,
    Modern,
    Dynamic,
    Functional,
}

impl DesignApproach {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignApproach::Minimal => "minimal",
            DesignApproach::Bold => "bold",
            DesignApproach::Classic => "classic",
            DesignApproach::Modern => "modern",
            DesignApproach::Dynamic => "dynamic",
            DesignApproach::Functional => "functional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" | "minimalist" | "clean" => Some(DesignApproach::Minimal),
            "bold" | "expressive" | "loud" => Some(DesignApproach::Bold),
            "classic" | "traditional" | "timeless" => Some(DesignApproach::Classic),
            "modern" | "contemporary" => Some(DesignApproach::Modern),
            "dynamic" | "animated" | "interactive" => Some(DesignApproach::Dynamic),
            "functional" | "utilitarian" | "practical" => Some(DesignApproach::Functional),
            _ => None,
        }
    }
}

/// Structured personality description for a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityDescriptor {
    pub primary_trait: BrandTrait,
    pub secondary_traits: Vec<BrandTrait>,
    pub industry: IndustryContext,
    pub design_approach: DesignApproach,
}

impl PersonalityDescriptor {
    /// Caps the secondary trait list and drops duplicates of the primary.
    pub fn normalized(mut self) -> Self {
        self.secondary_traits.retain(|t| *t != self.primary_trait);
        self.secondary_traits.dedup();
        self.secondary_traits.truncate(3);
        self
    }
}

impl Default for PersonalityDescriptor {
    fn default() -> Self {
        Self {
            primary_trait: BrandTrait::Professional,
            secondary_traits: vec![BrandTrait::Trustworthy],
            industry: IndustryContext::General,
            design_approach: DesignApproach::Modern,
        }
    }
}

/// Markers the heuristic extractor finds in the page structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralSignals {
    pub has_navigation: bool,
    pub has_forms: bool,
    pub has_video: bool,
    pub has_animation: bool,
}

/// Derives a personality descriptor from page structure and the primary
/// color's hue bucket. Used when no vision descriptor is available.
pub fn derive_personality(signals: &StructuralSignals, primary: &HslColor) -> PersonalityDescriptor {
    let (primary_trait, industry) = hue_bucket(primary);

    let mut secondary = Vec::new();
    if signals.has_navigation && signals.has_forms {
        secondary.push(BrandTrait::Professional);
    }
    if signals.has_animation || signals.has_video {
        secondary.push(BrandTrait::Energetic);
    }
    if !signals.has_animation && !signals.has_video {
        secondary.push(BrandTrait::Minimal);
    }

    let design_approach = if signals.has_video || signals.has_animation {
        DesignApproach::Dynamic
    } else if signals.has_forms && !signals.has_video {
        DesignApproach::Functional
    } else if primary.s >= 60.0 {
        DesignApproach::Bold
    } else {
        DesignApproach::Minimal
    };

    PersonalityDescriptor {
        primary_trait,
        secondary_traits: secondary,
        industry,
        design_approach,
    }
    .normalized()
}

/// Maps the primary color's hue/saturation onto a trait + industry guess.
fn hue_bucket(primary: &HslColor) -> (BrandTrait, IndustryContext) {
    let h = primary.h.rem_euclid(360.0);
    let s = primary.s;

    if (200.0..260.0).contains(&h) && s < 50.0 {
        (BrandTrait::Professional, IndustryContext::Finance)
    } else if (200.0..260.0).contains(&h) {
        (BrandTrait::Trustworthy, IndustryContext::Technology)
    } else if (90.0..170.0).contains(&h) {
        (BrandTrait::Approachable, IndustryContext::Healthcare)
    } else if (h < 60.0 || h >= 330.0) && s >= 60.0 {
        (BrandTrait::Bold, IndustryContext::Creative)
    } else if (260.0..330.0).contains(&h) {
        (BrandTrait::Luxurious, IndustryContext::Creative)
    } else {
        (BrandTrait::Professional, IndustryContext::General)
    }
}

//! Extraction configuration.
//!
//! Everything the pipeline treats as an empirically chosen constant lives
//! here with its default: fusion weights, validation thresholds, retry
//! policy, capture settings, and the ordered provider lists. Loadable from a
//! TOML file; every field is optional and falls back to the default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::chain::RetryPolicy;
use crate::error::{BexError, Result};
use crate::screenshot::CaptureConfig;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub viewport: Viewport,
    pub capture: CaptureConfig,
    pub retry: RetryPolicy,
    pub validation: ValidationConfig,
    pub fusion: FusionWeights,
    pub timeouts: Timeouts,
    pub screenshot_providers: Vec<ScreenshotProviderSettings>,
    pub vision_providers: Vec<VisionProviderSettings>,
}

/// Screenshot artifact validation scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ValidationConfig {
    /// Minimum score an artifact must reach to be accepted.
    pub min_score: f32,
    /// Score assigned to a reachable artifact with an image content type.
    pub base_score: f32,
    /// Penalty for captures under `min_bytes` (likely blank).
    pub small_penalty: f32,
    /// Penalty for captures over `max_bytes`.
    pub large_penalty: f32,
    pub min_bytes: u64,
    pub max_bytes: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_score: 50.0,
            base_score: 70.0,
            small_penalty: 30.0,
            large_penalty: 10.0,
            min_bytes: 10 * 1024,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Vision/heuristic weighting applied per confidence sub-score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FusionWeights {
    pub vision_weight: f32,
    pub heuristic_weight: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vision_weight: 0.7,
            heuristic_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Timeouts {
    /// Document fetch (page plus stylesheets).
    #[serde(with = "humantime_serde")]
    pub fetch: Duration,
    /// Any single provider call.
    #[serde(with = "humantime_serde")]
    pub provider: Duration,
    /// Screenshot validation HEAD request.
    #[serde(with = "humantime_serde")]
    pub validation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            fetch: Duration::from_secs(30),
            provider: Duration::from_secs(30),
            validation: Duration::from_secs(10),
        }
    }
}

/// How a screenshot provider returns its artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// JSON body with a hosted image URL.
    JsonUrl,
    /// Raw image bytes in the response body.
    Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScreenshotProviderSettings {
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_response_mode")]
    pub response: ResponseMode,
    #[serde(default = "default_screenshot_retries")]
    pub max_retries: u32,
}

fn default_response_mode() -> ResponseMode {
    ResponseMode::JsonUrl
}

fn default_screenshot_retries() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VisionProviderSettings {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_vision_retries")]
    pub max_retries: u32,
}

fn default_vision_retries() -> u32 {
    1
}

impl Config {
    /// Loads config from a TOML file, or returns defaults when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| BexError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Capture config with the viewport applied.
    pub fn effective_capture(&self) -> CaptureConfig {
        CaptureConfig {
            width: self.viewport.width,
            height: self.viewport.height,
            ..self.capture.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(BexError::Config("viewport dimensions must be positive".into()));
        }

        let weight_sum = self.fusion.vision_weight + self.fusion.heuristic_weight;
        if (weight_sum - 1.0).abs() > 1e-3 {
            return Err(BexError::Config(format!(
                "fusion weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if self.fusion.vision_weight < 0.0 || self.fusion.heuristic_weight < 0.0 {
            return Err(BexError::Config("fusion weights must be non-negative".into()));
        }

        if self.validation.min_score > self.validation.base_score {
            return Err(BexError::Config(
                "validation min_score above base_score would reject every artifact".into(),
            ));
        }
        if self.validation.min_bytes >= self.validation.max_bytes {
            return Err(BexError::Config(
                "validation min_bytes must be below max_bytes".into(),
            ));
        }

        if self.capture.quality > 100 {
            return Err(BexError::Config("capture quality must be at most 100".into()));
        }

        for p in &self.screenshot_providers {
            if p.name.trim().is_empty() || p.endpoint.trim().is_empty() {
                return Err(BexError::Config(
                    "screenshot provider entries need a name and endpoint".into(),
                ));
            }
        }
        for p in &self.vision_providers {
            if p.name.trim().is_empty() || p.endpoint.trim().is_empty() {
                return Err(BexError::Config(
                    "vision provider entries need a name and endpoint".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.viewport.width, 1280);
        assert_eq!(cfg.viewport.height, 720);
        assert!((cfg.fusion.vision_weight - 0.7).abs() < f32::EPSILON);
        assert!((cfg.fusion.heuristic_weight - 0.3).abs() < f32::EPSILON);
        assert!((cfg.validation.min_score - 50.0).abs() < f32::EPSILON);
        assert_eq!(cfg.timeouts.fetch, Duration::from_secs(30));
        assert_eq!(cfg.retry.base_delay, Duration::from_millis(500));
        assert!(cfg.screenshot_providers.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_none_returns_defaults() {
        let cfg = Config::load(None).unwrap();
        assert_eq!(cfg.viewport, Viewport::default());
    }

    #[test]
    fn load_parses_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[viewport]
width = 1920
height = 1080

[retry]
base_delay = "250ms"
max_delay = "4s"
provider_cooldown = "500ms"

[fusion]
vision_weight = 0.6
heuristic_weight = 0.4

[[screenshot_providers]]
name = "render-api"
endpoint = "https://shots.example.com/v1/render"
api_key_env = "RENDER_API_KEY"
response = "bytes"
max_retries = 3

[[vision_providers]]
name = "vision-a"
endpoint = "https://llm.example.com/v1/chat/completions"
model = "vision-large"
"#
        )
        .unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.viewport.width, 1920);
        assert_eq!(cfg.retry.base_delay, Duration::from_millis(250));
        assert!((cfg.fusion.vision_weight - 0.6).abs() < f32::EPSILON);
        assert_eq!(cfg.screenshot_providers.len(), 1);
        assert_eq!(cfg.screenshot_providers[0].response, ResponseMode::Bytes);
        assert_eq!(cfg.screenshot_providers[0].max_retries, 3);
        assert_eq!(cfg.vision_providers[0].max_retries, 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_weights() {
        let cfg = Config {
            fusion: FusionWeights {
                vision_weight: 0.9,
                heuristic_weight: 0.3,
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unreachable_threshold() {
        let cfg = Config {
            validation: ValidationConfig {
                min_score: 90.0,
                base_score: 70.0,
                ..ValidationConfig::default()
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unnamed_provider() {
        let cfg = Config {
            screenshot_providers: vec![ScreenshotProviderSettings {
                name: "".into(),
                endpoint: "https://shots.example.com".into(),
                api_key_env: None,
                response: ResponseMode::JsonUrl,
                max_retries: 2,
            }],
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn effective_capture_applies_viewport() {
        let cfg = Config {
            viewport: Viewport {
                width: 800,
                height: 600,
            },
            ..Config::default()
        };
        let capture = cfg.effective_capture();
        assert_eq!(capture.width, 800);
        assert_eq!(capture.height, 600);
    }
}

//! Screenshot artifact validation.
//!
//! URL references get a HEAD check (reachability + image content type);
//! byte references must carry a decodable image header. Size scoring marks
//! suspiciously small captures (likely blank) and oversized ones.

use std::time::Duration;

use crate::config::ValidationConfig;
use crate::error::{BexError, Result};
use crate::types::{ScreenshotRef, ScreenshotValidation};

pub struct ArtifactValidator {
    http: reqwest::Client,
}

impl ArtifactValidator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BexError::Network)?;
        Ok(Self { http })
    }

    pub async fn validate(
        &self,
        reference: &ScreenshotRef,
        config: &ValidationConfig,
    ) -> ScreenshotValidation {
        match reference {
            ScreenshotRef::Url(url) => self.validate_url(url, config).await,
            ScreenshotRef::Bytes { data, .. } => validate_bytes(data, config),
        }
    }

    async fn validate_url(&self, url: &str, config: &ValidationConfig) -> ScreenshotValidation {
        let response = match self.http.head(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return ScreenshotValidation {
                    is_valid: false,
                    score: 0.0,
                    reasons: vec![format!("HEAD request failed: {e}")],
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ScreenshotValidation {
                is_valid: false,
                score: 0.0,
                reasons: vec![format!("artifact URL returned status {}", status.as_u16())],
            };
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("image/") {
            return ScreenshotValidation {
                is_valid: false,
                score: 0.0,
                reasons: vec![format!("content-type '{content_type}' is not an image")],
            };
        }

        let length = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let (score, reasons) = match length {
            Some(len) => score_size(len, config),
            None => (config.base_score, Vec::new()),
        };

        ScreenshotValidation {
            is_valid: true,
            score,
            reasons,
        }
    }
}

fn validate_bytes(data: &[u8], config: &ValidationConfig) -> ScreenshotValidation {
    if image::guess_format(data).is_err() {
        return ScreenshotValidation {
            is_valid: false,
            score: 0.0,
            reasons: vec!["bytes do not start with a known image header".into()],
        };
    }

    let (score, reasons) = score_size(data.len() as u64, config);
    ScreenshotValidation {
        is_valid: true,
        score,
        reasons,
    }
}

fn score_size(len: u64, config: &ValidationConfig) -> (f32, Vec<String>) {
    let mut score = config.base_score;
    let mut reasons = Vec::new();

    if len < config.min_bytes {
        score -= config.small_penalty;
        reasons.push(format!(
            "capture is {len} bytes (< {}), likely blank",
            config.min_bytes
        ));
    } else if len > config.max_bytes {
        score -= config.large_penalty;
        reasons.push(format!(
            "capture is {len} bytes (> {})",
            config.max_bytes
        ));
    }

    (score.max(0.0), reasons)
}

//! HTTP screenshot rendering providers.
//!
//! Hosted render APIs share one request shape: a GET with the target URL and
//! capture options as query parameters, answered with either a JSON body
//! carrying a hosted image URL or the raw image bytes.

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::chain::{AttemptResult, ProviderFailure};
use crate::config::{ResponseMode, ScreenshotProviderSettings};
use crate::error::{BexError, Result};
use crate::types::ScreenshotRef;

use super::{CaptureConfig, ScreenshotProvider};

#[derive(Debug, Deserialize)]
struct RenderResponse {
    url: String,
}

pub struct HttpScreenshotProvider {
    name: String,
    endpoint: Url,
    api_key: Option<String>,
    response: ResponseMode,
    max_retries: u32,
    http: Client,
}

impl HttpScreenshotProvider {
    pub fn from_settings(settings: &ScreenshotProviderSettings, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)?;

        let api_key = match &settings.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                BexError::Config(format!(
                    "screenshot provider '{}' api key env {var} is unset",
                    settings.name
                ))
            })?),
            None => None,
        };

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BexError::Network)?;

        Ok(Self {
            name: settings.name.clone(),
            endpoint,
            api_key,
            response: settings.response,
            max_retries: settings.max_retries,
            http,
        })
    }

    fn request_url(&self, target: &str, config: &CaptureConfig) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("url", target)
                .append_pair("width", &config.width.to_string())
                .append_pair("height", &config.height.to_string())
                .append_pair("format", config.format.as_str())
                .append_pair("quality", &config.quality.to_string())
                .append_pair("full_page", bool_str(config.full_page))
                .append_pair("wait_until", config.wait_until.as_str())
                .append_pair("block_ads", bool_str(config.block_ads))
                .append_pair("block_cookie_banners", bool_str(config.block_cookie_banners))
                .append_pair("timeout", &config.timeout.as_millis().to_string());
            if let Some(key) = &self.api_key {
                query.append_pair("access_key", key);
            }
        }
        url
    }
}

fn bool_str(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

impl ScreenshotProvider for HttpScreenshotProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn render<'a>(
        &'a self,
        url: &'a str,
        config: &'a CaptureConfig,
    ) -> BoxFuture<'a, AttemptResult<ScreenshotRef>> {
        Box::pin(async move {
            let request_url = self.request_url(url, config);
            let response = self
                .http
                .get(request_url)
                .send()
                .await
                .map_err(|e| ProviderFailure::failed(format!("request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderFailure::failed(format!(
                    "render API returned status {}: {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                )));
            }

            match self.response {
                ResponseMode::JsonUrl => {
                    let body = response
                        .text()
                        .await
                        .map_err(|e| ProviderFailure::failed(format!("body read failed: {e}")))?;
                    let parsed: RenderResponse = serde_json::from_str(&body).map_err(|e| {
                        ProviderFailure::failed(format!("unexpected render API response: {e}"))
                    })?;
                    Ok(ScreenshotRef::Url(parsed.url))
                }
                ResponseMode::Bytes => {
                    let content_type = response
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    let data = response
                        .bytes()
                        .await
                        .map_err(|e| ProviderFailure::failed(format!("body read failed: {e}")))?
                        .to_vec();
                    Ok(ScreenshotRef::Bytes { data, content_type })
                }
            }
        })
    }
}

//! HTTP vision inference providers.
//!
//! Speaks the chat-completions shape most hosted vision models expose: one
//! user message carrying the instruction text plus the screenshot, either as
//! a hosted image URL or an inline base64 data URL.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::chain::{AttemptResult, ProviderFailure};
use crate::config::VisionProviderSettings;
use crate::error::{BexError, Result};
use crate::types::{ScreenshotArtifact, ScreenshotRef};

use super::VisionProvider;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

pub struct HttpVisionProvider {
    name: String,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    max_retries: u32,
    http: Client,
}

impl HttpVisionProvider {
    pub fn from_settings(settings: &VisionProviderSettings, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)?;

        let api_key = match &settings.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                BexError::Config(format!(
                    "vision provider '{}' api key env {var} is unset",
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
            model: settings.model.clone(),
            api_key,
            max_retries: settings.max_retries,
            http,
        })
    }
}

/// Builds the image part of the message from the artifact reference.
fn image_url(reference: &ScreenshotRef) -> String {
    match reference {
        ScreenshotRef::Url(url) => url.clone(),
        ScreenshotRef::Bytes { data, content_type } => {
            let mime = content_type.as_deref().unwrap_or("image/png");
            format!("data:{mime};base64,{}", BASE64.encode(data))
        }
    }
}

impl VisionProvider for HttpVisionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn infer<'a>(
        &'a self,
        artifact: &'a ScreenshotArtifact,
        instructions: &'a str,
    ) -> BoxFuture<'a, AttemptResult<String>> {
        Box::pin(async move {
            let body = json!({
                "model": self.model,
                "max_tokens": 800,
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": instructions },
                        {
                            "type": "image_url",
                            "image_url": { "url": image_url(&artifact.reference) }
                        }
                    ]
                }]
            });

            let mut request = self.http.post(self.endpoint.clone()).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ProviderFailure::failed(format!("request failed: {e}")))?;

            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(ProviderFailure::failed(format!(
                    "inference API returned status {}: {}",
                    status.as_u16(),
                    text.chars().take(200).collect::<String>()
                )));
            }

            let parsed: CompletionResponse = serde_json::from_str(&text).map_err(|e| {
                ProviderFailure::failed(format!("unexpected completion response: {e}"))
            })?;

            parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| ProviderFailure::failed("completion had no choices"))
        })
    }
}

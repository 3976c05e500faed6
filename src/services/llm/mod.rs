// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

pub mod anthropic;
pub mod ollama;
pub mod openai;

use crate::config::{Config, Provider};
use crate::error::{Error, Result};
use crate::services::prompt::ExtractionPrompt;

/// Per-provider wire format for a single vision request.
pub trait LlmProvider: Send + Sync {
    /// Build the HTTP request carrying the prompt and image.
    fn build_request(&self, client: &Client, prompt: &ExtractionPrompt<'_>) -> RequestBuilder;

    /// Pull the model's text out of a successful response body.
    fn parse_response(&self, body: &str) -> Result<String>;

    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

pub fn create_provider(config: &Config) -> Result<Box<dyn LlmProvider>> {
    match config.provider {
        Provider::OpenAI => Ok(Box::new(openai::OpenAiProvider::new(config)?)),
        Provider::Anthropic => Ok(Box::new(anthropic::AnthropicProvider::new(config)?)),
        Provider::Ollama => Ok(Box::new(ollama::OllamaProvider::new(config))),
    }
}

/// HTTP client bound to one provider, built once at startup.
pub struct LlmClient {
    http: Client,
    provider: Box<dyn LlmProvider>,
}

impl LlmClient {
    pub fn new(provider: Box<dyn LlmProvider>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { http, provider })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            create_provider(config)?,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Send one prompt and return the model's raw text.
    pub async fn complete(&self, prompt: &ExtractionPrompt<'_>) -> Result<String> {
        let provider = self.provider.name();

        let response = self
            .provider
            .build_request(&self.http, prompt)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    Error::ProviderUnavailable {
                        provider: provider.into(),
                        message: if e.is_timeout() {
                            "request timed out".into()
                        } else {
                            e.to_string()
                        },
                    }
                } else {
                    Error::Provider {
                        provider: provider.into(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::ProviderUnavailable {
            provider: provider.into(),
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            let message = format!("HTTP {status}: {body}");
            return Err(
                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    Error::ProviderUnavailable {
                        provider: provider.into(),
                        message,
                    }
                } else {
                    Error::Provider {
                        provider: provider.into(),
                        message,
                    }
                },
            );
        }

        debug!(provider, body_len = body.len(), "provider responded");
        self.provider.parse_response(&body)
    }
}

// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::prompt::ExtractionPrompt;

use super::LlmProvider;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text { text: String },
    Image { source: ImageSource<'a> },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Provider {
                provider: "anthropic".into(),
                message: "API key not configured".into(),
            })?;

        Ok(Self {
            base_url: config
                .anthropic_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model_name().to_string(),
            api_key: SecretString::from(api_key),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl LlmProvider for AnthropicProvider {
    fn build_request(&self, client: &Client, prompt: &ExtractionPrompt<'_>) -> RequestBuilder {
        let url = format!("{}/messages", self.base_url);

        client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                system: prompt.system,
                messages: vec![Message {
                    role: "user",
                    content: vec![
                        ContentBlock::Text {
                            text: prompt.user_text(),
                        },
                        ContentBlock::Image {
                            source: ImageSource {
                                source_type: "base64",
                                media_type: &prompt.image.media_type,
                                data: &prompt.image.data,
                            },
                        },
                    ],
                }],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            })
    }

    fn parse_response(&self, body: &str) -> Result<String> {
        let response: MessagesResponse =
            serde_json::from_str(body).map_err(|e| Error::Provider {
                provider: "anthropic".into(),
                message: format!("unexpected response shape: {e}"),
            })?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            return Err(Error::MalformedExtraction(
                "response truncated at max_tokens".into(),
            ));
        }

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(Error::MalformedExtraction("empty response".into()));
        }

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

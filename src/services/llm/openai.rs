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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: String },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: String,
    detail: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Provider {
                provider: "openai".into(),
                message: "API key not configured".into(),
            })?;

        Ok(Self {
            base_url: config
                .openai_base_url
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

impl LlmProvider for OpenAiProvider {
    fn build_request(&self, client: &Client, prompt: &ExtractionPrompt<'_>) -> RequestBuilder {
        let url = format!("{}/chat/completions", self.base_url);

        client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    Message {
                        role: "system",
                        content: vec![ContentPart::Text {
                            text: prompt.system.to_string(),
                        }],
                    },
                    Message {
                        role: "user",
                        content: vec![
                            ContentPart::Text {
                                text: prompt.user_text(),
                            },
                            ContentPart::ImageUrl {
                                image_url: ImageUrl {
                                    url: prompt.image.data_url(),
                                    detail: "high",
                                },
                            },
                        ],
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                response_format: ResponseFormat {
                    format_type: "json_object",
                },
            })
    }

    fn parse_response(&self, body: &str) -> Result<String> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| Error::Provider {
            provider: "openai".into(),
            message: format!("unexpected response shape: {e}"),
        })?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(Error::MalformedExtraction("response had no choices".into()));
        };

        if let Some(refusal) = choice.message.refusal {
            return Err(Error::Provider {
                provider: "openai".into(),
                message: format!("model refused: {refusal}"),
            });
        }

        if choice.finish_reason.as_deref() == Some("length") {
            return Err(Error::MalformedExtraction(
                "response truncated at max_tokens".into(),
            ));
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content.trim().to_string()),
            _ => Err(Error::MalformedExtraction("empty response".into())),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

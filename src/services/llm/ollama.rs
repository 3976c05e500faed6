use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::prompt::ExtractionPrompt;

pub struct OllamaProvider {
    host: String,
    model: String,
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    format: &'static str,
    options: Options,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            // Sanitize: remove trailing slashes to avoid //api/chat
            host: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.model_name().to_string(),
            temperature: config.temperature,
            num_predict: config.max_tokens,
        }
    }
}

impl LlmProvider for OllamaProvider {
    fn build_request(&self, client: &Client, prompt: &ExtractionPrompt<'_>) -> RequestBuilder {
        let url = format!("{}/api/chat", self.host);

        client.post(&url).json(&ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: prompt.system.to_string(),
                    images: Vec::new(),
                },
                Message {
                    role: "user",
                    content: prompt.user_text(),
                    // Ollama takes bare base64, no data: prefix
                    images: vec![prompt.image.data.as_str()],
                },
            ],
            stream: false,
            format: "json",
            options: Options {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
        })
    }

    fn parse_response(&self, body: &str) -> Result<String> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| Error::Provider {
            provider: "ollama".into(),
            message: format!("unexpected response shape: {e}"),
        })?;

        if !response.done {
            return Err(Error::MalformedExtraction("response incomplete".into()));
        }

        let content = response.message.content.trim();
        if content.is_empty() {
            return Err(Error::MalformedExtraction("empty response".into()));
        }

        Ok(content.to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

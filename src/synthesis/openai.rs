//! OpenAI-compatible image synthesis client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::SynthesisConfig;
use crate::error::{AppError, Result};
use crate::fetch::data_url;
use crate::synthesis::traits::{
    ImageSynthesisClient, PatternDescriber, SynthesisPrompt, TemporaryImageLocator,
};

/// Client for the `/v1/images/generations` and `/v1/chat/completions` endpoints
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_model: String,
    chat_model: String,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl OpenAiClient {
    /// Create a new client from configuration
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            image_model: config.image_model.clone(),
            chat_model: config.chat_model.clone(),
        })
    }

    /// POST a JSON body and decode a successful JSON answer, mapping every
    /// failure to `UpstreamSynthesis`.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::UpstreamSynthesis {
                status: None,
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AppError::UpstreamSynthesis {
            status: Some(status.as_u16()),
            message: format!("Failed to read response: {}", e.without_url()),
        })?;

        if !status.is_success() {
            // Prefer the structured upstream message; keep the raw body otherwise.
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(AppError::UpstreamSynthesis {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| AppError::UpstreamSynthesis {
            status: Some(status.as_u16()),
            message: format!("Malformed response: {}", e),
        })
    }
}

#[async_trait]
impl ImageSynthesisClient for OpenAiClient {
    async fn synthesize(&self, prompt: &SynthesisPrompt) -> Result<TemporaryImageLocator> {
        debug!(model = %self.image_model, size = %prompt.size, "Requesting image synthesis");

        let request = ImageGenerationRequest {
            model: &self.image_model,
            prompt: &prompt.text,
            n: 1,
            size: prompt.size.as_str(),
            response_format: "url",
        };

        let response: ImageGenerationResponse =
            self.post_json("/v1/images/generations", &request).await?;

        let image = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::UpstreamSynthesis {
                status: None,
                message: "Response contained no images".to_string(),
            })?;

        match (image.url, image.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(TemporaryImageLocator::new(url)),
            (_, Some(b64)) if !b64.is_empty() => {
                Ok(TemporaryImageLocator::new(data_url::wrap_base64(&b64, "png")))
            }
            _ => Err(AppError::UpstreamSynthesis {
                status: None,
                message: "Response image had neither url nor b64_json".to_string(),
            }),
        }
    }
}

#[async_trait]
impl PatternDescriber for OpenAiClient {
    async fn describe_pattern(&self, garment: &str, request: &str) -> Result<String> {
        debug!(model = %self.chat_model, "Requesting pattern description");

        let body = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(format!(
                        "Describe a creative and clear visual design pattern for a {} based on user request.",
                        garment
                    )),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.to_string()),
                },
            ],
            max_tokens: 100,
        };

        let response: ChatResponse = self.post_json("/v1/chat/completions", &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::UpstreamSynthesis {
                status: None,
                message: "Chat completion returned no content".to_string(),
            })
    }
}

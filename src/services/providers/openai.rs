use super::{ensure_success, join_url, require_api_key, RawProviderResponse, VisionAdapter};
use crate::error::AdapterError;
use crate::models::image::ImagePayload;
use crate::models::settings::{Provider, Settings};
use crate::services::ingestion::to_base64;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Instruction sent alongside the image; asks for the canonical JSON shape
pub const ANALYSIS_PROMPT: &str = "Analyze this image in detail: 1. describe the main content, \
2. list the detected objects, 3. describe the scene, 4. transcribe any visible text. \
Reply with a single JSON object of the form {\"description\": string, \
\"objects\": [{\"name\": string, \"confidence\": number}], \"text\": string or null, \
\"scene\": [{\"label\": string, \"confidence\": number}], \"confidence\": number}, \
with every confidence between 0 and 1.";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-style chat completion adapter with an inline data-URL image
#[derive(Clone)]
pub struct OpenAiAdapter {
    client: reqwest::Client,
}

impl OpenAiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisionAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn analyze(
        &self,
        payload: &ImagePayload,
        settings: &Settings,
    ) -> Result<RawProviderResponse, AdapterError> {
        let api_key = require_api_key(settings, Provider::OpenAi)?;
        let endpoints = &settings.endpoints;
        let url = join_url(&endpoints.openai_base_url, "chat/completions");

        let request = ChatCompletionRequest {
            model: &endpoints.openai_model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: ANALYSIS_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: to_base64(payload, true),
                        },
                    },
                ],
            }],
            max_tokens: endpoints.openai_max_tokens,
        };

        tracing::info!(model = %endpoints.openai_model, bytes = payload.size_bytes(), "sending image to OpenAI");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response, Provider::OpenAi).await?;

        let data: ChatCompletionResponse = response.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::MalformedResponse("no choices in completion".to_string()))?
            .message
            .content
            .unwrap_or_default();

        Ok(RawProviderResponse::OpenAi(content))
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{ChatModel, CompletionRequest, ModelConfig, ResponseFormat};

/// Client for any endpoint speaking the chat-completions wire format.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: Client,
    config: ModelConfig,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = config.completions_url();

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        let response_format = match &request.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonSchema { name, schema } => Some(json!({
                "type": "json_schema",
                "json_schema": {
                    "name": name,
                    "schema": schema,
                    "strict": true
                }
            })),
        };

        ChatCompletionBody {
            model: self.config.model.as_str(),
            messages: [
                WireMessage {
                    role: "system",
                    content: request.instructions.as_str(),
                },
                WireMessage {
                    role: "user",
                    content: request.input.as_str(),
                },
            ],
            response_format,
        }
    }
}

impl ChatModel for OpenAiChatModel {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let mut builder = self.client.post(self.endpoint.as_str());
        if let Some(api_key) = self.config.api_key.as_deref() {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .json(&self.body(&request))
            .send()
            .await
            .context("model request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("model non-success status {}: {}", status.as_u16(), body);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .context("model response parse failed")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("model output text missing")?;

        debug!(model = %self.config.model, chars = content.len(), "model call completed");
        Ok(content)
    }
}

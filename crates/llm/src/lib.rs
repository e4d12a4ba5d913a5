mod config;
mod openai;
mod scripted;

use anyhow::Result;
use serde_json::Value;

pub use config::ModelConfig;
pub use openai::OpenAiChatModel;
pub use scripted::ScriptedChatModel;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    Text,
    JsonSchema { name: String, schema: Value },
}

/// One stateless model call: a system instruction plus the current user text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub instructions: String,
    pub input: String,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn text(instructions: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            input: input.into(),
            response_format: ResponseFormat::Text,
        }
    }

    pub fn structured(
        instructions: impl Into<String>,
        input: impl Into<String>,
        name: impl Into<String>,
        schema: Value,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            input: input.into(),
            response_format: ResponseFormat::JsonSchema {
                name: name.into(),
                schema,
            },
        }
    }
}

pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

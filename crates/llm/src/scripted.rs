use std::collections::HashMap;

use anyhow::{bail, Result};
use parking_lot::Mutex;
use waypoint_core::roster::{specialist_for, TRIAGE_INSTRUCTIONS};
use waypoint_core::Category;

use crate::{ChatModel, CompletionRequest, ResponseFormat};

/// Canned-reply model. Records every request so callers can assert which
/// remote calls a handler made.
#[derive(Debug, Default)]
pub struct ScriptedChatModel {
    guard_reply: Option<String>,
    triage_reply: Option<String>,
    specialist_replies: HashMap<Category, String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guard_reply(mut self, raw: impl Into<String>) -> Self {
        self.guard_reply = Some(raw.into());
        self
    }

    pub fn with_verdict(self, is_travel_question: bool, reasoning: &str) -> Self {
        let raw = serde_json::json!({
            "is_travel_question": is_travel_question,
            "reasoning": reasoning,
        })
        .to_string();
        self.with_guard_reply(raw)
    }

    pub fn with_triage_reply(mut self, raw: impl Into<String>) -> Self {
        self.triage_reply = Some(raw.into());
        self
    }

    pub fn with_specialist_reply(mut self, category: Category, answer: impl Into<String>) -> Self {
        self.specialist_replies.insert(category, answer.into());
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn reply_for(&self, request: &CompletionRequest) -> Result<String> {
        if matches!(request.response_format, ResponseFormat::JsonSchema { .. }) {
            return match &self.guard_reply {
                Some(reply) => Ok(reply.clone()),
                None => bail!("no scripted guard reply"),
            };
        }

        if request.instructions == TRIAGE_INSTRUCTIONS {
            return match &self.triage_reply {
                Some(reply) => Ok(reply.clone()),
                None => bail!("no scripted triage reply"),
            };
        }

        let category = Category::ALL
            .into_iter()
            .find(|category| specialist_for(*category).instructions == request.instructions);
        match category.and_then(|category| self.specialist_replies.get(&category)) {
            Some(reply) => Ok(reply.clone()),
            None => bail!("no scripted reply for instructions: {}", request.instructions),
        }
    }
}

impl ChatModel for ScriptedChatModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let reply = self.reply_for(&request);
        self.calls.lock().push(request);
        reply
    }
}

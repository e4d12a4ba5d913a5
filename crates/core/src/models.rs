use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hotels,
    Transport,
    Food,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Hotels, Self::Transport, Self::Food];

    /// Lowercase substring the triage reply is scanned for.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Hotels => "hotel",
            Self::Transport => "transport",
            Self::Food => "food",
        }
    }

    /// Name the triage step is asked to answer with.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hotels => "Hotels",
            Self::Transport => "Transport",
            Self::Food => "Food",
        }
    }
}

/// Structured reply of the travel guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardVerdict {
    pub is_travel_question: bool,
    pub reasoning: String,
}

impl GuardVerdict {
    pub const SCHEMA_NAME: &'static str = "travel_output";

    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "is_travel_question": {
                    "type": "boolean",
                    "description": "True if the question is about travel services."
                },
                "reasoning": { "type": "string" }
            },
            "required": ["is_travel_question", "reasoning"],
            "additionalProperties": false
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuardOutcome {
    Allowed,
    Blocked { reasoning: String },
}

impl GuardOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub raw: String,
    pub normalized: String,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specialist {
    pub category: Category,
    pub name: &'static str,
    pub handoff_description: &'static str,
    pub instructions: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Assistant,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Greeting,
    Progress,
    Handoff,
    Answer,
    Rejection,
    Fallback,
    UserText,
}

impl MessageKind {
    /// Greeting, answer, rejection and fallback close a handler's output.
    /// Progress and handoff notices are display-only.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Answer | Self::Rejection | Self::Fallback | Self::Greeting
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: Author,
    pub kind: MessageKind,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn assistant(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            author: Author::Assistant,
            kind,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            kind: MessageKind::UserText,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MessageOutcome {
    Blocked {
        reasoning: String,
    },
    Uncategorized {
        triage_text: String,
    },
    Answered {
        category: Category,
        specialist: String,
        answer: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: Option<String>,
    pub text: String,
}

use crate::models::{ChatMessage, MessageKind, Specialist};
use crate::roster::TRIAGE_NAME;

pub const GREETING: &str =
    "👋 Hi! I am your Travel Assistant, Ask me about Hotels, Transport, or Food.";
pub const UNCATEGORIZED: &str = "❓ Sorry, I couldn't categorize your question.";

pub fn greeting() -> ChatMessage {
    ChatMessage::assistant(MessageKind::Greeting, GREETING)
}

pub fn triage_progress(question: &str) -> ChatMessage {
    ChatMessage::assistant(
        MessageKind::Progress,
        format!("🕵️ *{TRIAGE_NAME}* is analyzing your question: '{question}'"),
    )
}

pub fn handoff(specialist: &Specialist) -> ChatMessage {
    ChatMessage::assistant(
        MessageKind::Handoff,
        format!("📡 {TRIAGE_NAME} is handing off to *{}*", specialist.name),
    )
}

pub fn specialist_answer(specialist: &Specialist, answer: &str) -> ChatMessage {
    ChatMessage::assistant(
        MessageKind::Answer,
        format!("🤖 *{}* says: {answer}", specialist.name),
    )
}

pub fn guard_rejection(reasoning: &str) -> ChatMessage {
    ChatMessage::assistant(
        MessageKind::Rejection,
        format!("🚫 *Guardrail Activated!*\nReason: {reasoning}"),
    )
}

pub fn uncategorized() -> ChatMessage {
    ChatMessage::assistant(MessageKind::Fallback, UNCATEGORIZED)
}

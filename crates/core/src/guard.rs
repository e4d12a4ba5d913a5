use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{GuardOutcome, GuardVerdict};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("guard returned an empty verdict")]
    Empty,
    #[error("guard verdict is not valid structured output: {raw}")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn parse_guard_verdict(raw: &str) -> Result<GuardVerdict, VerdictError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VerdictError::Empty);
    }

    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str())
        .unwrap_or(trimmed);

    serde_json::from_str::<GuardVerdict>(body).map_err(|source| VerdictError::Malformed {
        raw: raw.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GuardGate;

impl GuardGate {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, verdict: &GuardVerdict) -> GuardOutcome {
        if verdict.is_travel_question {
            GuardOutcome::Allowed
        } else {
            GuardOutcome::Blocked {
                reasoning: verdict.reasoning.clone(),
            }
        }
    }
}

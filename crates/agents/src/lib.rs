use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};
use waypoint_core::roster::{GUARD_INSTRUCTIONS, TRIAGE_INSTRUCTIONS};
use waypoint_core::{
    messages, parse_guard_verdict, route_category, specialist_for, Category, ChatMessage,
    GuardGate, GuardOutcome, GuardVerdict, MessageOutcome, Specialist, TriageDecision,
};
use waypoint_llm::{ChatModel, CompletionRequest};
use waypoint_observability::AppMetrics;

/// Outbound "send message" operation of the hosting chat surface.
pub trait MessageSink {
    fn send(&mut self, message: ChatMessage);
}

impl MessageSink for Vec<ChatMessage> {
    fn send(&mut self, message: ChatMessage) {
        self.push(message);
    }
}

/// Guard, triage and specialist handoff over one shared model client.
///
/// Holds no per-session or per-message state; every call sees only the
/// current message.
pub struct TravelDesk<M>
where
    M: ChatModel,
{
    model: Arc<M>,
    gate: GuardGate,
    metrics: Arc<AppMetrics>,
}

impl<M> Clone for TravelDesk<M>
where
    M: ChatModel,
{
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            gate: self.gate,
            metrics: self.metrics.clone(),
        }
    }
}

impl<M> TravelDesk<M>
where
    M: ChatModel,
{
    pub fn new(model: Arc<M>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            model,
            gate: GuardGate::new(),
            metrics,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn on_session_start(&self, sink: &mut impl MessageSink) {
        self.metrics.inc_session_started();
        sink.send(messages::greeting());
    }

    #[instrument(skip(self, sink))]
    pub async fn on_message(
        &self,
        text: &str,
        sink: &mut impl MessageSink,
    ) -> Result<MessageOutcome> {
        let started = Instant::now();
        self.metrics.inc_message();

        let result = self.route_message(text, sink).await;
        self.metrics.observe_latency(started.elapsed());
        if result.is_err() {
            self.metrics.inc_failure();
        }
        result
    }

    async fn route_message(
        &self,
        text: &str,
        sink: &mut impl MessageSink,
    ) -> Result<MessageOutcome> {
        sink.send(messages::triage_progress(text));

        if let GuardOutcome::Blocked { reasoning } = self.run_guard(text).await? {
            self.metrics.inc_guard_blocked();
            info!(reasoning = %reasoning, "guard blocked message");
            sink.send(messages::guard_rejection(&reasoning));
            return Ok(MessageOutcome::Blocked { reasoning });
        }

        let decision = self.run_triage(text).await?;
        let Some(category) = decision.category else {
            self.metrics.inc_uncategorized();
            warn!(triage = %decision.raw, "triage reply matched no category");
            sink.send(messages::uncategorized());
            return Ok(MessageOutcome::Uncategorized {
                triage_text: decision.raw,
            });
        };

        let specialist = specialist_for(category);
        sink.send(messages::handoff(specialist));

        let answer = self.run_specialist(specialist, text).await?;
        self.metrics.inc_specialist_answer();
        sink.send(messages::specialist_answer(specialist, &answer));

        Ok(MessageOutcome::Answered {
            category,
            specialist: specialist.name.to_string(),
            answer,
        })
    }

    pub async fn run_guard(&self, question: &str) -> Result<GuardOutcome> {
        let raw = self
            .call(CompletionRequest::structured(
                GUARD_INSTRUCTIONS,
                question,
                GuardVerdict::SCHEMA_NAME,
                GuardVerdict::json_schema(),
            ))
            .await
            .context("guard call failed")?;

        let verdict = parse_guard_verdict(&raw)?;
        let outcome = self.gate.evaluate(&verdict);
        info!(
            is_travel_question = verdict.is_travel_question,
            blocked = outcome.is_blocked(),
            reasoning = %verdict.reasoning,
            "guard verdict"
        );
        Ok(outcome)
    }

    pub async fn run_triage(&self, question: &str) -> Result<TriageDecision> {
        let raw = self
            .call(CompletionRequest::text(TRIAGE_INSTRUCTIONS, question))
            .await
            .context("triage call failed")?;

        let decision = route_category(&raw);
        info!(
            raw = %decision.raw,
            normalized = %decision.normalized,
            category = decision.category.map(Category::label).unwrap_or("none"),
            "triage decision"
        );
        Ok(decision)
    }

    pub async fn run_specialist(&self, specialist: &Specialist, question: &str) -> Result<String> {
        info!(specialist = specialist.name, "handing off");
        self.call(CompletionRequest::text(specialist.instructions, question))
            .await
            .with_context(|| format!("{} call failed", specialist.name))
    }

    async fn call(&self, request: CompletionRequest) -> Result<String> {
        self.metrics.inc_model_call();
        self.model.complete(request).await
    }
}

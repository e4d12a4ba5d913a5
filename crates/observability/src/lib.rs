use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    sessions_started_total: AtomicU64,
    messages_total: AtomicU64,
    model_calls_total: AtomicU64,
    guard_blocked_total: AtomicU64,
    uncategorized_total: AtomicU64,
    specialist_answers_total: AtomicU64,
    failures_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub sessions_started_total: u64,
    pub messages_total: u64,
    pub model_calls_total: u64,
    pub guard_blocked_total: u64,
    pub uncategorized_total: u64,
    pub specialist_answers_total: u64,
    pub failures_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_session_started(&self) {
        self.sessions_started_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_message(&self) {
        self.messages_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_model_call(&self) {
        self.model_calls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_guard_blocked(&self) {
        self.guard_blocked_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_uncategorized(&self) {
        self.uncategorized_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_specialist_answer(&self) {
        self.specialist_answers_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let messages = self.messages_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            sessions_started_total: self.sessions_started_total.load(Ordering::Relaxed),
            messages_total: messages,
            model_calls_total: self.model_calls_total.load(Ordering::Relaxed),
            guard_blocked_total: self.guard_blocked_total.load(Ordering::Relaxed),
            uncategorized_total: self.uncategorized_total.load(Ordering::Relaxed),
            specialist_answers_total: self.specialist_answers_total.load(Ordering::Relaxed),
            failures_total: self.failures_total.load(Ordering::Relaxed),
            avg_latency_millis: if messages == 0 {
                0.0
            } else {
                latency as f64 / messages as f64
            },
        }
    }
}

/// Directives used when `RUST_LOG` is unset.
pub fn default_directives(service_name: &str) -> String {
    format!(
        "{}=info,waypoint_api=info,waypoint_agents=info,waypoint_llm=info",
        service_name
    )
}

pub fn init_tracing(service_name: &str) {
    init_tracing_with(&default_directives(service_name));
}

/// Like [`init_tracing`], with caller-chosen fallback directives.
pub fn init_tracing_with(fallback: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}

mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;
use waypoint_agents::TravelDesk;
use waypoint_core::{ChatInput, ChatMessage, MessageOutcome, VerdictError};
use waypoint_llm::{ChatModel, ModelConfig, OpenAiChatModel};
use waypoint_observability::AppMetrics;

pub use crate::rate_limit::IpRateLimiter;

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub model: ModelConfig,
    pub api_key: String,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let api_key =
            env::var("WAYPOINT_API_KEY").unwrap_or_else(|_| "dev-waypoint-key".to_string());
        let rate_limit_window = Duration::from_secs(
            env::var("WAYPOINT_RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60),
        );
        let rate_limit_max = env::var("WAYPOINT_RATE_LIMIT_MAX")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(30);

        Self {
            model: ModelConfig::from_env(),
            api_key,
            rate_limit_window,
            rate_limit_max,
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub desk: Arc<TravelDesk<OpenAiChatModel>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    model: String,
    metrics: waypoint_observability::MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct SessionStartResponse {
    session_id: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    session_id: String,
    outcome: MessageOutcome,
    messages: Vec<ChatMessage>,
}

pub fn build_app(config: ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let model = Arc::new(OpenAiChatModel::new(config.model)?);
    let desk = Arc::new(TravelDesk::new(model, metrics.clone()));

    let state = ApiState {
        desk,
        metrics,
        api_key: config.api_key,
        limiter: IpRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/session/start", post(session_start))
        .route("/v1/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        model: state.desk.model().model_name().to_string(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn session_start(State(state): State<ApiState>) -> impl IntoResponse {
    let session_id = Uuid::new_v4().to_string();
    let mut messages: Vec<ChatMessage> = Vec::new();
    state.desk.on_session_start(&mut messages);

    info!(session_id = %session_id, "session started");
    (
        StatusCode::OK,
        Json(SessionStartResponse {
            session_id,
            messages,
        }),
    )
}

async fn chat(State(state): State<ApiState>, Json(input): Json<ChatInput>) -> Response {
    if input.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "empty_message",
                "message": "text must not be empty"
            })),
        )
            .into_response();
    }

    let session_id = input
        .session_id
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut messages: Vec<ChatMessage> = Vec::new();

    match state.desk.on_message(&input.text, &mut messages).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ChatResponse {
                session_id,
                outcome,
                messages,
            }),
        )
            .into_response(),
        Err(err) => {
            error!(session_id = %session_id, error = %format!("{err:#}"), "message handling failed");
            let code = if err.downcast_ref::<VerdictError>().is_some() {
                "malformed_guard_verdict"
            } else {
                "chat_failed"
            };
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": code,
                    "message": format!("{err:#}"),
                    "session_id": session_id,
                })),
            )
                .into_response()
        }
    }
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if request.method() == Method::OPTIONS || is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

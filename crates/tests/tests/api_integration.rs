use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use waypoint_api::{build_app, ApiConfig};
use waypoint_core::roster::{
    FOOD_SPECIALIST, GUARD_INSTRUCTIONS, HOTEL_SPECIALIST, TRIAGE_INSTRUCTIONS,
};
use waypoint_llm::ModelConfig;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

/// Matches chat-completions calls by their system instruction.
struct SystemPrompt(&'static str);

impl Match for SystemPrompt {
    fn matches(&self, request: &wiremock::Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|body| {
                body.pointer("/messages/0/content")
                    .and_then(Value::as_str)
                    .map(|content| content == self.0)
            })
            .unwrap_or(false)
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    }))
}

fn verdict(is_travel_question: bool, reasoning: &str) -> ResponseTemplate {
    completion(
        &json!({
            "is_travel_question": is_travel_question,
            "reasoning": reasoning
        })
        .to_string(),
    )
}

async fn mount(server: &MockServer, prompt: &'static str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1beta/openai/chat/completions"))
        .and(SystemPrompt(prompt))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

fn app_for(server: &MockServer) -> Router {
    build_app(ApiConfig {
        model: ModelConfig::new(
            Some("test-key".to_string()),
            format!("{}/v1beta/openai/", server.uri()),
            "gemini-2.5-flash",
        ),
        api_key: API_KEY.to_string(),
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 100,
    })
    .expect("app should build")
}

fn chat_request(text: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(json!({ "text": text }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = json_body(response).await;
    assert_eq!(parsed["model"], "gemini-2.5-flash");
}

#[tokio::test]
async fn chat_requires_api_key() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "Where can I find a cheap hostel?" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_start_sends_greeting() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/session/start")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert!(parsed["session_id"].as_str().is_some());
    assert_eq!(parsed["messages"].as_array().unwrap().len(), 1);
    assert_eq!(
        parsed["messages"][0]["content"],
        "👋 Hi! I am your Travel Assistant, Ask me about Hotels, Transport, or Food."
    );
}

#[tokio::test]
async fn hostel_question_is_answered_by_hotel_representative() {
    let server = MockServer::start().await;
    mount(&server, GUARD_INSTRUCTIONS, verdict(true, "Asks about lodging."), 1).await;
    mount(&server, TRIAGE_INSTRUCTIONS, completion("Hotels"), 1).await;
    mount(
        &server,
        HOTEL_SPECIALIST.instructions,
        completion("Check hostels near the old town."),
        1,
    )
    .await;
    let app = app_for(&server);

    let response = app
        .oneshot(chat_request("Where can I find a cheap hostel?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["outcome"]["result"], "answered");
    assert_eq!(parsed["outcome"]["category"], "hotels");

    let messages = parsed["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages[1]["content"],
        "📡 Triage Agent is handing off to *Hotel Representative*"
    );
    assert_eq!(
        messages[2]["content"],
        "🤖 *Hotel Representative* says: Check hostels near the old town."
    );
}

#[tokio::test]
async fn non_travel_question_is_rejected_without_further_calls() {
    let server = MockServer::start().await;
    mount(
        &server,
        GUARD_INSTRUCTIONS,
        verdict(false, "The question is about geography, not travel services."),
        1,
    )
    .await;
    mount(&server, TRIAGE_INSTRUCTIONS, completion("Hotels"), 0).await;
    let app = app_for(&server);

    let response = app
        .oneshot(chat_request("What's the capital of France?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["outcome"]["result"], "blocked");
    let last = parsed["messages"].as_array().unwrap().last().cloned().unwrap();
    assert_eq!(
        last["content"],
        "🚫 *Guardrail Activated!*\nReason: The question is about geography, not travel services."
    );
}

#[tokio::test]
async fn unrecognized_triage_reply_gets_fallback() {
    let server = MockServer::start().await;
    mount(&server, GUARD_INSTRUCTIONS, verdict(true, "travel"), 1).await;
    mount(&server, TRIAGE_INSTRUCTIONS, completion("Museums"), 1).await;
    mount(&server, FOOD_SPECIALIST.instructions, completion("unused"), 0).await;
    let app = app_for(&server);

    let response = app.oneshot(chat_request("Any good museums?")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["outcome"]["result"], "uncategorized");
    assert_eq!(parsed["outcome"]["triage_text"], "Museums");
    let last = parsed["messages"].as_array().unwrap().last().cloned().unwrap();
    assert_eq!(last["content"], "❓ Sorry, I couldn't categorize your question.");
}

#[tokio::test]
async fn malformed_verdict_is_reported_as_distinct_error() {
    let server = MockServer::start().await;
    mount(&server, GUARD_INSTRUCTIONS, completion("yes it is travel"), 1).await;
    mount(&server, TRIAGE_INSTRUCTIONS, completion("Hotels"), 0).await;
    let app = app_for(&server);

    let response = app.oneshot(chat_request("Train to Lyon?")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let parsed = json_body(response).await;
    assert_eq!(parsed["error"], "malformed_guard_verdict");
}

#[tokio::test]
async fn remote_failure_propagates() {
    let server = MockServer::start().await;
    mount(
        &server,
        GUARD_INSTRUCTIONS,
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
        1,
    )
    .await;
    let app = app_for(&server);

    let response = app.oneshot(chat_request("Bus to the airport?")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let parsed = json_body(response).await;
    assert_eq!(parsed["error"], "chat_failed");
    assert!(parsed["message"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn blank_message_is_rejected_locally() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let response = app.oneshot(chat_request("   ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn identical_messages_are_classified_independently() {
    let server = MockServer::start().await;
    mount(&server, GUARD_INSTRUCTIONS, verdict(true, "food"), 2).await;
    mount(&server, TRIAGE_INSTRUCTIONS, completion("Food"), 2).await;
    mount(&server, FOOD_SPECIALIST.instructions, completion("Try the night market."), 2).await;
    let app = app_for(&server);

    for session in ["session-a", "session-b"] {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .header("x-api-key", API_KEY)
            .body(Body::from(
                json!({ "session_id": session, "text": "Where should I eat tonight?" }).to_string(),
            ))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let parsed = json_body(response).await;
        assert_eq!(parsed["session_id"], session);
        assert_eq!(parsed["outcome"]["specialist"], "Food Representative");
    }
}

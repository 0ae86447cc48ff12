//! End-to-end test of the wizard REST API: real server, real HTTP client,
//! real submission dispatch to a capture endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use quoteflow::api::{AppState, app_routes};
use quoteflow::chatbot::{ChatbotEngine, CommandHandlers};
use quoteflow::error::LlmError;
use quoteflow::graph::catalog::insurance_graph;
use quoteflow::llm::{
    CompletionRequest, CompletionResponse, LlmProvider, ToolCompletionRequest,
    ToolCompletionResponse,
};
use quoteflow::submit::HttpDispatcher;
use quoteflow::wizard::manager::SessionManager;

/// LLM stub that answers every chatbot query with a fixed line.
struct CannedLlm;

#[async_trait]
impl LlmProvider for CannedLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            content: "Canned phrasing.".to_string(),
        })
    }

    async fn complete_with_tools(
        &self,
        _request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse, LlmError> {
        Ok(ToolCompletionResponse {
            content: Some("The funnel looks healthy.".to_string()),
            tool_calls: vec![],
        })
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

/// Spawn a capture endpoint that records submission payloads.
async fn spawn_submission_receiver() -> (SocketAddr, Arc<Mutex<Vec<Value>>>) {
    let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

    async fn receive(State(received): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>) {
        received.lock().await.push(body);
    }

    let app = Router::new()
        .route("/leads", post(receive))
        .with_state(Arc::clone(&received));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (addr, received)
}

/// Spawn the application under test. Returns its base URL.
async fn spawn_app(submission_url: String) -> String {
    let graph = Arc::new(insurance_graph().unwrap());
    let wizard = Arc::new(SessionManager::new(
        graph,
        Arc::new(HttpDispatcher::new(submission_url)),
    ));
    let chatbot = Arc::new(ChatbotEngine::new(
        Arc::new(CannedLlm),
        CommandHandlers::new(Arc::clone(&wizard)),
        10,
    ));
    let app = app_routes(AppState { wizard, chatbot });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

async fn answer(client: &reqwest::Client, base: &str, session: &str, value: Value) -> Value {
    let response = client
        .post(format!("{base}/api/wizard/sessions/{session}/answer"))
        .json(&json!({ "value": value }))
        .send()
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "answer {value} rejected: {}",
        response.status()
    );
    response.json().await.unwrap()
}

#[tokio::test]
async fn full_life_quote_flow_over_http() {
    let (receiver_addr, received) = spawn_submission_receiver().await;
    let base = spawn_app(format!("http://{receiver_addr}/leads")).await;
    let client = reqwest::Client::new();

    // Create a session.
    let response = client
        .post(format!("{base}/api/wizard/sessions"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let view: Value = response.json().await.unwrap();
    let session = view["session_id"].as_str().unwrap().to_string();
    assert_eq!(view["step"]["id"], "start");

    // Walk the life branch.
    let view = answer(&client, &base, &session, json!("life")).await;
    assert_eq!(view["step"]["id"], "life-coverage-level");
    answer(&client, &base, &session, json!("comprehensive")).await;
    answer(&client, &base, &session, json!(500_000.0)).await;
    answer(&client, &base, &session, json!("25-34")).await;
    answer(&client, &base, &session, json!("no")).await;
    let view = answer(
        &client,
        &base,
        &session,
        json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+1 555 010 7788",
            "postcode": "94107"
        }),
    )
    .await;

    // Terminal step carries the quote.
    assert_eq!(view["step"]["id"], "results");
    assert_eq!(view["quote"]["monthly_premium"], "63.36");

    // Re-render the results view; the quote is stable.
    let response = client
        .get(format!("{base}/api/wizard/sessions/{session}/step"))
        .send()
        .await
        .unwrap();
    let again: Value = response.json().await.unwrap();
    assert_eq!(again["quote"]["monthly_premium"], "63.36");

    // Exactly one submission arrived, carrying the snapshot.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["form"]["insurance-type"], "life");
    assert_eq!(received[0]["form"]["contact-details"]["email"], "ada@example.com");
    assert_eq!(received[0]["session_id"].as_str().unwrap(), session);
}

#[tokio::test]
async fn back_navigation_and_validation_over_http() {
    let (receiver_addr, _received) = spawn_submission_receiver().await;
    let base = spawn_app(format!("http://{receiver_addr}/leads")).await;
    let client = reqwest::Client::new();

    let view: Value = client
        .post(format!("{base}/api/wizard/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session = view["session_id"].as_str().unwrap().to_string();

    // Rejected answer: not one of the options.
    let response = client
        .post(format!("{base}/api/wizard/sessions/{session}/answer"))
        .json(&json!({ "value": "spaceship" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    // Valid answer, then back to start.
    answer(&client, &base, &session, json!("solar")).await;
    let response = client
        .post(format!("{base}/api/wizard/sessions/{session}/back"))
        .send()
        .await
        .unwrap();
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["step"]["id"], "start");
    assert_eq!(view["depth"], 0);

    // Back at the first step is a no-op.
    let response = client
        .post(format!("{base}/api/wizard/sessions/{session}/back"))
        .send()
        .await
        .unwrap();
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["step"]["id"], "start");

    // Unknown session is a 404.
    let response = client
        .get(format!(
            "{base}/api/wizard/sessions/00000000-0000-0000-0000-000000000000/step"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn chatbot_endpoint_replies() {
    let (receiver_addr, _received) = spawn_submission_receiver().await;
    let base = spawn_app(format!("http://{receiver_addr}/leads")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/ai/chatbot"))
        .json(&json!({ "query": "how is the funnel doing?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["content"], "The funnel looks healthy.");
    assert!(reply["id"].is_string());
    assert!(reply["timestamp"].is_string());

    // Omitting the conversation id mints a fresh one per request, so two
    // anonymous callers never share a history window.
    let first = reply["conversation_id"].as_str().unwrap().to_string();
    let reply: Value = client
        .post(format!("{base}/api/ai/chatbot"))
        .json(&json!({ "query": "and campaigns?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second = reply["conversation_id"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    // An explicit conversation id is echoed back unchanged.
    let reply: Value = client
        .post(format!("{base}/api/ai/chatbot"))
        .json(&json!({ "query": "more detail please", "conversation_id": first }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["conversation_id"], first.as_str());
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use fitplan_api::config::Config;
use fitplan_api::db::{Database, FirestoreDb, MemoryDb};
use fitplan_api::error::AppError;
use fitplan_api::routes::create_router;
use fitplan_api::services::{CompletionClient, CompletionRequest, WebhookVerifier};
use fitplan_api::AppState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
/// Completion client that replays canned replies in order and records
/// every request it receives.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl ScriptedCompletion {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Completion("No scripted reply left".to_string()))
    }
}

/// Test app wiring.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub completion: Arc<ScriptedCompletion>,
}

/// Create a test app backed by the in-memory store.
#[allow(dead_code)]
pub fn create_test_app<I, S>(replies: I) -> TestApp
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    create_test_app_with_db(Arc::new(MemoryDb::new()), replies)
}

/// Create a test app on top of a specific store.
#[allow(dead_code)]
pub fn create_test_app_with_db<I, S>(db: Arc<dyn Database>, replies: I) -> TestApp
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = Config::test_default();
    let webhook_verifier =
        WebhookVerifier::new(&config.clerk_webhook_secret).expect("test secret is valid");
    let completion = Arc::new(ScriptedCompletion::new(replies));

    let state = Arc::new(AppState {
        config,
        db,
        completion: completion.clone(),
        webhook_verifier,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        completion,
    }
}

/// Build a correctly signed Clerk webhook request.
#[allow(dead_code)]
pub fn signed_clerk_request(state: &AppState, body: &serde_json::Value) -> Request<Body> {
    let body = serde_json::to_vec(body).unwrap();
    let msg_id = "msg_2Lh9KRb6pzN4ayGQ5nOPJTzqWbP";
    let timestamp = chrono::Utc::now().timestamp();
    let signature = state.webhook_verifier.sign(msg_id, timestamp, &body);

    Request::builder()
        .method("POST")
        .uri("/clerk-webhook")
        .header("content-type", "application/json")
        .header("svix-id", msg_id)
        .header("svix-timestamp", timestamp.to_string())
        .header("svix-signature", signature)
        .body(Body::from(body))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Read a response body as text.
#[allow(dead_code)]
pub async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Workout reply in the documented shape.
#[allow(dead_code)]
pub fn workout_reply() -> String {
    serde_json::json!({
        "schedule": ["Monday", "Wednesday", "Friday"],
        "exercises": [
            {
                "day": "Monday",
                "routines": [
                    { "name": "Bench Press", "sets": 4, "reps": 8 },
                    { "name": "Push-ups", "sets": 3, "reps": 15 }
                ]
            },
            {
                "day": "Wednesday",
                "routines": [{ "name": "Squat", "sets": 5, "reps": 5 }]
            }
        ]
    })
    .to_string()
}

/// Diet reply in the documented shape.
#[allow(dead_code)]
pub fn diet_reply() -> String {
    serde_json::json!({
        "dailyCalories": 2600,
        "meals": [
            { "name": "Breakfast", "foods": ["Oatmeal with berries", "Greek yogurt"] },
            { "name": "Dinner", "foods": ["Salmon", "Brown rice", "Broccoli"] }
        ]
    })
    .to_string()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use fitplan_api::error::AppError;
use fitplan_api::services::normalize_workout_plan;

mod common;
use common::body_json;

#[test]
fn test_error_status_mapping() {
    assert_eq!(
        AppError::BadRequest("x".to_string()).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::NotFound("plan".to_string()).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::Completion("HTTP 503".to_string()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Database("down".to_string()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_invalid_plan_response_has_details() {
    let shape_error = normalize_workout_plan(&serde_json::json!({})).unwrap_err();
    let response = AppError::from(shape_error).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_plan");
    assert!(json["details"].as_str().unwrap().contains("workout plan"));
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let response = AppError::Database("connection refused to 10.0.0.3".to_string()).into_response();

    let json = body_json(response).await;
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());
}

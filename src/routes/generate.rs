// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan generation route, called by the voice assistant at the end of a call.

use crate::error::AppError;
use crate::models::{DietPlan, NewPlan, OwnerEmail, WorkoutPlan};
use crate::services::generator::{generate_plans, FitnessProfile};
use crate::time_utils::format_plan_date;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/vapi/generate-program", post(generate_program))
}

/// Request body: the owner's email plus a free-form fitness profile.
#[derive(Deserialize, Debug)]
struct GenerateProgramRequest {
    /// Any JSON; only a non-blank string is accepted
    user_email: Option<serde_json::Value>,
    #[serde(flatten)]
    profile: FitnessProfile,
}

/// Successful generation result.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeneratedProgram {
    pub plan_id: String,
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
}

/// `{success, data}` on success, `{success, error}` on failure.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GenerateProgramResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GeneratedProgram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generate, store and return a new active plan.
///
/// Every failure, including a missing `user_email`, is reported as a 500
/// with `{success: false, error}`; the voice assistant only distinguishes
/// success from failure.
async fn generate_program(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match run(&state, &body).await {
        Ok(program) => (
            StatusCode::OK,
            Json(GenerateProgramResponse {
                success: true,
                data: Some(program),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Error generating fitness plan");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateProgramResponse {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

async fn run(state: &AppState, body: &[u8]) -> Result<GeneratedProgram, AppError> {
    let request: GenerateProgramRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed request body: {}", e)))?;

    let user_email = request
        .user_email
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(OwnerEmail::parse)
        .ok_or_else(|| {
            AppError::BadRequest("Missing required user_email in request payload".to_string())
        })?;

    tracing::info!(
        user_email = %user_email,
        fitness_goal = %request.profile.goal_label(),
        "Plan generation requested"
    );

    let plans = generate_plans(state.completion.as_ref(), &request.profile).await?;

    let name = format!(
        "{} Plan - {}",
        request.profile.goal_label(),
        format_plan_date(chrono::Utc::now())
    );

    let plan_id = state
        .db
        .create_plan(NewPlan {
            user_email: user_email.clone(),
            name,
            workout_plan: plans.workout_plan.clone(),
            diet_plan: plans.diet_plan.clone(),
            is_active: true,
        })
        .await?;

    tracing::info!(plan_id = %plan_id, user_email = %user_email, "Plan created");

    Ok(GeneratedProgram {
        plan_id,
        workout_plan: plans.workout_plan,
        diet_plan: plans.diet_plan,
    })
}

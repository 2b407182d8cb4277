// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan read routes for the frontend.

use crate::error::{AppError, Result};
use crate::models::{OwnerEmail, Plan};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plans", get(get_user_plans))
        .route("/plans/active", get(get_active_plan))
}

#[derive(Deserialize)]
struct PlansQuery {
    #[serde(default)]
    user_email: String,
}

impl PlansQuery {
    fn owner(&self) -> Result<OwnerEmail> {
        OwnerEmail::parse(&self.user_email)
            .ok_or_else(|| AppError::BadRequest("user_email is required".to_string()))
    }
}

/// All plans for an owner, newest first.
async fn get_user_plans(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlansQuery>,
) -> Result<Json<Vec<Plan>>> {
    let owner = params.owner()?;
    let plans = state.db.get_user_plans(&owner).await?;
    Ok(Json(plans))
}

/// The owner's active plan.
async fn get_active_plan(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlansQuery>,
) -> Result<Json<Plan>> {
    let owner = params.owner()?;
    state
        .db
        .get_active_plan(&owner)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No active plan for {}", owner)))
}

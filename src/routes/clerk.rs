// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for Clerk user events (delivered via Svix).

use crate::models::{User, UserUpdate};
use crate::services::svix::SvixHeaders;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/clerk-webhook", post(handle_event))
}

/// Clerk event envelope.
#[derive(Deserialize, Debug)]
struct ClerkEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// The subset of a Clerk user object we mirror.
#[derive(Deserialize, Debug)]
struct ClerkUserData {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
}

#[derive(Deserialize, Debug)]
struct ClerkEmailAddress {
    email_address: String,
}

impl ClerkUserData {
    /// "first last" with missing parts dropped.
    fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.as_str())
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn svix_headers(headers: &HeaderMap) -> Option<SvixHeaders<'_>> {
    Some(SvixHeaders {
        id: header(headers, "svix-id")?,
        timestamp: header(headers, "svix-timestamp")?,
        signature: header(headers, "svix-signature")?,
    })
}

/// Handle incoming webhook events (POST).
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let Some(svix) = svix_headers(&headers) else {
        tracing::warn!("Webhook rejected: missing svix headers");
        return (StatusCode::BAD_REQUEST, "No svix headers found");
    };

    if let Err(e) = state.webhook_verifier.verify(svix, &body) {
        tracing::warn!(
            error = %e,
            svix_id = %svix.id,
            "Webhook rejected: signature verification failed"
        );
        return (StatusCode::BAD_REQUEST, "Error occurred");
    }

    let event: ClerkEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse webhook event");
            return (StatusCode::BAD_REQUEST, "Invalid event payload");
        }
    };

    tracing::info!(
        event_type = %event.event_type,
        svix_id = %svix.id,
        "Webhook event verified"
    );

    let is_create = match event.event_type.as_str() {
        "user.created" => true,
        "user.updated" => false,
        other => {
            tracing::debug!(event_type = %other, "Ignoring unhandled event type");
            return (StatusCode::OK, "Webhooks processed successfully");
        }
    };

    let data: ClerkUserData = match serde_json::from_value(event.data) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse user data");
            return (StatusCode::BAD_REQUEST, "Invalid user data");
        }
    };

    let Some(email) = data.primary_email().map(str::to_string) else {
        tracing::warn!(clerk_id = %data.id, "User event without an email address");
        return (StatusCode::BAD_REQUEST, "User has no email address");
    };
    let name = data.display_name();

    if is_create {
        let user = User {
            clerk_id: data.id,
            name,
            email,
            image: data.image_url,
        };

        if let Err(e) = state.db.sync_user(&user).await {
            tracing::error!(error = %e, clerk_id = %user.clerk_id, "Error creating user");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error creating user");
        }
        tracing::info!(clerk_id = %user.clerk_id, "User synced");
    } else {
        let update = UserUpdate {
            name,
            email,
            image: data.image_url,
        };

        match state.db.update_user(&data.id, update).await {
            Ok(true) => tracing::info!(clerk_id = %data.id, "User updated"),
            Ok(false) => {
                tracing::warn!(clerk_id = %data.id, "Update for unknown user ignored");
            }
            Err(e) => {
                tracing::error!(error = %e, clerk_id = %data.id, "Error updating user");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Error updating user");
            }
        }
    }

    (StatusCode::OK, "Webhooks processed successfully")
}

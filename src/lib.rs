// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitplan: AI-generated workout and diet plans
//!
//! This crate provides the backend API that mirrors Clerk users, generates
//! plans through a chat completion model, and stores them per owner.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{CompletionClient, WebhookVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub completion: Arc<dyn CompletionClient>,
    pub webhook_verifier: WebhookVerifier,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod completion;
pub mod generator;
pub mod normalizer;
pub mod svix;

pub use completion::{CompletionClient, CompletionRequest, GroqClient};
pub use generator::{generate_plans, FitnessProfile, GeneratedPlans};
pub use normalizer::{normalize_diet_plan, normalize_workout_plan, Normalized, PlanShapeError};
pub use svix::{SignatureError, SvixHeaders, WebhookVerifier};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod plan;
pub mod user;

pub use plan::{DietPlan, Exercise, Meal, NewPlan, OwnerEmail, Plan, Routine, WorkoutPlan};
pub use user::{User, UserUpdate};

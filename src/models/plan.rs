// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness plan model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Email address identifying a plan's owner.
///
/// This is a logical pointer to `User.email`, not a foreign key: neither
/// store checks that a user with this email exists. Referential integrity,
/// where wanted, is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct OwnerEmail(String);

impl OwnerEmail {
    /// Accept any non-blank string, trimmed.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single exercise entry within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Routine {
    pub name: String,
    pub sets: i64,
    pub reps: i64,
}

/// Routines for one training day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    pub day: String,
    pub routines: Vec<Routine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutPlan {
    /// Training day names, in order
    pub schedule: Vec<String>,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Meal {
    pub name: String,
    pub foods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DietPlan {
    pub daily_calories: f64,
    pub meals: Vec<Meal>,
}

/// Stored plan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Plan {
    /// Generated plan ID (also used as document ID)
    pub id: String,
    /// Owner reference
    pub user_email: OwnerEmail,
    /// Display name, e.g. "Build muscle Plan - 3/14/2026"
    pub name: String,
    /// At most one plan per owner is active
    pub is_active: bool,
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
    /// Insertion time (RFC 3339, millisecond precision); drives newest-first ordering
    pub created_at: String,
}

/// Input to `Database::create_plan`.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub user_email: OwnerEmail,
    pub name: String,
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
    pub is_active: bool,
}

impl NewPlan {
    /// Materialize the stored record with a fresh ID.
    pub fn into_plan(self, created_at: String) -> Plan {
        Plan {
            id: uuid::Uuid::new_v4().to_string(),
            user_email: self.user_email,
            name: self.name,
            is_active: self.is_active,
            workout_plan: self.workout_plan,
            diet_plan: self.diet_plan,
            created_at,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Projection of model-generated JSON into fixed-shape plan records.
//!
//! Both projections whitelist fields: anything the model adds beyond the
//! documented shape is dropped. Structural problems (missing `exercises`,
//! `schedule` not a list of strings, non-numeric `dailyCalories`, ...) are
//! rejected with a [`PlanShapeError`]. Workout `sets`/`reps` are the only
//! coerced fields; each coercion is reported back so callers can log it.

use crate::models::{DietPlan, Exercise, Routine, WorkoutPlan};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Fallback when `sets` is missing or not a usable number.
pub const DEFAULT_SETS: i64 = 1;
/// Fallback when `reps` is missing or not a usable number.
pub const DEFAULT_REPS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Workout,
    Diet,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Workout => f.write_str("workout"),
            PlanKind::Diet => f.write_str("diet"),
        }
    }
}

/// Generated JSON did not have the documented structure.
#[derive(Debug, thiserror::Error)]
#[error("{kind} plan has unexpected shape: {source}")]
pub struct PlanShapeError {
    pub kind: PlanKind,
    source: serde_json::Error,
}

/// A `sets`/`reps` value that was not already an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    /// Path of the field, e.g. `exercises[0].routines[2].reps`
    pub field: String,
    /// Value as generated
    pub raw: Value,
    /// Value stored
    pub value: i64,
}

/// A normalized plan plus the coercions applied to produce it.
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub plan: T,
    pub coercions: Vec<Coercion>,
}

#[derive(Deserialize)]
struct RawWorkoutPlan {
    schedule: Vec<String>,
    exercises: Vec<RawExercise>,
}

#[derive(Deserialize)]
struct RawExercise {
    day: String,
    routines: Vec<RawRoutine>,
}

#[derive(Deserialize)]
struct RawRoutine {
    name: String,
    #[serde(default)]
    sets: Value,
    #[serde(default)]
    reps: Value,
}

/// Normalize a generated workout plan.
pub fn normalize_workout_plan(value: &Value) -> Result<Normalized<WorkoutPlan>, PlanShapeError> {
    let raw = RawWorkoutPlan::deserialize(value).map_err(|source| PlanShapeError {
        kind: PlanKind::Workout,
        source,
    })?;

    let mut coercions = Vec::new();
    let exercises = raw
        .exercises
        .into_iter()
        .enumerate()
        .map(|(i, exercise)| Exercise {
            day: exercise.day,
            routines: exercise
                .routines
                .into_iter()
                .enumerate()
                .map(|(j, routine)| {
                    let path = format!("exercises[{i}].routines[{j}]");
                    Routine {
                        name: routine.name,
                        sets: coerce_count(
                            routine.sets,
                            DEFAULT_SETS,
                            format!("{path}.sets"),
                            &mut coercions,
                        ),
                        reps: coerce_count(
                            routine.reps,
                            DEFAULT_REPS,
                            format!("{path}.reps"),
                            &mut coercions,
                        ),
                    }
                })
                .collect(),
        })
        .collect();

    Ok(Normalized {
        plan: WorkoutPlan {
            schedule: raw.schedule,
            exercises,
        },
        coercions,
    })
}

/// Normalize a generated diet plan. Pure projection, nothing is coerced.
pub fn normalize_diet_plan(value: &Value) -> Result<Normalized<DietPlan>, PlanShapeError> {
    let plan = DietPlan::deserialize(value).map_err(|source| PlanShapeError {
        kind: PlanKind::Diet,
        source,
    })?;

    Ok(Normalized {
        plan,
        coercions: Vec::new(),
    })
}

/// Integers pass through unchanged (zero and negatives included). Floats are
/// truncated. Strings take their leading integer, and a result of zero or no
/// digits at all falls back to `default`. Any other JSON type takes `default`.
fn coerce_count(raw: Value, default: i64, field: String, coercions: &mut Vec<Coercion>) -> i64 {
    let value = match &raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return i;
            }
            match n.as_u64() {
                Some(_) => i64::MAX,
                // `as` saturates at the i64 bounds
                None => n.as_f64().map_or(default, |f| f.trunc() as i64),
            }
        }
        Value::String(s) => parse_leading_int(s)
            .filter(|n| *n != 0)
            .unwrap_or(default),
        _ => default,
    };

    coercions.push(Coercion { field, raw, value });
    value
}

/// Parse an optionally signed run of leading digits, ignoring leading
/// whitespace and anything after the digits.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

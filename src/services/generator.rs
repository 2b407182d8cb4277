// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout and diet plan generation.
//!
//! Builds one prompt per plan from the caller's fitness profile, runs the
//! two completions one after the other, parses each reply as JSON and
//! normalizes it. Nothing is persisted here.

use crate::error::AppError;
use crate::models::{DietPlan, WorkoutPlan};
use crate::services::completion::{CompletionClient, CompletionRequest, PLAN_TEMPERATURE};
use crate::services::normalizer::{
    normalize_diet_plan, normalize_workout_plan, Coercion, PlanKind,
};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

const WORKOUT_SYSTEM_PROMPT: &str = "You are an expert fitness coach. Reply with a single valid \
JSON object that strictly follows the schema in the user message. Do not write anything outside \
the JSON.";

const DIET_SYSTEM_PROMPT: &str = "You are an expert nutrition coach. Reply with a single valid \
JSON object that strictly follows the schema in the user message. Do not write anything outside \
the JSON.";

const NOT_SPECIFIED: &str = "not specified";

/// Free-form profile collected by the voice assistant.
///
/// Values arrive as whatever JSON the assistant produced (numbers, strings,
/// lists), so each field is kept as raw JSON and only rendered into prompts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FitnessProfile {
    pub age: Option<Value>,
    pub height: Option<Value>,
    pub weight: Option<Value>,
    pub injuries: Option<Value>,
    pub workout_days: Option<Value>,
    pub fitness_goal: Option<Value>,
    pub fitness_level: Option<Value>,
    pub dietary_restrictions: Option<Value>,
}

/// Both generated plans, normalized.
#[derive(Debug, Clone)]
pub struct GeneratedPlans {
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
}

/// Render a profile value for a prompt: strings verbatim, other JSON as JSON.
fn render(value: &Option<Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(NOT_SPECIFIED),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

impl FitnessProfile {
    /// Goal as used in the plan name; `Fitness` when absent or blank.
    pub fn goal_label(&self) -> Cow<'_, str> {
        match &self.fitness_goal {
            Some(Value::String(s)) if !s.trim().is_empty() => Cow::Borrowed(s.trim()),
            None | Some(Value::Null) | Some(Value::String(_)) => Cow::Borrowed("Fitness"),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }

    pub fn workout_prompt(&self) -> String {
        format!(
            r#"You are an experienced fitness coach writing a personalized workout plan for:
Age: {age}
Height: {height}
Weight: {weight}
Injuries or limitations: {injuries}
Available days for workout: {days}
Fitness goal: {goal}
Fitness level: {level}

Guidelines:
- Split muscle groups so the same muscles are not trained on consecutive days
- Match exercise difficulty to the fitness level and work around any injuries
- Target the stated fitness goal

Schema rules:
- Output ONLY the fields shown in the example below, never any other field
- "sets" and "reps" are always plain numbers, e.g. "sets": 3, "reps": 10
- Never write text such as "to failure" or "as many as possible" for reps; pick a number like 12 or 15
- For cardio use "sets": 1, "reps": 1 or another suitable number

Return a JSON object with exactly this structure:
{{
  "schedule": ["Monday", "Wednesday", "Friday"],
  "exercises": [
    {{
      "day": "Monday",
      "routines": [
        {{ "name": "Exercise Name", "sets": 3, "reps": 10 }}
      ]
    }}
  ]
}}

Reply with the JSON object only."#,
            age = render(&self.age),
            height = render(&self.height),
            weight = render(&self.weight),
            injuries = render(&self.injuries),
            days = render(&self.workout_days),
            goal = render(&self.fitness_goal),
            level = render(&self.fitness_level),
        )
    }

    pub fn diet_prompt(&self) -> String {
        format!(
            r#"You are an experienced nutrition coach writing a personalized diet plan for:
Age: {age}
Height: {height}
Weight: {weight}
Fitness goal: {goal}
Dietary restrictions: {restrictions}

Guidelines:
- Work out a daily calorie target from the person's stats and goal
- Balance macronutrients across meals
- Use a variety of nutrient-dense foods that respect the dietary restrictions
- Time meals around workouts for performance and recovery

Schema rules:
- Output ONLY the fields shown in the example below, never any other field
- "dailyCalories" is a plain number, never a string
- No "supplements", "macros", "notes" or similar fields
- Each meal has only a "name" and a "foods" list

Return a JSON object with exactly this structure:
{{
  "dailyCalories": 2000,
  "meals": [
    {{ "name": "Breakfast", "foods": ["Oatmeal with berries", "Greek yogurt", "Black coffee"] }},
    {{ "name": "Lunch", "foods": ["Grilled chicken salad", "Whole grain bread", "Water"] }}
  ]
}}

Reply with the JSON object only."#,
            age = render(&self.age),
            height = render(&self.height),
            weight = render(&self.weight),
            goal = render(&self.fitness_goal),
            restrictions = render(&self.dietary_restrictions),
        )
    }
}

/// Generate and normalize both plans. The workout request goes first; the
/// diet request is only sent once the workout plan has been accepted.
pub async fn generate_plans(
    client: &dyn CompletionClient,
    profile: &FitnessProfile,
) -> Result<GeneratedPlans, AppError> {
    let workout_raw = request_json(
        client,
        PlanKind::Workout,
        WORKOUT_SYSTEM_PROMPT,
        profile.workout_prompt(),
    )
    .await?;
    let workout = normalize_workout_plan(&workout_raw)?;
    log_coercions(PlanKind::Workout, &workout.coercions);

    let diet_raw = request_json(
        client,
        PlanKind::Diet,
        DIET_SYSTEM_PROMPT,
        profile.diet_prompt(),
    )
    .await?;
    let diet = normalize_diet_plan(&diet_raw)?;
    log_coercions(PlanKind::Diet, &diet.coercions);

    tracing::info!(
        days = workout.plan.schedule.len(),
        meals = diet.plan.meals.len(),
        daily_calories = diet.plan.daily_calories,
        "Plans generated"
    );

    Ok(GeneratedPlans {
        workout_plan: workout.plan,
        diet_plan: diet.plan,
    })
}

async fn request_json(
    client: &dyn CompletionClient,
    kind: PlanKind,
    system: &str,
    prompt: String,
) -> Result<Value, AppError> {
    let request = CompletionRequest {
        system: system.to_string(),
        prompt,
        temperature: PLAN_TEMPERATURE,
    };

    let content = client.complete_json(&request).await?;
    if content.trim().is_empty() {
        return Err(AppError::Completion(format!(
            "{kind} plan generation failed: model returned empty content"
        )));
    }

    serde_json::from_str(&content).map_err(|e| {
        tracing::warn!(plan = %kind, error = %e, "Model reply is not valid JSON");
        AppError::Completion(format!(
            "{kind} plan generation failed: model returned invalid JSON: {e}"
        ))
    })
}

fn log_coercions(kind: PlanKind, coercions: &[Coercion]) {
    for coercion in coercions {
        tracing::warn!(
            plan = %kind,
            field = %coercion.field,
            raw = %coercion.raw,
            value = coercion.value,
            "Coerced generated value"
        );
    }
}

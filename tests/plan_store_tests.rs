// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan store behavior (in-memory backend) and the plan read routes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fitplan_api::db::{Database, MemoryDb};
use fitplan_api::models::{DietPlan, Exercise, Meal, NewPlan, OwnerEmail, Routine, WorkoutPlan};
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app_with_db};

fn owner(email: &str) -> OwnerEmail {
    OwnerEmail::parse(email).unwrap()
}

fn new_plan(email: &str, name: &str) -> NewPlan {
    NewPlan {
        user_email: owner(email),
        name: name.to_string(),
        workout_plan: WorkoutPlan {
            schedule: vec!["Monday".to_string()],
            exercises: vec![Exercise {
                day: "Monday".to_string(),
                routines: vec![Routine {
                    name: "Deadlift".to_string(),
                    sets: 3,
                    reps: 5,
                }],
            }],
        },
        diet_plan: DietPlan {
            daily_calories: 2400.0,
            meals: vec![Meal {
                name: "Breakfast".to_string(),
                foods: vec!["Eggs".to_string()],
            }],
        },
        is_active: true,
    }
}

#[tokio::test]
async fn test_create_plan_leaves_one_active_plan() {
    let db = MemoryDb::new();

    let first = db.create_plan(new_plan("a@example.com", "First")).await.unwrap();
    let second = db.create_plan(new_plan("a@example.com", "Second")).await.unwrap();
    assert_ne!(first, second);

    let plans = db.get_user_plans(&owner("a@example.com")).await.unwrap();
    let active: Vec<_> = plans.iter().filter(|p| p.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second);

    let old = plans.iter().find(|p| p.id == first).unwrap();
    assert!(!old.is_active);
}

#[tokio::test]
async fn test_create_plan_does_not_touch_other_owners() {
    let db = MemoryDb::new();

    let other = db.create_plan(new_plan("b@example.com", "B")).await.unwrap();
    db.create_plan(new_plan("a@example.com", "A1")).await.unwrap();
    db.create_plan(new_plan("a@example.com", "A2")).await.unwrap();

    let b_active = db.get_active_plan(&owner("b@example.com")).await.unwrap().unwrap();
    assert_eq!(b_active.id, other);
}

#[tokio::test]
async fn test_get_user_plans_newest_first_and_scoped() {
    let db = MemoryDb::new();

    db.create_plan(new_plan("a@example.com", "One")).await.unwrap();
    db.create_plan(new_plan("b@example.com", "Other")).await.unwrap();
    db.create_plan(new_plan("a@example.com", "Two")).await.unwrap();
    db.create_plan(new_plan("a@example.com", "Three")).await.unwrap();

    let plans = db.get_user_plans(&owner("a@example.com")).await.unwrap();
    let names: Vec<_> = plans.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Three", "Two", "One"]);
    assert!(plans.iter().all(|p| p.user_email.as_str() == "a@example.com"));

    assert!(db
        .get_user_plans(&owner("nobody@example.com"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_inactive_insert_keeps_no_active_plan() {
    let db = MemoryDb::new();

    db.create_plan(new_plan("a@example.com", "Active")).await.unwrap();
    let mut draft = new_plan("a@example.com", "Draft");
    draft.is_active = false;
    db.create_plan(draft).await.unwrap();

    assert!(db.get_active_plan(&owner("a@example.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_creates_leave_one_active_plan() {
    let db = Arc::new(MemoryDb::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                db.create_plan(new_plan("race@example.com", &format!("Plan {i}")))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let plans = db.get_user_plans(&owner("race@example.com")).await.unwrap();
    assert_eq!(plans.len(), 16);
    assert_eq!(plans.iter().filter(|p| p.is_active).count(), 1);
    assert!(plans[0].is_active);
}

#[tokio::test]
async fn test_rapid_creates_have_strictly_increasing_created_at() {
    let db = MemoryDb::new();

    for i in 0..20 {
        db.create_plan(new_plan("fast@example.com", &format!("Plan {i}")))
            .await
            .unwrap();
    }

    let plans = db.get_user_plans(&owner("fast@example.com")).await.unwrap();
    assert_eq!(plans[0].name, "Plan 19");
    assert_eq!(plans[19].name, "Plan 0");
    for pair in plans.windows(2) {
        assert!(
            pair[0].created_at > pair[1].created_at,
            "{} should sort after {}",
            pair[0].created_at,
            pair[1].created_at
        );
    }
}

#[tokio::test]
async fn test_plans_route() {
    let db = Arc::new(MemoryDb::new());
    db.create_plan(new_plan("a@example.com", "Old")).await.unwrap();
    db.create_plan(new_plan("a@example.com", "New")).await.unwrap();
    let app = create_test_app_with_db(db, Vec::<String>::new());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/plans?user_email=a%40example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["name"], "New");
    assert_eq!(json[0]["isActive"], true);
    assert_eq!(json[1]["isActive"], false);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/plans/active?user_email=a%40example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "New");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/plans/active?user_email=new%40example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .oneshot(Request::builder().uri("/plans").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

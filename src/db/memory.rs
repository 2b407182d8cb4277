// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Plans live in one insertion-ordered list behind a mutex, so
//! deactivate-then-insert runs as a single critical section. Users are keyed
//! by Clerk ID in a `DashMap`.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{NewPlan, OwnerEmail, Plan, User, UserUpdate};
use crate::time_utils::{format_utc_rfc3339_millis, next_created_at};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemoryDb {
    plans: Arc<Mutex<Vec<Plan>>>,
    users: Arc<DashMap<String, User>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_plans(&self) -> Result<std::sync::MutexGuard<'_, Vec<Plan>>, AppError> {
        self.plans
            .lock()
            .map_err(|_| AppError::Database("Plan store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Database for MemoryDb {
    async fn create_plan(&self, plan: NewPlan) -> Result<String, AppError> {
        let mut plans = self.lock_plans()?;

        let newest = plans
            .iter()
            .rev()
            .find(|p| p.user_email == plan.user_email)
            .map(|p| p.created_at.as_str());
        let created_at = next_created_at(chrono::Utc::now(), newest);
        let plan = plan.into_plan(format_utc_rfc3339_millis(created_at));
        let plan_id = plan.id.clone();

        let mut deactivated = 0;
        for existing in plans
            .iter_mut()
            .filter(|p| p.user_email == plan.user_email && p.is_active)
        {
            existing.is_active = false;
            deactivated += 1;
        }
        plans.push(plan);
        drop(plans);

        tracing::debug!(plan_id = %plan_id, deactivated, "Plan stored (memory)");
        Ok(plan_id)
    }

    async fn get_user_plans(&self, user_email: &OwnerEmail) -> Result<Vec<Plan>, AppError> {
        let plans = self.lock_plans()?;
        // Reverse insertion order is newest first
        Ok(plans
            .iter()
            .rev()
            .filter(|p| &p.user_email == user_email)
            .cloned()
            .collect())
    }

    async fn sync_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.clerk_id.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, clerk_id: &str, update: UserUpdate) -> Result<bool, AppError> {
        match self.users.get_mut(clerk_id) {
            Some(mut user) => {
                user.apply(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_user(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(clerk_id).map(|u| u.clone()))
    }
}

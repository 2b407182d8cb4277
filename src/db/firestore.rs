// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles mirrored from Clerk, keyed by Clerk ID)
//! - Plans (generated workout/diet plans, queried by owner email)

use crate::db::{collections, Database};
use crate::error::AppError;
use crate::models::{NewPlan, OwnerEmail, Plan, User, UserUpdate};
use crate::time_utils::{format_utc_rfc3339_millis, next_created_at};
use async_trait::async_trait;

/// Attempts at the plan transaction before giving up.
const PLAN_TRANSACTION_ATTEMPTS: u32 = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator needs no credentials; skip the ADC lookup entirely
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// All plans for an owner, newest first, read through `client`.
    ///
    /// `client` may carry a transaction consistency selector, in which case
    /// the query joins that transaction.
    async fn query_user_plans(
        client: &firestore::FirestoreDb,
        user_email: &OwnerEmail,
    ) -> Result<Vec<Plan>, AppError> {
        let email = user_email.as_str().to_string();

        client
            .fluent()
            .select()
            .from(collections::PLANS)
            .filter(move |q| q.field("userEmail").eq(email.clone()))
            // Newest first; createdAt is strictly increasing per owner
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One attempt at deactivate-then-insert. Returns the number of plans
    /// deactivated.
    async fn try_create_plan(
        client: &firestore::FirestoreDb,
        plan: &mut Plan,
    ) -> Result<usize, AppError> {
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this handle are part of the transaction, so a
        // concurrent create for the same owner conflicts at commit.
        let transaction_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let existing = match Self::query_user_plans(&transaction_client, &plan.user_email).await
        {
            Ok(plans) => plans,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };

        let newest = existing.first().map(|p| p.created_at.as_str());
        plan.created_at =
            format_utc_rfc3339_millis(next_created_at(chrono::Utc::now(), newest));

        let mut deactivated = 0;
        for mut active in existing.into_iter().filter(|p| p.is_active) {
            active.is_active = false;
            client
                .fluent()
                .update()
                .in_col(collections::PLANS)
                .document_id(&active.id)
                .object(&active)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add plan deactivation to transaction: {}",
                        e
                    ))
                })?;
            deactivated += 1;
        }

        client
            .fluent()
            .update()
            .in_col(collections::PLANS)
            .document_id(&plan.id)
            .object(&*plan)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add plan to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(deactivated)
    }
}

#[async_trait]
impl Database for FirestoreDb {
    // ─── Plan Operations ─────────────────────────────────────────

    /// Deactivate-then-insert as one read-write transaction.
    ///
    /// The owner's plans are read inside the transaction, so two concurrent
    /// requests for the same owner cannot both miss each other's plan: the
    /// loser's commit fails and the whole sequence is retried.
    async fn create_plan(&self, plan: NewPlan) -> Result<String, AppError> {
        let client = self.get_client()?;
        // createdAt is assigned per attempt, inside the transaction
        let mut plan = plan.into_plan(String::new());

        let mut attempt = 1;
        let deactivated = loop {
            match Self::try_create_plan(client, &mut plan).await {
                Ok(deactivated) => break deactivated,
                Err(e) if attempt < PLAN_TRANSACTION_ATTEMPTS => {
                    tracing::warn!(
                        attempt,
                        plan_id = %plan.id,
                        error = %e,
                        "Plan transaction failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(
            plan_id = %plan.id,
            deactivated,
            attempt,
            "Plan stored"
        );

        Ok(plan.id)
    }

    async fn get_user_plans(&self, user_email: &OwnerEmail) -> Result<Vec<Plan>, AppError> {
        Self::query_user_plans(self.get_client()?, user_email).await
    }

    // ─── User Operations ─────────────────────────────────────────

    async fn sync_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.clerk_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn update_user(&self, clerk_id: &str, update: UserUpdate) -> Result<bool, AppError> {
        let Some(mut user) = self.get_user(clerk_id).await? else {
            return Ok(false);
        };
        user.apply(update);
        self.sync_user(&user).await?;
        Ok(true)
    }

    async fn get_user(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(clerk_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

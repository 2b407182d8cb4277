//! Database layer.
//!
//! [`Database`] is the data-access surface used by the route handlers.
//! [`FirestoreDb`] backs it in production; [`MemoryDb`] keeps everything in
//! process for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{NewPlan, OwnerEmail, Plan, User, UserUpdate};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Users keyed by Clerk ID
    pub const USERS: &str = "users";
    /// Plans keyed by plan ID
    pub const PLANS: &str = "plans";
}

/// Plan and user operations.
#[async_trait]
pub trait Database: Send + Sync {
    /// Deactivate the owner's active plans and insert `plan`.
    ///
    /// Returns the new plan's ID. After a successful call the new plan is the
    /// owner's only active plan (when `plan.is_active` is set).
    async fn create_plan(&self, plan: NewPlan) -> Result<String, AppError>;

    /// All plans for an owner, newest first.
    async fn get_user_plans(&self, user_email: &OwnerEmail) -> Result<Vec<Plan>, AppError>;

    /// The owner's active plan, if any.
    async fn get_active_plan(&self, user_email: &OwnerEmail) -> Result<Option<Plan>, AppError> {
        Ok(self
            .get_user_plans(user_email)
            .await?
            .into_iter()
            .find(|plan| plan.is_active))
    }

    /// Store a user from a `user.created` event, replacing any record with
    /// the same Clerk ID.
    async fn sync_user(&self, user: &User) -> Result<(), AppError>;

    /// Overwrite a user's profile fields. Returns `false` if no user has
    /// this Clerk ID, in which case nothing is written.
    async fn update_user(&self, clerk_id: &str, update: UserUpdate) -> Result<bool, AppError>;

    /// Get a user by Clerk ID.
    async fn get_user(&self, clerk_id: &str) -> Result<Option<User>, AppError>;
}

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile mirrored from Clerk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Clerk user ID (also used as document ID)
    pub clerk_id: String,
    /// Display name ("first last", trimmed)
    pub name: String,
    /// Primary email address
    pub email: String,
    /// Profile picture URL
    pub image: Option<String>,
}

/// Mutable profile fields, overwritten on `user.updated`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

impl User {
    pub fn apply(&mut self, update: UserUpdate) {
        self.name = update.name;
        self.email = update.email;
        self.image = update.image;
    }
}

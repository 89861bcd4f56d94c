//! Persistence seam for the `users`, `interviews` and `feedback` collections.
//!
//! Flows depend on the `Store` trait, never on a concrete client, so the
//! backing database can be swapped and tests can run against the in-memory
//! double. All writes are single-row atomic inserts.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::feedback::Feedback;
use crate::models::interview::Interview;
use crate::models::user::User;

#[async_trait]
pub trait Store: Send + Sync {
    /// Creates the user only if no row for `user.id` exists yet.
    /// Returns `false` when the id is already taken (nothing is written).
    async fn create_user(&self, user: &User) -> Result<bool, sqlx::Error>;

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error>;

    async fn create_interview(&self, interview: &Interview) -> Result<(), sqlx::Error>;

    /// All interviews for a user, newest first.
    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, sqlx::Error>;

    /// Up to `limit` finalized interviews excluding the given user's own,
    /// newest first.
    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interview>, sqlx::Error>;

    async fn interview_by_id(&self, id: Uuid) -> Result<Option<Interview>, sqlx::Error>;

    async fn create_feedback(&self, feedback: &Feedback) -> Result<(), sqlx::Error>;

    /// At most one feedback record matching both keys.
    async fn feedback_by_interview(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, sqlx::Error>;
}

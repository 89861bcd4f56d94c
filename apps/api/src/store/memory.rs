//! In-memory `Store` double for tests. Mirrors the ordering and filtering
//! semantics of the PostgreSQL implementation.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::feedback::Feedback;
use crate::models::interview::Interview;
use crate::models::user::User;
use crate::store::Store;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    interviews: Vec<Interview>,
    feedback: Vec<Feedback>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn interview_count(&self) -> usize {
        self.inner.lock().unwrap().interviews.len()
    }

    pub fn feedback_count(&self) -> usize {
        self.inner.lock().unwrap().feedback.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.id == user.id) {
            return Ok(false);
        }
        inner.users.push(user.clone());
        Ok(true)
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_interview(&self, interview: &Interview) -> Result<(), sqlx::Error> {
        self.inner.lock().unwrap().interviews.push(interview.clone());
        Ok(())
    }

    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Interview> = inner
            .interviews
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interview>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Interview> = inner
            .interviews
            .iter()
            .filter(|i| i.finalized && i.user_id != exclude_user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn interview_by_id(&self, id: Uuid) -> Result<Option<Interview>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.interviews.iter().find(|i| i.id == id).cloned())
    }

    async fn create_feedback(&self, feedback: &Feedback) -> Result<(), sqlx::Error> {
        self.inner.lock().unwrap().feedback.push(feedback.clone());
        Ok(())
    }

    async fn feedback_by_interview(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .feedback
            .iter()
            .find(|f| f.interview_id == interview_id && f.user_id == user_id)
            .cloned())
    }
}

//! PostgreSQL-backed `Store` implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::feedback::Feedback;
use crate::models::interview::Interview;
use crate::models::user::User;
use crate::store::Store;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: &User) -> Result<bool, sqlx::Error> {
        // Conditional insert closes the check-then-write race on sign-up:
        // concurrent attempts with the same id resolve to one winner.
        let result = sqlx::query(
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_interview(&self, interview: &Interview) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO interviews
                 (id, role, kind, level, techstack, questions, user_id,
                  finalized, cover_image, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(interview.id)
        .bind(&interview.role)
        .bind(&interview.kind)
        .bind(&interview.level)
        .bind(&interview.techstack)
        .bind(&interview.questions)
        .bind(&interview.user_id)
        .bind(interview.finalized)
        .bind(&interview.cover_image)
        .bind(interview.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, sqlx::Error> {
        sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interview>, sqlx::Error> {
        sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews
             WHERE finalized = TRUE AND user_id <> $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(exclude_user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn interview_by_id(&self, id: Uuid) -> Result<Option<Interview>, sqlx::Error> {
        sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_feedback(&self, feedback: &Feedback) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO feedback
                 (id, interview_id, user_id, total_score, category_scores,
                  strengths, areas_for_improvement, final_assessment, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(feedback.id)
        .bind(feedback.interview_id)
        .bind(&feedback.user_id)
        .bind(feedback.total_score)
        .bind(&feedback.category_scores)
        .bind(&feedback.strengths)
        .bind(&feedback.areas_for_improvement)
        .bind(&feedback.final_assessment)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn feedback_by_interview(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            "SELECT * FROM feedback
             WHERE interview_id = $1 AND user_id = $2
             LIMIT 1",
        )
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

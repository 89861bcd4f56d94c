use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One scored assessment category in a feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: i32,
    pub comment: String,
}

/// A post-interview feedback record. One per (interview_id, user_id) pair is
/// expected; uniqueness is not enforced by a stored constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub user_id: String,
    pub total_score: i32,
    pub category_scores: Json<Vec<CategoryScore>>,
    pub strengths: Json<Vec<String>>,
    pub areas_for_improvement: Json<Vec<String>>,
    pub final_assessment: String,
    pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// An interview record. Created once by the generation flow with
/// `finalized = true`; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: Uuid,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    pub techstack: Json<Vec<String>>,
    pub questions: Json<Vec<String>>,
    pub user_id: String,
    pub finalized: bool,
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
}

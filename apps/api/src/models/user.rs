use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user. `id` is the credential-store subject id, not a
/// locally generated key; the row is created at sign-up and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

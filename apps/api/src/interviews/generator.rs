//! Interview generation — validates a request, prompts the LLM for
//! questions, normalizes the output, and persists one interview record.

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Deserialize;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::prompts::question_generation_prompt;
use crate::llm::TextGeneration;
use crate::models::interview::Interview;
use crate::store::Store;

/// Cover images assigned round-robin-by-chance to new interviews.
const COVER_IMAGES: &[&str] = &[
    "adobe.png",
    "amazon.png",
    "facebook.png",
    "hostinger.png",
    "pinterest.png",
    "quora.png",
    "reddit.png",
    "skype.png",
    "spotify.png",
    "telegram.png",
    "tiktok.png",
    "yahoo.png",
];

/// Request body for POST /api/generate. Every field is required and must be
/// non-empty; fields are optional here only so validation can answer with a
/// 400 rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateInterviewRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub techstack: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub userid: Option<String>,
}

struct ValidatedRequest {
    kind: String,
    role: String,
    level: String,
    techstack: String,
    amount: i64,
    userid: String,
}

fn validate(request: GenerateInterviewRequest) -> Result<ValidatedRequest, AppError> {
    let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());

    let (kind, role, level, techstack, userid) = match (
        present(request.kind),
        present(request.role),
        present(request.level),
        present(request.techstack),
        present(request.userid),
    ) {
        (Some(kind), Some(role), Some(level), Some(techstack), Some(userid)) => {
            (kind, role, level, techstack, userid)
        }
        _ => {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }
    };

    let amount = match request.amount {
        Some(amount) if amount >= 1 => amount,
        _ => return Err(AppError::Validation("Missing required fields".to_string())),
    };

    Ok(ValidatedRequest {
        kind,
        role,
        level,
        techstack,
        amount,
        userid,
    })
}

/// Splits generated text into questions: one per line, trimmed, blank lines
/// dropped.
pub fn parse_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Splits the comma-joined techstack into its ordered parts. Deliberately no
/// trimming: surrounding whitespace is preserved exactly as submitted.
pub fn split_techstack(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_owned).collect()
}

pub fn random_cover_image() -> String {
    let mut rng = rand::thread_rng();
    let cover = COVER_IMAGES
        .choose(&mut rng)
        .copied()
        .unwrap_or("adobe.png");
    format!("/covers/{cover}")
}

/// Runs the full generation flow and persists the interview.
///
/// One LLM call, one insert; any failure before the insert leaves the store
/// untouched, and the insert itself is a single atomic row write.
pub async fn generate_interview(
    store: &dyn Store,
    llm: &dyn TextGeneration,
    request: GenerateInterviewRequest,
) -> Result<Interview, AppError> {
    let request = validate(request)?;

    let prompt = question_generation_prompt(
        &request.role,
        &request.level,
        &request.techstack,
        &request.kind,
        request.amount,
    );

    let text = llm.generate_text(&prompt).await?;

    let questions = parse_questions(&text);
    if questions.is_empty() {
        return Err(AppError::EmptyResult(
            "No valid questions generated".to_string(),
        ));
    }

    let interview = Interview {
        id: Uuid::new_v4(),
        role: request.role,
        kind: request.kind,
        level: request.level,
        techstack: Json(split_techstack(&request.techstack)),
        questions: Json(questions),
        user_id: request.userid,
        finalized: true,
        cover_image: random_cover_image(),
        created_at: Utc::now(),
    };

    store.create_interview(&interview).await?;
    info!(
        "Generated interview {} ({} questions) for user {}",
        interview.id,
        interview.questions.0.len(),
        interview.user_id
    );

    Ok(interview)
}

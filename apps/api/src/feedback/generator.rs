//! Feedback generation — formats a transcript, requests a structured
//! assessment from the LLM, and persists one feedback record.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::prompts::{feedback_prompt, FEEDBACK_SYSTEM};
use crate::llm::TextGeneration;
use crate::models::feedback::{CategoryScore, Feedback};
use crate::store::Store;

/// Speaker of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::System => "system",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One finalized utterance from a call, in arrival order. Ephemeral: held
/// only for the duration of a session and the feedback call that follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackParams {
    pub interview_id: Uuid,
    pub user_id: String,
    pub transcript: Vec<TranscriptMessage>,
}

/// Outcome surfaced to the caller: `{success, feedbackId}` on success,
/// `{success: false}` on any failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<Uuid>,
}

/// The structured object the LLM call is constrained to.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackObject {
    total_score: i32,
    category_scores: Vec<CategoryScore>,
    strengths: Vec<String>,
    areas_for_improvement: Vec<String>,
    final_assessment: String,
}

/// Formats the transcript one line per message: `- {role}: {content}\n`,
/// concatenated with no extra separator.
pub fn format_transcript(transcript: &[TranscriptMessage]) -> String {
    transcript
        .iter()
        .map(|message| format!("- {}: {}\n", message.role.as_str(), message.content))
        .collect()
}

/// Runs the feedback flow. Failures are logged and folded into
/// `{success: false}` rather than propagated; the write is a single atomic
/// insert, so no partial record can be left behind.
pub async fn create_feedback(
    store: &dyn Store,
    llm: &dyn TextGeneration,
    params: CreateFeedbackParams,
) -> CreateFeedbackResult {
    match generate_and_persist(store, llm, params).await {
        Ok(feedback_id) => CreateFeedbackResult {
            success: true,
            feedback_id: Some(feedback_id),
        },
        Err(e) => {
            error!("Error saving feedback: {e}");
            CreateFeedbackResult {
                success: false,
                feedback_id: None,
            }
        }
    }
}

async fn generate_and_persist(
    store: &dyn Store,
    llm: &dyn TextGeneration,
    params: CreateFeedbackParams,
) -> Result<Uuid, AppError> {
    let formatted = format_transcript(&params.transcript);
    let prompt = feedback_prompt(&formatted);

    let value = llm.generate_json(&prompt, FEEDBACK_SYSTEM).await?;
    let object: FeedbackObject = serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Malformed feedback object: {e}")))?;

    let feedback = Feedback {
        id: Uuid::new_v4(),
        interview_id: params.interview_id,
        user_id: params.user_id,
        total_score: object.total_score,
        category_scores: Json(object.category_scores),
        strengths: Json(object.strengths),
        areas_for_improvement: Json(object.areas_for_improvement),
        final_assessment: object.final_assessment,
        created_at: Utc::now(),
    };

    store.create_feedback(&feedback).await?;
    info!(
        "Saved feedback {} for interview {} (total score {})",
        feedback.id, feedback.interview_id, feedback.total_score
    );

    Ok(feedback.id)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::llm::LlmError;
    use crate::store::memory::MemoryStore;

    struct FakeLlm {
        object: Result<serde_json::Value, ()>,
    }

    #[async_trait]
    impl TextGeneration for FakeLlm {
        async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
            unimplemented!("not used by the feedback flow")
        }

        async fn generate_json(
            &self,
            _prompt: &str,
            _system: &str,
        ) -> Result<serde_json::Value, LlmError> {
            self.object.clone().map_err(|_| LlmError::EmptyContent)
        }
    }

    fn feedback_object() -> serde_json::Value {
        json!({
            "totalScore": 72,
            "categoryScores": [
                {"name": "Communication Skills", "score": 80, "comment": "Clear answers."}
            ],
            "strengths": ["Explains tradeoffs"],
            "areasForImprovement": ["More depth on indexing"],
            "finalAssessment": "Solid performance overall."
        })
    }

    fn transcript() -> Vec<TranscriptMessage> {
        vec![
            TranscriptMessage {
                role: MessageRole::User,
                content: "Hi".to_string(),
            },
            TranscriptMessage {
                role: MessageRole::Assistant,
                content: "Hello".to_string(),
            },
        ]
    }

    #[test]
    fn test_format_transcript_one_line_per_message() {
        assert_eq!(
            format_transcript(&transcript()),
            "- user: Hi\n- assistant: Hello\n"
        );
    }

    #[test]
    fn test_format_transcript_empty() {
        assert_eq!(format_transcript(&[]), "");
    }

    #[tokio::test]
    async fn test_create_feedback_persists_and_returns_id() {
        let store = MemoryStore::new();
        let llm = FakeLlm {
            object: Ok(feedback_object()),
        };
        let interview_id = Uuid::new_v4();

        let result = create_feedback(
            &store,
            &llm,
            CreateFeedbackParams {
                interview_id,
                user_id: "uid-1".to_string(),
                transcript: transcript(),
            },
        )
        .await;

        assert!(result.success);
        let feedback_id = result.feedback_id.unwrap();
        assert_eq!(store.feedback_count(), 1);

        let stored = store
            .feedback_by_interview(interview_id, "uid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, feedback_id);
        assert_eq!(stored.total_score, 72);
        assert_eq!(stored.category_scores.0[0].name, "Communication Skills");
    }

    #[tokio::test]
    async fn test_provider_failure_yields_unsuccessful_result_without_write() {
        let store = MemoryStore::new();
        let llm = FakeLlm { object: Err(()) };

        let result = create_feedback(
            &store,
            &llm,
            CreateFeedbackParams {
                interview_id: Uuid::new_v4(),
                user_id: "uid-1".to_string(),
                transcript: transcript(),
            },
        )
        .await;

        assert!(!result.success);
        assert!(result.feedback_id.is_none());
        assert_eq!(store.feedback_count(), 0);
    }

    #[tokio::test]
    async fn test_feedback_lookup_requires_both_keys() {
        let store = MemoryStore::new();
        let llm = FakeLlm {
            object: Ok(feedback_object()),
        };
        let interview_id = Uuid::new_v4();

        create_feedback(
            &store,
            &llm,
            CreateFeedbackParams {
                interview_id,
                user_id: "uid-1".to_string(),
                transcript: transcript(),
            },
        )
        .await;

        // Wrong user, wrong interview, then the exact pair.
        assert!(store
            .feedback_by_interview(interview_id, "uid-2")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .feedback_by_interview(Uuid::new_v4(), "uid-1")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .feedback_by_interview(interview_id, "uid-1")
            .await
            .unwrap()
            .is_some());
    }
}

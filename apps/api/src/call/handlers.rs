//! Axum route handlers for the live call API and the provider webhook.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::handlers::require_user;
use crate::call::{LiveCall, ProviderEvent};
use crate::errors::AppError;
use crate::feedback::generator::MessageRole;
use crate::state::AppState;
use crate::voice::CallVariables;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallRequest {
    /// When set, feedback is generated for this interview once the call
    /// finishes.
    pub interview_id: Option<Uuid>,
}

/// POST /api/calls
///
/// Starts a provider session for the signed-in user and spawns the run loop
/// that owns the session until it finishes.
pub async fn handle_start_call(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<StartCallRequest>,
) -> Result<Json<Value>, AppError> {
    let user = require_user(&state, &cookies).await?;

    let call_id = state
        .voice
        .start(&CallVariables {
            username: user.name.clone(),
            userid: user.id.clone(),
        })
        .await?;

    // The provider assigns the call id, so registration can only happen
    // after start() returns; a webhook event landing in that window is
    // dropped. The state machine tolerates this: transcripts buffer in any
    // state and CallEnded finishes from any state, so at worst the session
    // misses the Connecting -> Active transition.
    let events = state.calls.register(call_id.clone());
    let live = LiveCall {
        call_id: call_id.clone(),
        interview_id: request.interview_id,
        user_id: user.id,
        events,
        voice: state.voice.clone(),
        store: state.store.clone(),
        llm: state.llm.clone(),
        registry: state.calls.clone(),
    };
    tokio::spawn(live.run());

    Ok(Json(json!({ "success": true, "callId": call_id })))
}

/// POST /api/calls/:id/end
///
/// Requests the end of a live call. The run loop stops the provider
/// session; requests already in flight at the provider are not cancelled.
pub async fn handle_end_call(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let sender = state
        .calls
        .sender_for(&call_id)
        .ok_or_else(|| AppError::NotFound(format!("No live call {call_id}")))?;

    if sender.send(ProviderEvent::CallEnded).await.is_err() {
        // The run loop already exited; treat as finished.
        debug!("end requested for call {call_id} after its loop exited");
    }

    Ok(Json(json!({ "success": true })))
}

/// One server message from the voice provider, as delivered to the webhook.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub call: Option<WebhookCall>,
    pub status: Option<String>,
    pub role: Option<MessageRole>,
    pub transcript_type: Option<String>,
    pub transcript: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookCall {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub message: WebhookMessage,
}

/// Translates a provider server message into a typed event. Unknown message
/// kinds and malformed payloads map to `None` and are dropped.
pub fn event_from_webhook(message: &WebhookMessage) -> Option<ProviderEvent> {
    match message.kind.as_str() {
        "status-update" => match message.status.as_deref() {
            Some("in-progress") => Some(ProviderEvent::CallStarted),
            Some("ended") => Some(ProviderEvent::CallEnded),
            _ => None,
        },
        "transcript" => Some(ProviderEvent::Transcript {
            role: message.role.unwrap_or(MessageRole::User),
            text: message.transcript.clone()?,
            finalized: message.transcript_type.as_deref() == Some("final"),
        }),
        "speech-update" => match message.status.as_deref() {
            Some("started") => Some(ProviderEvent::SpeechStarted),
            Some("stopped") => Some(ProviderEvent::SpeechEnded),
            _ => None,
        },
        "error" => Some(ProviderEvent::Error(
            message.error.clone().unwrap_or_else(|| "unknown".to_string()),
        )),
        _ => None,
    }
}

/// POST /api/vapi/webhook
///
/// Ingests provider server events and forwards them to the matching live
/// session. Always answers 200 so the provider does not re-deliver; events
/// for unknown calls are dropped with a log line.
pub async fn handle_webhook(
    State(state): State<AppState>,
    Json(envelope): Json<WebhookEnvelope>,
) -> Json<Value> {
    let Some(event) = event_from_webhook(&envelope.message) else {
        debug!("ignoring webhook message kind {}", envelope.message.kind);
        return Json(json!({ "success": true }));
    };

    let Some(call) = &envelope.message.call else {
        warn!("webhook event without a call id dropped");
        return Json(json!({ "success": true }));
    };

    match state.calls.sender_for(&call.id) {
        Some(sender) => {
            if sender.send(event).await.is_err() {
                debug!("live call {} is gone; event dropped", call.id);
            }
        }
        None => debug!("no live call {} for webhook event", call.id),
    }

    Json(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(kind: &str) -> WebhookMessage {
        WebhookMessage {
            kind: kind.to_string(),
            call: None,
            status: None,
            role: None,
            transcript_type: None,
            transcript: None,
            error: None,
        }
    }

    #[test]
    fn test_status_updates_map_to_lifecycle_events() {
        let mut m = message("status-update");
        m.status = Some("in-progress".to_string());
        assert!(matches!(
            event_from_webhook(&m),
            Some(ProviderEvent::CallStarted)
        ));

        m.status = Some("ended".to_string());
        assert!(matches!(
            event_from_webhook(&m),
            Some(ProviderEvent::CallEnded)
        ));

        m.status = Some("queued".to_string());
        assert!(event_from_webhook(&m).is_none());
    }

    #[test]
    fn test_transcript_message_carries_finality() {
        let mut m = message("transcript");
        m.role = Some(MessageRole::Assistant);
        m.transcript = Some("Hello".to_string());
        m.transcript_type = Some("final".to_string());

        match event_from_webhook(&m) {
            Some(ProviderEvent::Transcript {
                role,
                text,
                finalized,
            }) => {
                assert_eq!(role, MessageRole::Assistant);
                assert_eq!(text, "Hello");
                assert!(finalized);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        m.transcript_type = Some("partial".to_string());
        match event_from_webhook(&m) {
            Some(ProviderEvent::Transcript { finalized, .. }) => assert!(!finalized),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_speech_updates_and_unknown_kinds() {
        let mut m = message("speech-update");
        m.status = Some("started".to_string());
        assert!(matches!(
            event_from_webhook(&m),
            Some(ProviderEvent::SpeechStarted)
        ));

        m.status = Some("stopped".to_string());
        assert!(matches!(
            event_from_webhook(&m),
            Some(ProviderEvent::SpeechEnded)
        ));

        assert!(event_from_webhook(&message("hang")).is_none());
    }

    #[test]
    fn test_webhook_envelope_deserializes_provider_payload() {
        let raw = r#"{
            "message": {
                "type": "transcript",
                "call": {"id": "call-1"},
                "role": "user",
                "transcriptType": "final",
                "transcript": "Hi"
            }
        }"#;
        let envelope: WebhookEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.message.call.as_ref().unwrap().id, "call-1");
        assert!(matches!(
            event_from_webhook(&envelope.message),
            Some(ProviderEvent::Transcript { finalized: true, .. })
        ));
    }
}

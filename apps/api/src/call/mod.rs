//! Live interview session controller.
//!
//! An explicit state machine drives each call, independent of the voice
//! provider's event transport: provider server messages are translated into
//! `ProviderEvent`s and fed to the controller strictly in arrival order
//! through a single-consumer channel. The channel receiver lives inside the
//! run loop, so the event subscription ends exactly when the loop exits.

pub mod handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::feedback::generator::{
    create_feedback, CreateFeedbackParams, MessageRole, TranscriptMessage,
};
use crate::llm::TextGeneration;
use crate::store::Store;
use crate::voice::VoiceProvider;

/// Hard cap on a single call; the session finishes on its own past this.
const CALL_MAX_DURATION: Duration = Duration::from_secs(60 * 60);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Call lifecycle states. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Inactive,
    Connecting,
    Active,
    Finished,
}

/// Typed provider events, decoupled from any callback registration
/// mechanism.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    CallStarted,
    CallEnded,
    Transcript {
        role: MessageRole,
        text: String,
        finalized: bool,
    },
    SpeechStarted,
    SpeechEnded,
    Error(String),
}

/// Side effect requested by a transition; currently only navigation away
/// from the session view when a call finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Navigate,
}

#[derive(Debug, Error)]
#[error("call cannot start from {from:?}")]
pub struct CallStateError {
    pub from: CallStatus,
}

/// The session state machine. Single-threaded by construction: exactly one
/// consumer feeds it events, so the transcript buffer is never mutated
/// concurrently.
#[derive(Debug)]
pub struct SessionController {
    status: CallStatus,
    transcript: Vec<TranscriptMessage>,
    is_speaking: bool,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            status: CallStatus::Inactive,
            transcript: Vec::new(),
            is_speaking: false,
        }
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    #[allow(dead_code)]
    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    #[allow(dead_code)]
    pub fn transcript(&self) -> &[TranscriptMessage] {
        &self.transcript
    }

    pub fn into_transcript(self) -> Vec<TranscriptMessage> {
        self.transcript
    }

    /// Inactive/Finished → Connecting. Starting from Connecting or Active
    /// is rejected.
    pub fn begin_connecting(&mut self) -> Result<(), CallStateError> {
        match self.status {
            CallStatus::Inactive | CallStatus::Finished => {
                self.status = CallStatus::Connecting;
                self.transcript.clear();
                self.is_speaking = false;
                Ok(())
            }
            from => Err(CallStateError { from }),
        }
    }

    /// Any state → Finished. Returns the `Navigate` effect on the first
    /// transition into Finished only.
    pub fn end_call(&mut self) -> Option<Effect> {
        if self.status == CallStatus::Finished {
            return None;
        }
        self.status = CallStatus::Finished;
        self.is_speaking = false;
        Some(Effect::Navigate)
    }

    /// Applies one provider event. Events never move the machine backwards;
    /// out-of-order starts and provider errors are logged and ignored.
    pub fn handle_event(&mut self, event: ProviderEvent) -> Option<Effect> {
        match event {
            ProviderEvent::CallStarted => {
                if self.status == CallStatus::Connecting {
                    self.status = CallStatus::Active;
                } else {
                    warn!("ignoring call-start event in {:?}", self.status);
                }
                None
            }
            ProviderEvent::CallEnded => self.end_call(),
            ProviderEvent::Transcript {
                role,
                text,
                finalized,
            } => {
                if finalized {
                    self.transcript.push(TranscriptMessage {
                        role,
                        content: text,
                    });
                }
                None
            }
            ProviderEvent::SpeechStarted => {
                self.is_speaking = true;
                None
            }
            ProviderEvent::SpeechEnded => {
                self.is_speaking = false;
                None
            }
            ProviderEvent::Error(message) => {
                warn!("voice provider error during call: {message}");
                None
            }
        }
    }
}

/// Routes provider events to the live session they belong to, keyed by the
/// provider's call id. A session is registered just before its run loop
/// starts and removed as the loop exits.
#[derive(Clone, Default)]
pub struct CallRegistry {
    inner: Arc<Mutex<HashMap<String, mpsc::Sender<ProviderEvent>>>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, call_id: String) -> mpsc::Receiver<ProviderEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        self.inner.lock().unwrap().insert(call_id, tx);
        rx
    }

    pub fn remove(&self, call_id: &str) {
        self.inner.lock().unwrap().remove(call_id);
    }

    pub fn sender_for(&self, call_id: &str) -> Option<mpsc::Sender<ProviderEvent>> {
        self.inner.lock().unwrap().get(call_id).cloned()
    }
}

/// A started live call and everything its run loop needs.
pub struct LiveCall {
    pub call_id: String,
    pub interview_id: Option<Uuid>,
    pub user_id: String,
    pub events: mpsc::Receiver<ProviderEvent>,
    pub voice: Arc<dyn VoiceProvider>,
    pub store: Arc<dyn Store>,
    pub llm: Arc<dyn TextGeneration>,
    pub registry: CallRegistry,
}

impl LiveCall {
    /// Drives the session to completion: consumes events sequentially until
    /// the controller finishes (or the call hits its duration cap), stops
    /// the provider session, and, when the call belongs to an interview,
    /// generates feedback from the buffered transcript.
    pub async fn run(mut self) {
        let mut controller = SessionController::new();
        if let Err(e) = controller.begin_connecting() {
            // A fresh controller always starts from Inactive.
            warn!("call {} failed to enter Connecting: {e}", self.call_id);
        }

        let deadline = tokio::time::Instant::now() + CALL_MAX_DURATION;
        loop {
            let event = tokio::select! {
                event = self.events.recv() => event,
                _ = tokio::time::sleep_until(deadline) => {
                    warn!("call {} hit the duration cap", self.call_id);
                    None
                }
            };

            let effect = match event {
                Some(event) => controller.handle_event(event),
                None => controller.end_call(),
            };

            if matches!(effect, Some(Effect::Navigate)) {
                break;
            }
            if controller.status() == CallStatus::Finished {
                break;
            }
        }

        // Subscription ends here: the registry entry goes away and the
        // receiver is dropped with `self`.
        self.registry.remove(&self.call_id);

        if let Err(e) = self.voice.stop(&self.call_id).await {
            warn!("failed to stop provider call {}: {e}", self.call_id);
        }

        let transcript = controller.into_transcript();
        info!(
            "call {} finished with {} transcript messages",
            self.call_id,
            transcript.len()
        );

        if let Some(interview_id) = self.interview_id {
            let result = create_feedback(
                self.store.as_ref(),
                self.llm.as_ref(),
                CreateFeedbackParams {
                    interview_id,
                    user_id: self.user_id,
                    transcript,
                },
            )
            .await;
            if !result.success {
                warn!("post-call feedback generation failed for call {}", self.call_id);
            }
        }
    }
}

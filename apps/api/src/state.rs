use std::sync::Arc;

use crate::call::CallRegistry;
use crate::config::Config;
use crate::identity::CredentialStore;
use crate::llm::TextGeneration;
use crate::store::Store;
use crate::voice::VoiceProvider;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every provider handle is constructed once in `main` and
/// passed in here — there are no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn CredentialStore>,
    pub llm: Arc<dyn TextGeneration>,
    pub voice: Arc<dyn VoiceProvider>,
    pub calls: CallRegistry,
    pub config: Config,
}

mod auth;
mod call;
mod config;
mod db;
mod errors;
mod feedback;
mod identity;
mod interviews;
mod llm;
mod models;
mod routes;
mod state;
mod store;
mod voice;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::call::CallRegistry;
use crate::config::Config;
use crate::db::create_pool;
use crate::identity::IdentityClient;
use crate::llm::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;
use crate::voice::VapiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging. The default directive must use the
    // compiled crate name ("api", from the [[bin]] target), not the package
    // name: tracing targets are derived from module paths, so a
    // package-name directive would match nothing.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prepwise API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    // Initialize the credential-store client
    let identity = Arc::new(IdentityClient::new(
        config.identity_base_url.clone(),
        config.identity_project_id.clone(),
        config.identity_api_key.clone(),
    )?);
    info!("Identity client initialized");

    // Initialize the LLM client
    let llm = Arc::new(GeminiClient::new(config.gemini_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm::MODEL);

    // Initialize the voice-session client
    let voice = Arc::new(VapiClient::new(
        config.vapi_api_key.clone(),
        config.vapi_workflow_id.clone(),
    )?);
    info!("Voice provider client initialized");

    // Build app state
    let state = AppState {
        store,
        identity,
        llm,
        voice,
        calls: CallRegistry::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_default_log_filter_matches_crate_targets() {
        // Tracing targets start with the crate name of the compiled target;
        // the default EnvFilter directive must use the same name or it
        // silences every log line when RUST_LOG is unset.
        let crate_target = module_path!().split("::").next().unwrap();
        assert_eq!(env!("CARGO_CRATE_NAME"), crate_target);
    }
}

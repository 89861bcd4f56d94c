use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Recognized options are consumed as opaque values; only presence is checked.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub vapi_api_key: String,
    pub vapi_workflow_id: String,
    pub identity_base_url: String,
    pub identity_project_id: String,
    pub identity_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Session cookies are marked `Secure` only when this is true.
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GOOGLE_GENERATIVE_AI_API_KEY")?,
            vapi_api_key: require_env("VAPI_API_KEY")?,
            vapi_workflow_id: require_env("VAPI_WORKFLOW_ID")?,
            identity_base_url: require_env("IDENTITY_BASE_URL")?,
            identity_project_id: require_env("IDENTITY_PROJECT_ID")?,
            identity_api_key: require_env("IDENTITY_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            production: std::env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

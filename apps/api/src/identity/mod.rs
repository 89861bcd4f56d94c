//! Credential Store client — token verification, account lookup, and the
//! session-cookie exchange.
//!
//! The hosted identity service owns credentials; this service never sees a
//! password. Flows depend on the `CredentialStore` trait; `IdentityClient`
//! is the reqwest-backed implementation used in production.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Token rejected by the credential store")]
    InvalidToken,
}

/// Claims extracted from a verified id token or session cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Credential-store subject id; doubles as the user document id.
    pub sub: String,
    pub email: String,
}

/// A credential-store account record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUser {
    pub uid: String,
    pub email: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Verifies a freshly issued id token and returns its claims.
    async fn verify_id_token(&self, id_token: &str) -> Result<TokenClaims, IdentityError>;

    /// Looks up an account by email; `None` when no account exists.
    async fn lookup_by_email(&self, email: &str)
        -> Result<Option<CredentialUser>, IdentityError>;

    /// Exchanges an id token for a signed session cookie valid for
    /// `valid_duration_secs`.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        valid_duration_secs: i64,
    ) -> Result<String, IdentityError>;

    /// Verifies a session cookie, optionally checking revocation, and
    /// returns its claims.
    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<TokenClaims, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct IdentityApiError {
    error: IdentityApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct IdentityApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<CredentialUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieResponse {
    session_cookie: String,
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(base_url: String, project_id: String, api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url,
            project_id,
            api_key,
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, IdentityError> {
        let url = format!("{}/v1/projects/{}{path}", self.base_url, self.project_id);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // 400s on the verify endpoints mean a bad/expired/revoked token,
            // which callers treat as "not signed in" rather than an outage.
            if status.is_client_error() {
                return Err(IdentityError::InvalidToken);
            }
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<IdentityApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CredentialStore for IdentityClient {
    async fn verify_id_token(&self, id_token: &str) -> Result<TokenClaims, IdentityError> {
        self.post(":verifyToken", &json!({ "idToken": id_token }))
            .await
    }

    async fn lookup_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialUser>, IdentityError> {
        let response: LookupResponse = self
            .post(":lookupAccounts", &json!({ "email": [email] }))
            .await?;
        Ok(response.users.into_iter().next())
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        valid_duration_secs: i64,
    ) -> Result<String, IdentityError> {
        let response: SessionCookieResponse = self
            .post(
                ":createSessionCookie",
                &json!({ "idToken": id_token, "validDuration": valid_duration_secs }),
            )
            .await?;
        Ok(response.session_cookie)
    }

    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<TokenClaims, IdentityError> {
        self.post(
            ":verifySessionCookie",
            &json!({ "sessionCookie": cookie, "checkRevoked": check_revoked }),
        )
        .await
    }
}

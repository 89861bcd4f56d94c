//! Voice Session Provider client.
//!
//! The hosted provider runs the actual audio call against a preconfigured
//! workflow; this service only starts and stops sessions and consumes the
//! provider's server events (see the `call` module). Flows depend on the
//! `VoiceProvider` trait; `VapiClient` is the production implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const VAPI_API_URL: &str = "https://api.vapi.ai";

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Voice API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Variable values handed to the provider workflow when a call starts.
#[derive(Debug, Clone, Serialize)]
pub struct CallVariables {
    pub username: String,
    pub userid: String,
}

#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Starts a call session; returns the provider's call id.
    async fn start(&self, variables: &CallVariables) -> Result<String, VoiceError>;

    /// Asks the provider to stop a session. This only stops future events;
    /// it does not cancel requests already in flight.
    async fn stop(&self, call_id: &str) -> Result<(), VoiceError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartCallRequest<'a> {
    workflow_id: &'a str,
    workflow_overrides: WorkflowOverrides<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowOverrides<'a> {
    variable_values: &'a CallVariables,
}

#[derive(Debug, Deserialize)]
struct StartCallResponse {
    id: String,
}

#[derive(Clone)]
pub struct VapiClient {
    client: Client,
    api_key: String,
    workflow_id: String,
}

impl VapiClient {
    pub fn new(api_key: String, workflow_id: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
            workflow_id,
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, VoiceError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl VoiceProvider for VapiClient {
    async fn start(&self, variables: &CallVariables) -> Result<String, VoiceError> {
        let body = StartCallRequest {
            workflow_id: &self.workflow_id,
            workflow_overrides: WorkflowOverrides {
                variable_values: variables,
            },
        };

        let response = self
            .client
            .post(format!("{VAPI_API_URL}/call"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response: StartCallResponse = Self::check(response).await?.json().await?;
        Ok(response.id)
    }

    async fn stop(&self, call_id: &str) -> Result<(), VoiceError> {
        let response = self
            .client
            .delete(format!("{VAPI_API_URL}/call/{call_id}"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

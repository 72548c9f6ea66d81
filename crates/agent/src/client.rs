use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use smartshelf_core::config::AgentConfig;

/// Relayed when the agent answers without a `message` field.
pub const NO_MESSAGE_RETURNED: &str = "No message returned.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP Error: {status}")]
    HttpStatus { status: u16, body: String },
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Response is not valid JSON")]
    InvalidJson { raw: String },
    #[error("agent api key is not configured")]
    MissingApiKey,
    #[error("agent client could not be built: {0}")]
    ClientSetup(String),
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Sends `message` to the agent and returns the text of its reply.
    async fn prompt(&self, message: &str) -> Result<String, AgentError>;
}

#[derive(Serialize)]
struct PromptBody<'a> {
    prompt: &'a str,
}

pub struct HttpAgentClient {
    client: Client,
    prompt_url: String,
    api_key: Option<SecretString>,
}

impl HttpAgentClient {
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AgentError::ClientSetup(error.to_string()))?;

        let api_key = config.api_key.clone().filter(|key| !key.expose_secret().trim().is_empty());

        Ok(Self { client, prompt_url: config.prompt_url(), api_key })
    }

    pub fn prompt_url(&self) -> &str {
        &self.prompt_url
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn prompt(&self, message: &str) -> Result<String, AgentError> {
        let api_key = self.api_key.as_ref().ok_or(AgentError::MissingApiKey)?;

        debug!(
            event_name = "agent.prompt.sent",
            url = %self.prompt_url,
            "forwarding prompt to agent"
        );

        let response = self
            .client
            .post(&self.prompt_url)
            .header("Authorization", format!("Token {}", api_key.expose_secret()))
            .json(&PromptBody { prompt: message })
            .send()
            .await
            .map_err(|error| AgentError::Network(error.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|error| AgentError::Network(error.to_string()))?;

        if !status.is_success() {
            warn!(
                event_name = "agent.prompt.rejected",
                status = status.as_u16(),
                "agent returned an error status"
            );
            return Err(AgentError::HttpStatus { status: status.as_u16(), body });
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|_| AgentError::InvalidJson { raw: body.clone() })?;

        Ok(reply_message(&payload))
    }
}

fn reply_message(payload: &Value) -> String {
    match payload.get("message") {
        None | Some(Value::Null) => NO_MESSAGE_RETURNED.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

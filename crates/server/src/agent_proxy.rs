use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/agent-prompt", post(agent_prompt))
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub message: String,
}

async fn agent_prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    let Json(request) = payload?;

    let message = state.agent.prompt(&request.message).await?;

    info!(
        event_name = "agent.prompt.relayed",
        prompt_chars = request.message.chars().count(),
        reply_chars = message.chars().count(),
        "agent reply relayed"
    );

    Ok(Json(PromptResponse { message }))
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;

    use smartshelf_agent::AgentError;

    use super::{agent_prompt, PromptRequest};
    use crate::api::testing::{context, context_with_agent, StubAgent};
    use crate::api::ApiError;

    fn prompt(message: &str) -> Json<PromptRequest> {
        Json(PromptRequest { message: message.to_string() })
    }

    #[tokio::test]
    async fn relays_agent_reply() {
        let ctx = context();

        let Json(response) =
            agent_prompt(State(ctx.state), Ok(prompt("stock of drills?"))).await.expect("reply");

        assert_eq!(response.message, "agent: stock of drills?");
    }

    #[tokio::test]
    async fn upstream_failure_is_a_server_error() {
        let ctx = context_with_agent(StubAgent {
            reply: Err(|| AgentError::HttpStatus { status: 403, body: "forbidden".to_string() }),
        });

        let error = agent_prompt(State(ctx.state), Ok(prompt("hi"))).await.expect_err("failure");

        assert!(matches!(error, ApiError::Agent(AgentError::HttpStatus { status: 403, .. })));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "HTTP Error: 403");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_server_error() {
        let ctx = context_with_agent(StubAgent { reply: Err(|| AgentError::MissingApiKey) });

        let error = agent_prompt(State(ctx.state), Ok(prompt("hi"))).await.expect_err("failure");

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "agent api key is not configured");
    }
}

use std::sync::Arc;

use smartshelf_agent::{AgentClient, AgentError, HttpAgentClient};
use smartshelf_core::config::AppConfig;
use smartshelf_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub agent: Arc<dyn AgentClient>,
}

impl Application {
    pub fn state(&self) -> AppState {
        AppState::from_pool(self.db_pool.clone(), self.agent.clone())
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("agent client setup failed: {0}")]
    Agent(#[source] AgentError),
}

/// Connects, migrates and builds the agent client for an already loaded config.
pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let agent = HttpAgentClient::from_config(&config.agent).map_err(BootstrapError::Agent)?;
    if config.agent.has_api_key() {
        info!(
            event_name = "system.bootstrap.agent_configured",
            prompt_url = %agent.prompt_url(),
            "agent client configured"
        );
    } else {
        warn!(
            event_name = "system.bootstrap.agent_unconfigured",
            "agent api key is not set; /agent-prompt will answer with an error"
        );
    }

    Ok(Application { config, db_pool, agent: Arc::new(agent) })
}

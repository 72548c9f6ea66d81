pub mod config;
pub mod migrate;
pub mod provision;
pub mod seed;

use serde::Serialize;
use smartshelf_core::config::{AppConfig, LoadOptions};
use smartshelf_db::{connect_with_settings, migrations, DbPool};
use tokio::runtime::Runtime;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_DB_CONNECT: u8 = 4;
pub const EXIT_EXECUTION: u8 = 5;
pub const EXIT_VERIFICATION: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Failure raised inside a command body: `(error_class, message, exit_code)`.
pub(crate) type StepFailure = (&'static str, String, u8);

/// Loads config and builds a current-thread runtime, or returns the outcome to print.
pub(crate) fn prepare(command: &str) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            )
        })?;

    Ok((config, runtime))
}

/// Connects to the configured database and applies pending migrations.
pub(crate) async fn open_database(config: &AppConfig) -> Result<DbPool, StepFailure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECT))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_EXECUTION))?;

    Ok(pool)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::CommandResult;

    #[test]
    fn failure_outcome_names_its_error_class() {
        let result = CommandResult::failure("seed", "seed_execution", "boom", 5);

        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 5);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "seed_execution");
        assert_eq!(payload["message"], "boom");
    }

    #[test]
    fn success_outcome_has_null_error_class() {
        let result = CommandResult::success("migrate", "done \"quoted\"");

        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 0);
        assert!(payload["error_class"].is_null());
        assert_eq!(payload["message"], "done \"quoted\"");
    }
}

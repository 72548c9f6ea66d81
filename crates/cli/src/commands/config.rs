use std::env;
use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use smartshelf_core::config::{resolve_config_path, AppConfig, LoadOptions, LogFormat};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run() -> CommandResult {
    match render() {
        Ok(report) => CommandResult::success("config", report),
        Err(message) => CommandResult::failure("config", "config_validation", message, EXIT_CONFIG),
    }
}

fn render() -> Result<String, String> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| format!("config validation failed: {error}"))?;

    let file_path = resolve_config_path(None);
    let file_doc = load_config_file_doc(file_path.as_deref());
    let sources = Sources { file_doc: file_doc.as_ref(), file_path: file_path.as_deref() };

    let api_key = config
        .agent
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let log_format = match config.logging.format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };

    let fields: [(&str, String, &[&str]); 12] = [
        ("database.url", config.database.url.clone(), &["SMARTSHELF_DATABASE_URL", "DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["SMARTSHELF_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["SMARTSHELF_DATABASE_TIMEOUT_SECS"],
        ),
        ("agent.base_url", config.agent.base_url.clone(), &["SMARTSHELF_AGENT_BASE_URL"]),
        ("agent.agent_id", config.agent.agent_id.clone(), &["SMARTSHELF_AGENT_ID"]),
        ("agent.api_key", api_key, &["SMARTSHELF_AGENT_API_KEY", "flockx_api_key"]),
        (
            "agent.timeout_secs",
            config.agent.timeout_secs.to_string(),
            &["SMARTSHELF_AGENT_TIMEOUT_SECS"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["SMARTSHELF_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["SMARTSHELF_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["SMARTSHELF_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["SMARTSHELF_LOGGING_LEVEL", "SMARTSHELF_LOG_LEVEL"],
        ),
        (
            "logging.format",
            log_format.to_string(),
            &["SMARTSHELF_LOGGING_FORMAT", "SMARTSHELF_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        lines.push(render_line(key, &value, sources.field_source(key, env_keys)));
    }

    Ok(lines.join("\n"))
}

struct Sources<'a> {
    file_doc: Option<&'a Value>,
    file_path: Option<&'a Path>,
}

impl Sources<'_> {
    fn field_source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the first four characters of long secrets so operators can tell keys apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let visible: String = trimmed.chars().take(4).collect();
    if trimmed.chars().count() > 12 {
        format!("{visible}***")
    } else {
        "<redacted>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_secret};

    #[test]
    fn long_secrets_keep_a_short_prefix() {
        assert_eq!(redact_secret("tok_1234567890abcdef"), "tok_***");
    }

    #[test]
    fn short_secrets_are_fully_hidden() {
        assert_eq!(redact_secret("abc123"), "<redacted>");
        assert_eq!(redact_secret("   "), "<empty>");
    }

    #[test]
    fn nested_keys_are_detected_in_config_documents() {
        let doc: toml::Value = "[agent]\nbase_url = \"https://x\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "agent.base_url"));
        assert!(!contains_path(&doc, "agent.api_key"));
        assert!(!contains_path(&doc, "server.port"));
    }
}

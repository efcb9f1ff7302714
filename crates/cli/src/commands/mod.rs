pub mod config;
pub mod doctor;
pub mod extract;
pub mod list;
pub mod migrate;

use std::future::Future;

use agentspec_core::config::{AppConfig, LoadOptions};
use agentspec_db::{connect_with_config, migrations, DbPool, RepositoryError};
use serde::Serialize;

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

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        serde_json::json!({
            "command": payload.command,
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}

/// Error class, message and process exit code for a failed command step.
pub(crate) type Failure = (&'static str, String, u8);

/// Loads configuration, opens and migrates the database, then runs `work`
/// on a current-thread runtime. The pool is closed whatever `work` returns.
pub(crate) fn with_migrated_pool<T, F, Fut>(command: &str, work: F) -> Result<T, CommandResult>
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        },
    )?;

    runtime
        .block_on(async {
            let pool = connect_with_config(&config.database)
                .await
                .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
            if let Err(error) = migrations::run_pending(&pool).await {
                pool.close().await;
                return Err(("migration", error.to_string(), 5u8));
            }

            let outcome = work(pool.clone()).await;
            pool.close().await;
            outcome
        })
        .map_err(|(error_class, message, exit_code)| {
            CommandResult::failure(command, error_class, message, exit_code)
        })
}

pub(crate) fn persistence_failure(error: RepositoryError) -> Failure {
    ("persistence", error.to_string(), 4)
}

/// Success whose message is `value` rendered as JSON.
pub(crate) fn json_success<T: Serialize>(command: &str, value: &T) -> CommandResult {
    match serde_json::to_string(value) {
        Ok(message) => CommandResult::success(command, message),
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 6),
    }
}

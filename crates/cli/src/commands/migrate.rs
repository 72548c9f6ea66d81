use crate::commands::{open_database, prepare, CommandResult, StepFailure, EXIT_EXECUTION};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("migrate") {
        Ok(prepared) => prepared,
        Err(outcome) => return outcome,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_EXECUTION))?;
        pool.close().await;
        Ok::<i64, StepFailure>(applied)
    });

    match result {
        Ok(applied) => CommandResult::success(
            "migrate",
            format!("applied pending migrations ({applied} total recorded)"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

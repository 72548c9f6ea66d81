use smartshelf_db::fixtures::{DemoDataset, SeedResult};

use crate::commands::{
    open_database, prepare, CommandResult, StepFailure, EXIT_EXECUTION, EXIT_VERIFICATION,
};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(outcome) => return outcome,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let seeded = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_EXECUTION))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;

        pool.close().await;

        if verification.all_present {
            Ok::<SeedResult, StepFailure>(seeded)
        } else {
            let failed_checks = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>();
            Err(("seed_verification", verification_message(&failed_checks), EXIT_VERIFICATION))
        }
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary(seeded: &SeedResult) -> String {
    if seeded.already_present {
        return "demo dataset already present; nothing inserted".to_string();
    }
    format!(
        "demo dataset loaded: {} employees, {} products, {} requests, {} alerts",
        seeded.employees, seeded.products, seeded.requests, seeded.alerts
    )
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

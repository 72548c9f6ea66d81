pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::provision::ProvisionArgs;

#[derive(Debug, Parser)]
#[command(
    name = "smartshelf",
    about = "SmartShelf operator CLI",
    long_about = "Apply migrations, load demo data, provision employees and inspect configuration.",
    after_help = "Examples:\n  smartshelf migrate\n  smartshelf seed\n  smartshelf provision-employee --code EMP-010 --name Ana --surname Ruiz --category Garden < password.txt\n  smartshelf config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo dataset (employees, products, requests, alerts) and verify it")]
    Seed,
    #[command(
        about = "Create an employee account with an argon2 password hash",
        long_about = "Create an employee account. The password is taken from \
                      SMARTSHELF_EMPLOYEE_PASSWORD, or else read as one line from stdin."
    )]
    ProvisionEmployee(ProvisionArgs),
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::ProvisionEmployee(args) => commands::provision::run(args),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

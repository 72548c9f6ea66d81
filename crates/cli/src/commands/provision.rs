use std::env;
use std::io::{self, BufRead};

use clap::Args;
use secrecy::{ExposeSecret, SecretString};
use smartshelf_core::auth::hash_password;
use smartshelf_core::domain::employee::{EmployeeCategory, NewEmployee};
use smartshelf_db::repositories::{EmployeeRepository, RepositoryError, SqlEmployeeRepository};

use crate::commands::{
    open_database, prepare, CommandResult, StepFailure, EXIT_CONFIG, EXIT_EXECUTION,
};

/// Read before falling back to one line on stdin. The password never travels as a flag.
pub const PASSWORD_ENV: &str = "SMARTSHELF_EMPLOYEE_PASSWORD";

#[derive(Clone, Debug, Args)]
pub struct ProvisionArgs {
    #[arg(long, help = "Unique employee code used to log in")]
    pub code: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub surname: String,
    #[arg(long, help = "Department: Garden, DIY, Construction or Tools")]
    pub category: String,
}

pub fn run(args: ProvisionArgs) -> CommandResult {
    let password = match read_password(env::var(PASSWORD_ENV).ok(), io::stdin().lock()) {
        Ok(password) => password,
        Err(message) => {
            return CommandResult::failure(
                "provision-employee",
                "input_validation",
                message,
                EXIT_CONFIG,
            );
        }
    };
    run_with_password(args, &password)
}

fn run_with_password(args: ProvisionArgs, password: &SecretString) -> CommandResult {
    let employee = match build_employee(&args, password) {
        Ok(employee) => employee,
        Err(message) => {
            return CommandResult::failure(
                "provision-employee",
                "input_validation",
                message,
                EXIT_CONFIG,
            );
        }
    };

    let (config, runtime) = match prepare("provision-employee") {
        Ok(prepared) => prepared,
        Err(outcome) => return outcome,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let created = SqlEmployeeRepository::new(pool.clone()).create(employee).await;
        pool.close().await;

        created.map_err(|error| -> StepFailure {
            match error {
                RepositoryError::Constraint(message) => (
                    "provision_conflict",
                    format!("employee could not be stored: {message}"),
                    EXIT_EXECUTION,
                ),
                other => ("provision_execution", other.to_string(), EXIT_EXECUTION),
            }
        })
    });

    match result {
        Ok(employee) => CommandResult::success(
            "provision-employee",
            format!(
                "employee {} provisioned with id {} in {}",
                employee.employee_code, employee.id.0, employee.category
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("provision-employee", error_class, message, exit_code)
        }
    }
}

fn read_password(
    from_env: Option<String>,
    mut input: impl BufRead,
) -> Result<SecretString, String> {
    if let Some(password) = from_env.filter(|value| !value.is_empty()) {
        return Ok(SecretString::from(password));
    }

    let mut line = String::new();
    input.read_line(&mut line).map_err(|error| format!("could not read password: {error}"))?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(format!("no password supplied; set {PASSWORD_ENV} or pipe it on stdin"));
    }
    Ok(SecretString::from(password.to_string()))
}

fn build_employee(args: &ProvisionArgs, password: &SecretString) -> Result<NewEmployee, String> {
    let category = args.category.parse::<EmployeeCategory>().map_err(|error| error.to_string())?;
    let password_hash =
        hash_password(password.expose_secret()).map_err(|error| error.to_string())?;

    let employee = NewEmployee {
        employee_code: args.code.trim().to_string(),
        name: args.name.trim().to_string(),
        surname: args.surname.trim().to_string(),
        password_hash,
        category,
    };
    employee.validate().map_err(|error| error.to_string())?;
    Ok(employee)
}

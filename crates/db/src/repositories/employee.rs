use chrono::Utc;
use sqlx::Row;

use smartshelf_core::domain::employee::{Employee, EmployeeCategory, EmployeeId, NewEmployee};

use super::{decode_error, parse_timestamp, EmployeeRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEmployeeRepository {
    pool: DbPool,
}

impl SqlEmployeeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_employee(row: &sqlx::sqlite::SqliteRow) -> Result<Employee, RepositoryError> {
    let category: String = row.try_get("category").map_err(decode_error)?;

    Ok(Employee {
        id: EmployeeId(row.try_get("id").map_err(decode_error)?),
        employee_code: row.try_get("employee_code").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        surname: row.try_get("surname").map_err(decode_error)?,
        password_hash: row.try_get("password_hash").map_err(decode_error)?,
        category: category
            .parse::<EmployeeCategory>()
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        created_at: parse_timestamp("created_at", row.try_get("created_at").map_err(decode_error)?)?,
    })
}

#[async_trait::async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn find_by_code(&self, employee_code: &str) -> Result<Option<Employee>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_code, name, surname, password_hash, category, created_at
             FROM employees WHERE employee_code = ?",
        )
        .bind(employee_code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_employee).transpose()
    }

    async fn create(&self, employee: NewEmployee) -> Result<Employee, RepositoryError> {
        employee.validate()?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO employees (employee_code, name, surname, password_hash, category, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&employee.employee_code)
        .bind(&employee.name)
        .bind(&employee.surname)
        .bind(&employee.password_hash)
        .bind(employee.category.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Employee {
            id: EmployeeId(result.last_insert_rowid()),
            employee_code: employee.employee_code,
            name: employee.name,
            surname: employee.surname,
            password_hash: employee.password_hash,
            category: employee.category,
            created_at: Some(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use smartshelf_core::domain::employee::{EmployeeCategory, NewEmployee};

    use super::SqlEmployeeRepository;
    use crate::repositories::{EmployeeRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlEmployeeRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlEmployeeRepository::new(pool)
    }

    fn new_employee(code: &str) -> NewEmployee {
        NewEmployee {
            employee_code: code.to_string(),
            name: "Grace".to_string(),
            surname: "Hopper".to_string(),
            password_hash: "pbkdf2:sha256:1$salt$00".to_string(),
            category: EmployeeCategory::Diy,
        }
    }

    #[tokio::test]
    async fn find_by_code_returns_the_provisioned_employee() {
        let repo = setup().await;
        let created = repo.create(new_employee("E-001")).await.expect("create");

        let found = repo.find_by_code("E-001").await.expect("find").expect("exists");

        assert_eq!(found.id, created.id);
        assert_eq!(found.category, EmployeeCategory::Diy);
        assert_eq!(found.surname, "Hopper");
        assert!(found.created_at.is_some());
    }

    #[tokio::test]
    async fn unknown_code_returns_none() {
        let repo = setup().await;

        assert!(repo.find_by_code("nobody").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn employee_code_is_unique() {
        let repo = setup().await;
        repo.create(new_employee("E-001")).await.expect("first create");

        let error = repo.create(new_employee("E-001")).await.expect_err("duplicate code");

        assert!(matches!(error, RepositoryError::Constraint(_)));
    }
}

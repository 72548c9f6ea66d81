use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub i64);

/// Store department an employee belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeCategory {
    Garden,
    #[serde(rename = "DIY")]
    Diy,
    Construction,
    Tools,
}

impl EmployeeCategory {
    pub const ALL: [EmployeeCategory; 4] =
        [Self::Garden, Self::Diy, Self::Construction, Self::Tools];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Garden => "Garden",
            Self::Diy => "DIY",
            Self::Construction => "Construction",
            Self::Tools => "Tools",
        }
    }
}

impl fmt::Display for EmployeeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| DomainError::UnknownCategory(value.to_string()))
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub employee_code: String,
    pub name: String,
    pub surname: String,
    pub password_hash: String,
    pub category: EmployeeCategory,
    pub created_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Employee")
            .field("id", &self.id)
            .field("employee_code", &self.employee_code)
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("password_hash", &"[REDACTED]")
            .field("category", &self.category)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_code: String,
    pub name: String,
    pub surname: String,
    pub password_hash: String,
    pub category: EmployeeCategory,
}

impl fmt::Debug for NewEmployee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewEmployee")
            .field("employee_code", &self.employee_code)
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("password_hash", &"[REDACTED]")
            .field("category", &self.category)
            .finish()
    }
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.employee_code.trim().is_empty() {
            return Err(DomainError::BlankField("employee_code"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::BlankField("name"));
        }
        if self.surname.trim().is_empty() {
            return Err(DomainError::BlankField("surname"));
        }
        if self.password_hash.is_empty() {
            return Err(DomainError::BlankField("password_hash"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Employee, EmployeeCategory, EmployeeId, NewEmployee};
    use crate::errors::DomainError;

    #[test]
    fn category_parses_the_stored_spelling() {
        assert_eq!("DIY".parse::<EmployeeCategory>(), Ok(EmployeeCategory::Diy));
        assert_eq!("Garden".parse::<EmployeeCategory>(), Ok(EmployeeCategory::Garden));
        assert_eq!(
            "diy".parse::<EmployeeCategory>(),
            Err(DomainError::UnknownCategory("diy".to_string()))
        );
    }

    #[test]
    fn category_serializes_like_the_check_constraint() {
        let json = serde_json::to_string(&EmployeeCategory::Diy).expect("serialize");
        assert_eq!(json, "\"DIY\"");
    }

    #[test]
    fn debug_output_hides_password_hash() {
        let employee = Employee {
            id: EmployeeId(1),
            employee_code: "E-100".to_string(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            password_hash: "pbkdf2:sha256:1000$salt$abcdef".to_string(),
            category: EmployeeCategory::Tools,
            created_at: None,
        };

        let debug = format!("{employee:?}");
        assert!(!debug.contains("abcdef"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn new_employee_requires_a_code() {
        let new_employee = NewEmployee {
            employee_code: "  ".to_string(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            password_hash: "hash".to_string(),
            category: EmployeeCategory::Garden,
        };

        assert_eq!(new_employee.validate(), Err(DomainError::BlankField("employee_code")));
    }
}

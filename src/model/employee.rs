use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ValidationError, require_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ramesh Patel",
        "mobile": "9876543210",
        "version": 4,
        "created_at": "2026-01-01T08:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ramesh Patel")]
    pub name: String,

    #[schema(example = "9876543210")]
    pub mobile: String,

    /// Bumped by every write touching this employee's ledger.
    #[schema(example = 4)]
    pub version: u32,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new employee row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    name: String,
    mobile: String,
}

impl NewEmployee {
    pub fn new(name: &str, mobile: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text(name, ValidationError::EmptyName)?,
            mobile: validate_mobile(mobile)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeUpdate {
    name: Option<String>,
    mobile: Option<String>,
}

impl EmployeeUpdate {
    pub fn new(name: Option<&str>, mobile: Option<&str>) -> Result<Self, ValidationError> {
        let update = Self {
            name: name
                .map(|n| require_text(n, ValidationError::EmptyName))
                .transpose()?,
            mobile: mobile.map(validate_mobile).transpose()?,
        };
        if update.name.is_none() && update.mobile.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(update)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mobile(&self) -> Option<&str> {
        self.mobile.as_deref()
    }

    pub fn apply(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(mobile) = &self.mobile {
            employee.mobile = mobile.clone();
        }
    }
}

pub fn validate_mobile(mobile: &str) -> Result<String, ValidationError> {
    let mobile = mobile.trim();
    if mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit()) {
        Ok(mobile.to_string())
    } else {
        Err(ValidationError::InvalidMobile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_must_be_ten_digits() {
        assert!(validate_mobile("9876543210").is_ok());
        assert_eq!(validate_mobile("987654321"), Err(ValidationError::InvalidMobile));
        assert_eq!(validate_mobile("98765432100"), Err(ValidationError::InvalidMobile));
        assert_eq!(validate_mobile("98765-3210"), Err(ValidationError::InvalidMobile));
        assert_eq!(validate_mobile("९८७६५४३२१०"), Err(ValidationError::InvalidMobile));
    }

    #[test]
    fn new_employee_trims_name() {
        let employee = NewEmployee::new("  Sita  ", " 9123456780 ").unwrap();
        assert_eq!(employee.name(), "Sita");
        assert_eq!(employee.mobile(), "9123456780");
        assert_eq!(
            NewEmployee::new("   ", "9123456780"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn empty_update_is_rejected() {
        assert_eq!(EmployeeUpdate::new(None, None), Err(ValidationError::EmptyUpdate));
        let update = EmployeeUpdate::new(None, Some("9000000001")).unwrap();
        assert_eq!(update.name(), None);
        assert_eq!(update.mobile(), Some("9000000001"));
    }
}

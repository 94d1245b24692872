pub mod credit_entry;
pub mod employee;
pub mod payment_record;
pub mod salary_entry;
pub mod summary;

use derive_more::Display;
use rust_decimal::Decimal;

pub use credit_entry::{CreditEntry, CreditEntryUpdate, NewCreditEntry};
pub use employee::{Employee, EmployeeUpdate, NewEmployee};
pub use payment_record::{NewPaymentRecord, PaymentRecord};
pub use salary_entry::{AnimalType, NewSalaryEntry, SalaryEntry, SalaryEntryUpdate};

/// Rejected input for one of the record constructors.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ValidationError {
    #[display(fmt = "name must not be empty")]
    EmptyName,
    #[display(fmt = "mobile number must be exactly 10 digits")]
    InvalidMobile,
    #[display(fmt = "item name must not be empty")]
    EmptyItemName,
    #[display(fmt = "{} must be greater than zero", _0)]
    NotPositive(&'static str),
    #[display(fmt = "{} must have at most 2 decimal places", _0)]
    TooPrecise(&'static str),
    #[display(fmt = "no fields provided for update")]
    EmptyUpdate,
    #[display(fmt = "field `{}` cannot be updated", _0)]
    UnknownField(String),
}

impl std::error::Error for ValidationError {}

/// Decimal places of every money and liters column.
pub const DECIMAL_PLACES: u32 = 2;

/// True when `value` is stored without rounding in a `DECIMAL(_, 2)` column.
pub fn fits_decimal_places(value: Decimal) -> bool {
    value.round_dp(DECIMAL_PLACES) == value
}

pub(crate) fn require_positive(
    value: Decimal,
    field: &'static str,
) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive(field));
    }
    if !fits_decimal_places(value) {
        return Err(ValidationError::TooPrecise(field));
    }
    Ok(value)
}

pub(crate) fn require_text(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ValidationError, require_positive, require_text};

/// An advance or purchase the employee owes against future salary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "employee_id": 1,
        "date": "2026-02-14",
        "item_name": "Cattle feed",
        "amount": 120.0,
        "created_at": "2026-02-14T10:00:00Z"
    })
)]
pub struct CreditEntry {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Cattle feed")]
    pub item_name: String,
    #[schema(value_type = f64, example = 120.0)]
    pub amount: Decimal,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl CreditEntry {
    /// Checks a full row supplied for bulk replacement.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.item_name, ValidationError::EmptyItemName)?;
        require_positive(self.amount, "amount")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCreditEntry {
    employee_id: u64,
    date: NaiveDate,
    item_name: String,
    amount: Decimal,
}

impl NewCreditEntry {
    pub fn new(
        employee_id: u64,
        date: NaiveDate,
        item_name: &str,
        amount: Decimal,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            employee_id,
            date,
            item_name: require_text(item_name, ValidationError::EmptyItemName)?,
            amount: require_positive(amount, "amount")?,
        })
    }

    pub fn employee_id(&self) -> u64 {
        self.employee_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn into_entry(self, id: u64, created_at: DateTime<Utc>) -> CreditEntry {
        CreditEntry {
            id,
            employee_id: self.employee_id,
            date: self.date,
            item_name: self.item_name,
            amount: self.amount,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditEntryUpdate {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) item_name: Option<String>,
    pub(crate) amount: Option<Decimal>,
}

impl CreditEntryUpdate {
    pub fn new(
        date: Option<NaiveDate>,
        item_name: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        if date.is_none() && item_name.is_none() && amount.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(Self {
            date,
            item_name: item_name
                .map(|n| require_text(n, ValidationError::EmptyItemName))
                .transpose()?,
            amount: amount.map(|a| require_positive(a, "amount")).transpose()?,
        })
    }

    pub fn apply(&self, entry: &mut CreditEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(item_name) = &self.item_name {
            entry.item_name = item_name.clone();
        }
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
    }
}

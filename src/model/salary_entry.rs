use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::{ValidationError, require_positive};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnimalType {
    Cow,
    Buffalo,
}

/// One milk delivery owed to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 10,
        "employee_id": 1,
        "date": "2026-03-01",
        "amount": 450.0,
        "liters": 9.0,
        "animal_type": "buffalo",
        "created_at": "2026-03-01T07:30:00Z"
    })
)]
pub struct SalaryEntry {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = f64, example = 450.0)]
    pub amount: Decimal,
    #[schema(value_type = f64, example = 9.0)]
    pub liters: Decimal,
    pub animal_type: AnimalType,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSalaryEntry {
    employee_id: u64,
    date: NaiveDate,
    amount: Decimal,
    liters: Decimal,
    animal_type: AnimalType,
}

impl NewSalaryEntry {
    pub fn new(
        employee_id: u64,
        date: NaiveDate,
        amount: Decimal,
        liters: Decimal,
        animal_type: AnimalType,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            employee_id,
            date,
            amount: require_positive(amount, "amount")?,
            liters: require_positive(liters, "liters")?,
            animal_type,
        })
    }

    pub fn employee_id(&self) -> u64 {
        self.employee_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn liters(&self) -> Decimal {
        self.liters
    }

    pub fn animal_type(&self) -> AnimalType {
        self.animal_type
    }

    pub fn into_entry(self, id: u64, created_at: DateTime<Utc>) -> SalaryEntry {
        SalaryEntry {
            id,
            employee_id: self.employee_id,
            date: self.date,
            amount: self.amount,
            liters: self.liters,
            animal_type: self.animal_type,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryEntryUpdate {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) amount: Option<Decimal>,
    pub(crate) liters: Option<Decimal>,
    pub(crate) animal_type: Option<AnimalType>,
}

impl SalaryEntryUpdate {
    pub fn new(
        date: Option<NaiveDate>,
        amount: Option<Decimal>,
        liters: Option<Decimal>,
        animal_type: Option<AnimalType>,
    ) -> Result<Self, ValidationError> {
        if date.is_none() && amount.is_none() && liters.is_none() && animal_type.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(Self {
            date,
            amount: amount.map(|a| require_positive(a, "amount")).transpose()?,
            liters: liters.map(|l| require_positive(l, "liters")).transpose()?,
            animal_type,
        })
    }

    pub fn apply(&self, entry: &mut SalaryEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
        if let Some(liters) = self.liters {
            entry.liters = liters;
        }
        if let Some(animal_type) = self.animal_type {
            entry.animal_type = animal_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn amount_and_liters_must_be_positive() {
        let ok = NewSalaryEntry::new(1, day(), Decimal::new(450, 0), Decimal::new(9, 0), AnimalType::Cow);
        assert!(ok.is_ok());

        let zero_amount =
            NewSalaryEntry::new(1, day(), Decimal::ZERO, Decimal::new(9, 0), AnimalType::Cow);
        assert_eq!(zero_amount, Err(ValidationError::NotPositive("amount")));

        let negative_liters = NewSalaryEntry::new(
            1,
            day(),
            Decimal::new(450, 0),
            Decimal::new(-1, 0),
            AnimalType::Buffalo,
        );
        assert_eq!(negative_liters, Err(ValidationError::NotPositive("liters")));

        let fractional_liters =
            NewSalaryEntry::new(1, day(), Decimal::new(450, 0), Decimal::new(1, 3), AnimalType::Cow);
        assert_eq!(fractional_liters, Err(ValidationError::TooPrecise("liters")));
    }

    #[test]
    fn animal_type_round_trips_lowercase() {
        assert_eq!(AnimalType::Buffalo.to_string(), "buffalo");
        assert_eq!(AnimalType::from_str("cow").unwrap(), AnimalType::Cow);
        assert!(AnimalType::from_str("goat").is_err());
        assert_eq!(serde_json::to_string(&AnimalType::Cow).unwrap(), "\"cow\"");
    }

    #[test]
    fn update_applies_only_given_fields() {
        let mut entry = NewSalaryEntry::new(
            1,
            day(),
            Decimal::new(450, 0),
            Decimal::new(9, 0),
            AnimalType::Cow,
        )
        .unwrap()
        .into_entry(7, Utc::now());

        let update = SalaryEntryUpdate::new(None, Some(Decimal::new(500, 0)), None, None).unwrap();
        update.apply(&mut entry);

        assert_eq!(entry.amount, Decimal::new(500, 0));
        assert_eq!(entry.liters, Decimal::new(9, 0));
        assert_eq!(
            SalaryEntryUpdate::new(None, None, None, None),
            Err(ValidationError::EmptyUpdate)
        );
    }
}

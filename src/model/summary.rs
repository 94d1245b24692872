//! Derived views. Recomputed on every read, never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::AnimalType;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PaymentSummary {
    pub employee_id: u64,
    pub employee_name: String,
    #[schema(value_type = f64)]
    pub total_salary: Decimal,
    /// Lifetime total of outstanding credit; this is the settlement cap.
    #[schema(value_type = f64)]
    pub total_available_credit: Decimal,
    /// Outstanding credit dated after the last payment. Informational only.
    #[schema(value_type = f64)]
    pub credit_since_last_payment: Decimal,
    #[schema(value_type = f64)]
    pub manual_credit_deduction: Decimal,
    #[schema(value_type = f64)]
    pub net_payable: Decimal,
    #[schema(value_type = f64)]
    pub total_liters: Decimal,
    pub salary_entry_count: usize,
    #[schema(value_type = f64)]
    pub avg_salary_per_entry: Decimal,
    #[schema(value_type = f64)]
    pub rate_per_liter: Decimal,
    #[schema(value_type = Option<String>, format = "date")]
    pub last_payment_date: Option<NaiveDate>,
}

/// Lifetime position of one employee.
///
/// `balance = total_earned - total_credit - total_paid`, which works out to
/// the unsettled salary minus the outstanding credit.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LedgerBalance {
    pub employee_id: u64,
    #[schema(value_type = f64)]
    pub total_earned: Decimal,
    #[schema(value_type = f64)]
    pub total_credit: Decimal,
    #[schema(value_type = f64)]
    pub total_paid: Decimal,
    #[schema(value_type = f64)]
    pub balance: Decimal,
    pub payment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnimalTotals {
    pub animal_type: AnimalType,
    pub entry_count: usize,
    #[schema(value_type = f64)]
    pub liters: Decimal,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = f64)]
    pub rate_per_liter: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DairyReport {
    pub employee_count: usize,
    pub salary_entry_count: usize,
    #[schema(value_type = f64)]
    pub total_salary: Decimal,
    #[schema(value_type = f64)]
    pub total_liters: Decimal,
    #[schema(value_type = f64)]
    pub total_available_credit: Decimal,
    pub payment_count: usize,
    #[schema(value_type = f64)]
    pub total_net_paid: Decimal,
    #[schema(value_type = f64)]
    pub total_credit_deducted: Decimal,
    pub by_animal: Vec<AnimalTotals>,
}

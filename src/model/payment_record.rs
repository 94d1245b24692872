use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Append-only ledger row written once per settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 5,
        "reference": "0e9f6c1a-5d42-4a63-9a55-3c0d2f1b7e10",
        "employee_id": 1,
        "salary_amount": 1350.0,
        "credit_deducted": 200.0,
        "net_paid": 1150.0,
        "payment_date": "2026-03-31",
        "created_at": "2026-03-31T18:00:00Z"
    })
)]
pub struct PaymentRecord {
    pub id: u64,
    pub reference: String,
    pub employee_id: u64,
    #[schema(value_type = f64)]
    pub salary_amount: Decimal,
    #[schema(value_type = f64)]
    pub credit_deducted: Decimal,
    #[schema(value_type = f64)]
    pub net_paid: Decimal,
    #[schema(value_type = String, format = "date")]
    pub payment_date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NewPaymentRecord {
    pub reference: String,
    pub employee_id: u64,
    #[schema(value_type = f64)]
    pub salary_amount: Decimal,
    #[schema(value_type = f64)]
    pub credit_deducted: Decimal,
    #[schema(value_type = f64)]
    pub net_paid: Decimal,
    #[schema(value_type = String, format = "date")]
    pub payment_date: NaiveDate,
}

impl NewPaymentRecord {
    /// `net_paid` is `salary_amount - credit_deducted` and is not clamped.
    pub fn settle(
        employee_id: u64,
        salary_amount: Decimal,
        credit_deducted: Decimal,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            reference: Uuid::new_v4().to_string(),
            employee_id,
            salary_amount,
            credit_deducted,
            net_paid: salary_amount - credit_deducted,
            payment_date,
        }
    }

    pub fn into_record(self, id: u64, created_at: DateTime<Utc>) -> PaymentRecord {
        PaymentRecord {
            id,
            reference: self.reference,
            employee_id: self.employee_id,
            salary_amount: self.salary_amount,
            credit_deducted: self.credit_deducted,
            net_paid: self.net_paid,
            payment_date: self.payment_date,
            created_at,
        }
    }
}

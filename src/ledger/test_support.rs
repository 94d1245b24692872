//! Record builders shared by the unit tests.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::model::{AnimalType, CreditEntry, Employee, PaymentRecord, SalaryEntry};

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn stamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub fn employee(id: u64, name: &str) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        mobile: "9876543210".to_string(),
        version: 0,
        created_at: stamp(),
    }
}

pub fn salary(
    id: u64,
    employee_id: u64,
    date: NaiveDate,
    amount: &str,
    liters: &str,
    animal_type: AnimalType,
) -> SalaryEntry {
    SalaryEntry {
        id,
        employee_id,
        date,
        amount: dec(amount),
        liters: dec(liters),
        animal_type,
        created_at: stamp(),
    }
}

pub fn credit(id: u64, employee_id: u64, date: NaiveDate, amount: &str) -> CreditEntry {
    CreditEntry {
        id,
        employee_id,
        date,
        item_name: format!("item-{id}"),
        amount: dec(amount),
        created_at: stamp(),
    }
}

pub fn payment(
    id: u64,
    employee_id: u64,
    salary_amount: &str,
    credit_deducted: &str,
    payment_date: NaiveDate,
) -> PaymentRecord {
    let salary_amount = dec(salary_amount);
    let credit_deducted = dec(credit_deducted);
    PaymentRecord {
        id,
        reference: format!("ref-{id}"),
        employee_id,
        salary_amount,
        credit_deducted,
        net_paid: salary_amount - credit_deducted,
        payment_date,
        created_at: stamp(),
    }
}

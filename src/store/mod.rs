pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use derive_more::Display;

use crate::ledger::settlement::SettlementPlan;
use crate::model::{
    CreditEntry, CreditEntryUpdate, Employee, EmployeeUpdate, NewCreditEntry, NewEmployee,
    NewPaymentRecord, NewSalaryEntry, PaymentRecord, SalaryEntry, SalaryEntryUpdate,
    ValidationError,
};

pub use memory::MemoryRecordStore;
pub use mysql::MySqlRecordStore;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "{} {} not found", entity, id)]
    NotFound { entity: &'static str, id: u64 },
    #[display(
        fmt = "employee {} was modified concurrently (expected version {})",
        employee_id,
        expected_version
    )]
    Conflict {
        employee_id: u64,
        expected_version: u32,
    },
    #[display(fmt = "{}", _0)]
    Invalid(ValidationError),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Invalid(e)
    }
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        StoreError::NotFound { entity, id }
    }
}

/// Persistent tables behind the service.
///
/// Every write that touches an employee's salary or credit rows bumps that
/// employee's `version`, which `commit_settlement` checks before applying.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ordered by name.
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError>;
    async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError>;
    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> Result<Employee, StoreError>;
    /// Cascades to the employee's salary, credit and payment rows.
    async fn delete_employee(&self, id: u64) -> Result<(), StoreError>;

    /// Ordered by date, then id.
    async fn list_salary_entries(&self) -> Result<Vec<SalaryEntry>, StoreError>;
    async fn insert_salary_entry(&self, entry: NewSalaryEntry) -> Result<SalaryEntry, StoreError>;
    async fn update_salary_entry(
        &self,
        id: u64,
        update: SalaryEntryUpdate,
    ) -> Result<SalaryEntry, StoreError>;
    async fn delete_salary_entry(&self, id: u64) -> Result<(), StoreError>;
    async fn delete_all_salary_entries(&self) -> Result<u64, StoreError>;

    /// Ordered by date, then id.
    async fn list_credit_entries(&self) -> Result<Vec<CreditEntry>, StoreError>;
    async fn insert_credit_entry(&self, entry: NewCreditEntry) -> Result<CreditEntry, StoreError>;
    async fn update_credit_entry(
        &self,
        id: u64,
        update: CreditEntryUpdate,
    ) -> Result<CreditEntry, StoreError>;
    async fn delete_credit_entry(&self, id: u64) -> Result<(), StoreError>;
    /// Delete every credit row, then insert `entries` keeping their ids.
    async fn replace_all_credit_entries(&self, entries: Vec<CreditEntry>) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_payment_records(&self) -> Result<Vec<PaymentRecord>, StoreError>;
    async fn insert_payment_record(
        &self,
        record: NewPaymentRecord,
    ) -> Result<PaymentRecord, StoreError>;

    /// Apply a settlement atomically: check and bump the employee version,
    /// insert the payment, apply the credit adjustments and delete the
    /// cleared salary entries. On any error nothing is applied.
    async fn commit_settlement(&self, plan: &SettlementPlan) -> Result<PaymentRecord, StoreError>;
}

//! Settlement: turn an employee's outstanding salary entries into a single
//! payment, net of a chosen credit deduction.
//!
//! Planning is pure and synchronous. The store applies a plan in one
//! transaction, guarded by the employee's version, so a failed or racing
//! settlement leaves nothing half-written.

use std::collections::HashMap;

use chrono::NaiveDate;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::aggregation::{total_available_credit, total_salary};
use crate::model::{
    CreditEntry, Employee, NewPaymentRecord, PaymentRecord, SalaryEntry, fits_decimal_places,
};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Display)]
pub enum SettlementError {
    #[display(fmt = "manual credit cannot be negative")]
    NegativeDeduction,
    #[display(fmt = "manual credit must have at most 2 decimal places")]
    DeductionTooPrecise,
    #[display(
        fmt = "manual credit {} cannot exceed total available credit {}",
        requested,
        available
    )]
    ExceedsAvailableCredit {
        requested: Decimal,
        available: Decimal,
    },
    #[display(fmt = "no salary entries to settle")]
    NothingToSettle,
    #[display(fmt = "employee {} not found", _0)]
    EmployeeNotFound(u64),
    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl std::error::Error for SettlementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettlementError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SettlementError {
    fn from(e: StoreError) -> Self {
        SettlementError::Store(e)
    }
}

/// How one credit entry changes. `new_amount == 0` means the entry is removed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CreditAdjustment {
    pub credit_entry_id: u64,
    #[schema(value_type = f64)]
    pub previous_amount: Decimal,
    #[schema(value_type = f64)]
    pub new_amount: Decimal,
}

impl CreditAdjustment {
    pub fn is_consumed(&self) -> bool {
        self.new_amount.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reallocation {
    /// The whole credit collection after the deduction, in input order.
    pub entries: Vec<CreditEntry>,
    pub adjustments: Vec<CreditAdjustment>,
}

/// Consume `deduction` from `employee_id`'s credit, oldest entry first.
///
/// Entries are walked by `(date, id)`. A fully covered entry is dropped, the
/// first partially covered one is reduced, and the rest are untouched. Rows of
/// other employees pass through unchanged.
pub fn reallocate_credit(
    entries: &[CreditEntry],
    employee_id: u64,
    deduction: Decimal,
) -> Reallocation {
    let mut own: Vec<&CreditEntry> = entries
        .iter()
        .filter(|c| c.employee_id == employee_id)
        .collect();
    own.sort_by_key(|c| (c.date, c.id));

    let mut remaining = deduction;
    let mut adjustments = Vec::new();
    for entry in own {
        if remaining <= Decimal::ZERO {
            break;
        }
        let consumed = entry.amount.min(remaining);
        remaining -= consumed;
        adjustments.push(CreditAdjustment {
            credit_entry_id: entry.id,
            previous_amount: entry.amount,
            new_amount: entry.amount - consumed,
        });
    }

    let changed: HashMap<u64, Decimal> = adjustments
        .iter()
        .map(|a| (a.credit_entry_id, a.new_amount))
        .collect();

    let entries = entries
        .iter()
        .filter_map(|c| {
            let new_amount = match changed.get(&c.id) {
                Some(amount) if c.employee_id == employee_id => *amount,
                _ => return Some(c.clone()),
            };
            (!new_amount.is_zero()).then(|| CreditEntry {
                amount: new_amount,
                ..c.clone()
            })
        })
        .collect();

    Reallocation {
        entries,
        adjustments,
    }
}

/// Everything a settlement will write, computed before any write happens.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    pub employee_id: u64,
    /// Version read with the employee; the commit fails if it moved.
    pub expected_version: u32,
    pub payment: NewPaymentRecord,
    pub available_credit: Decimal,
    pub credit: Reallocation,
    pub cleared_salary_entry_ids: Vec<u64>,
}

impl SettlementPlan {
    pub fn remaining_credit(&self) -> Decimal {
        self.available_credit - self.payment.credit_deducted
    }
}

pub fn plan_settlement(
    employee: &Employee,
    salaries: &[SalaryEntry],
    credits: &[CreditEntry],
    deduction: Decimal,
    today: NaiveDate,
) -> Result<SettlementPlan, SettlementError> {
    let available = total_available_credit(credits, employee.id);
    let salary = total_salary(salaries, employee.id);

    if deduction < Decimal::ZERO {
        return Err(SettlementError::NegativeDeduction);
    }
    if !fits_decimal_places(deduction) {
        return Err(SettlementError::DeductionTooPrecise);
    }
    if deduction > available {
        return Err(SettlementError::ExceedsAvailableCredit {
            requested: deduction,
            available,
        });
    }
    if salary <= Decimal::ZERO {
        return Err(SettlementError::NothingToSettle);
    }

    Ok(SettlementPlan {
        employee_id: employee.id,
        expected_version: employee.version,
        payment: NewPaymentRecord::settle(employee.id, salary, deduction, today),
        available_credit: available,
        credit: reallocate_credit(credits, employee.id, deduction),
        cleared_salary_entry_ids: salaries
            .iter()
            .filter(|s| s.employee_id == employee.id)
            .map(|s| s.id)
            .collect(),
    })
}

/// Read the employee's current ledger and plan a settlement without writing.
pub async fn preview(
    store: &dyn RecordStore,
    employee_id: u64,
    deduction: Decimal,
    today: NaiveDate,
) -> Result<SettlementPlan, SettlementError> {
    // The version must be read before the rows it guards: any write landing
    // after this point bumps it and the commit reports a conflict.
    let employee = store
        .get_employee(employee_id)
        .await?
        .ok_or(SettlementError::EmployeeNotFound(employee_id))?;
    let (salaries, credits) =
        futures::try_join!(store.list_salary_entries(), store.list_credit_entries())?;

    plan_settlement(&employee, &salaries, &credits, deduction, today)
}

/// Settle an employee: record the payment, reduce credit, clear salary.
///
/// Validation failures return before any store write.
#[instrument(name = "settle", skip(store, deduction), fields(deduction = %deduction))]
pub async fn settle(
    store: &dyn RecordStore,
    employee_id: u64,
    deduction: Decimal,
    today: NaiveDate,
) -> Result<PaymentRecord, SettlementError> {
    let plan = match preview(store, employee_id, deduction, today).await {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, "Settlement rejected");
            return Err(e);
        }
    };

    let payment = store.commit_settlement(&plan).await?;

    info!(
        payment_id = payment.id,
        salary = %payment.salary_amount,
        credit_deducted = %payment.credit_deducted,
        net_paid = %payment.net_paid,
        cleared = plan.cleared_salary_entry_ids.len(),
        "Settlement committed"
    );

    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::test_support::*;
    use crate::model::{
        AnimalType, CreditEntryUpdate, EmployeeUpdate, NewCreditEntry, NewEmployee, NewSalaryEntry,
        SalaryEntryUpdate,
    };
    use async_trait::async_trait;
    use crate::store::memory::MemoryRecordStore;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        date(2026, 3, 31)
    }

    #[test]
    fn oldest_credit_is_consumed_first() {
        let credits = vec![
            credit(3, 1, date(2026, 1, 3), "20"),
            credit(1, 1, date(2026, 1, 1), "50"),
            credit(2, 1, date(2026, 1, 2), "30"),
        ];

        let result = reallocate_credit(&credits, 1, dec("60"));

        let remaining: Vec<_> = result.entries.iter().map(|c| (c.id, c.amount)).collect();
        assert_eq!(remaining, vec![(3, dec("20")), (2, dec("20"))]);
        assert_eq!(
            result.adjustments,
            vec![
                CreditAdjustment {
                    credit_entry_id: 1,
                    previous_amount: dec("50"),
                    new_amount: Decimal::ZERO,
                },
                CreditAdjustment {
                    credit_entry_id: 2,
                    previous_amount: dec("30"),
                    new_amount: dec("20"),
                },
            ]
        );
        assert!(result.adjustments[0].is_consumed());
    }

    #[test]
    fn same_day_credit_falls_back_to_id_order() {
        let credits = vec![
            credit(9, 1, date(2026, 1, 1), "10"),
            credit(4, 1, date(2026, 1, 1), "10"),
        ];
        let result = reallocate_credit(&credits, 1, dec("5"));
        assert_eq!(result.adjustments[0].credit_entry_id, 4);
    }

    #[test]
    fn zero_deduction_changes_nothing() {
        let credits = vec![credit(1, 1, date(2026, 1, 1), "50")];
        let result = reallocate_credit(&credits, 1, Decimal::ZERO);
        assert_eq!(result.entries, credits);
        assert!(result.adjustments.is_empty());
    }

    #[test]
    fn other_employees_pass_through() {
        let credits = vec![
            credit(1, 2, date(2025, 12, 1), "40"),
            credit(2, 1, date(2026, 1, 1), "50"),
            credit(3, 2, date(2026, 1, 5), "15"),
        ];
        let result = reallocate_credit(&credits, 1, dec("50"));
        assert_eq!(result.entries, vec![credits[0].clone(), credits[2].clone()]);
    }

    #[test]
    fn plan_validates_before_anything_else() {
        let alice = employee(1, "Alice");
        let salaries = vec![salary(1, 1, date(2026, 3, 1), "500", "10", AnimalType::Cow)];
        let credits = vec![credit(1, 1, date(2026, 2, 1), "100")];

        assert!(matches!(
            plan_settlement(&alice, &salaries, &credits, dec("-1"), today()),
            Err(SettlementError::NegativeDeduction)
        ));
        assert!(matches!(
            plan_settlement(&alice, &salaries, &credits, dec("100.01"), today()),
            Err(SettlementError::ExceedsAvailableCredit { .. })
        ));
        assert!(matches!(
            plan_settlement(&alice, &[], &credits, dec("10"), today()),
            Err(SettlementError::NothingToSettle)
        ));
        assert!(matches!(
            plan_settlement(&alice, &salaries, &credits, dec("0.005"), today()),
            Err(SettlementError::DeductionTooPrecise)
        ));
        assert!(plan_settlement(&alice, &salaries, &credits, dec("0.50"), today()).is_ok());
    }

    #[test]
    fn plan_computes_payment_and_cleared_entries() {
        let alice = employee(1, "Alice");
        let salaries = vec![
            salary(1, 1, date(2026, 3, 1), "500", "10", AnimalType::Cow),
            salary(2, 2, date(2026, 3, 1), "700", "12", AnimalType::Cow),
            salary(3, 1, date(2026, 3, 2), "250.25", "5", AnimalType::Buffalo),
        ];
        let credits = vec![credit(1, 1, date(2026, 2, 1), "100")];

        let plan = plan_settlement(&alice, &salaries, &credits, dec("100"), today()).unwrap();

        assert_eq!(plan.payment.salary_amount, dec("750.25"));
        assert_eq!(plan.payment.credit_deducted, dec("100"));
        assert_eq!(plan.payment.net_paid, dec("650.25"));
        assert_eq!(plan.payment.payment_date, today());
        assert_eq!(plan.cleared_salary_entry_ids, vec![1, 3]);
        assert_eq!(plan.remaining_credit(), Decimal::ZERO);
        assert!(plan.credit.entries.is_empty());
    }

    proptest! {
        #[test]
        fn net_paid_and_remaining_credit_are_exact(
            salary_cents in prop::collection::vec(1i64..=1_000_000, 1..=8),
            credit_cents in prop::collection::vec(1i64..=200_000, 0..=8),
            credit_days in prop::collection::vec(1u32..=28, 8),
            fraction in 0u32..=100,
        ) {
            let alice = employee(1, "Alice");
            let salaries: Vec<_> = salary_cents
                .iter()
                .enumerate()
                .map(|(i, c)| SalaryEntry {
                    amount: Decimal::new(*c, 2),
                    ..salary(i as u64 + 1, 1, date(2026, 3, 1), "1", "1", AnimalType::Cow)
                })
                .collect();
            let credits: Vec<_> = credit_cents
                .iter()
                .enumerate()
                .map(|(i, c)| CreditEntry {
                    amount: Decimal::new(*c, 2),
                    ..credit(i as u64 + 1, 1, date(2026, 2, credit_days[i]), "1")
                })
                .collect();

            let s = total_salary(&salaries, 1);
            let c = total_available_credit(&credits, 1);
            let d = (c * Decimal::from(fraction) / Decimal::from(100)).round_dp(2).min(c);

            let plan = plan_settlement(&alice, &salaries, &credits, d, today()).unwrap();

            prop_assert_eq!(plan.payment.net_paid, s - d);
            prop_assert_eq!(total_available_credit(&plan.credit.entries, 1), c - d);
            prop_assert!(plan.credit.entries.iter().all(|e| e.amount > Decimal::ZERO));
        }
    }

    async fn seeded_store() -> (MemoryRecordStore, u64, u64) {
        let store = MemoryRecordStore::default();
        let alice = store
            .insert_employee(NewEmployee::new("Alice", "9000000001").unwrap())
            .await
            .unwrap();
        let bob = store
            .insert_employee(NewEmployee::new("Bob", "9000000002").unwrap())
            .await
            .unwrap();

        for (who, day, amount) in [(alice.id, 1, "400"), (alice.id, 2, "350"), (bob.id, 1, "600")] {
            store
                .insert_salary_entry(
                    NewSalaryEntry::new(who, date(2026, 3, day), dec(amount), dec("8"), AnimalType::Cow)
                        .unwrap(),
                )
                .await
                .unwrap();
        }
        for (who, day, amount) in [(alice.id, 1, "50"), (alice.id, 2, "30"), (alice.id, 3, "20"), (bob.id, 1, "90")] {
            store
                .insert_credit_entry(
                    NewCreditEntry::new(who, date(2026, 1, day), "Feed", dec(amount)).unwrap(),
                )
                .await
                .unwrap();
        }
        (store, alice.id, bob.id)
    }

    #[actix_web::test]
    async fn settle_writes_payment_and_clears_only_that_employee() {
        let (store, alice, bob) = seeded_store().await;

        let payment = settle(&store, alice, dec("60"), today()).await.unwrap();

        assert_eq!(payment.salary_amount, dec("750"));
        assert_eq!(payment.credit_deducted, dec("60"));
        assert_eq!(payment.net_paid, dec("690"));

        let salaries = store.list_salary_entries().await.unwrap();
        assert!(salaries.iter().all(|s| s.employee_id == bob));
        assert_eq!(salaries.len(), 1);

        let credits = store.list_credit_entries().await.unwrap();
        let alice_credit: Vec<_> = credits
            .iter()
            .filter(|c| c.employee_id == alice)
            .map(|c| c.amount)
            .collect();
        assert_eq!(alice_credit, vec![dec("20"), dec("20")]);
        assert_eq!(total_available_credit(&credits, bob), dec("90"));

        let payments = store.list_payment_records().await.unwrap();
        assert_eq!(payments, vec![payment]);
    }

    #[actix_web::test]
    async fn rejected_settlement_writes_nothing() {
        let (store, alice, _) = seeded_store().await;
        let before = store.revision();

        let err = settle(&store, alice, dec("100.01"), today()).await.unwrap_err();

        assert!(matches!(err, SettlementError::ExceedsAvailableCredit { .. }));
        assert_eq!(store.revision(), before);
        assert!(store.list_payment_records().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn zero_deduction_pays_full_salary() {
        let (store, alice, _) = seeded_store().await;
        let credits_before = store.list_credit_entries().await.unwrap();

        let payment = settle(&store, alice, Decimal::ZERO, today()).await.unwrap();

        assert_eq!(payment.net_paid, dec("750"));
        assert_eq!(store.list_credit_entries().await.unwrap(), credits_before);
    }

    #[actix_web::test]
    async fn settling_twice_fails_the_second_time() {
        let (store, alice, _) = seeded_store().await;

        settle(&store, alice, dec("10"), today()).await.unwrap();
        let err = settle(&store, alice, dec("10"), today()).await.unwrap_err();

        assert!(matches!(err, SettlementError::NothingToSettle));
        assert_eq!(store.list_payment_records().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn unknown_employee_is_reported() {
        let (store, _, _) = seeded_store().await;
        let err = settle(&store, 999, Decimal::ZERO, today()).await.unwrap_err();
        assert!(matches!(err, SettlementError::EmployeeNotFound(999)));
    }

    #[actix_web::test]
    async fn stale_plan_is_refused() {
        let (store, alice, _) = seeded_store().await;
        let plan = preview(&store, alice, dec("10"), today()).await.unwrap();

        store
            .insert_salary_entry(
                NewSalaryEntry::new(alice, date(2026, 3, 5), dec("80"), dec("2"), AnimalType::Buffalo)
                    .unwrap(),
            )
            .await
            .unwrap();

        let err = store.commit_settlement(&plan).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert!(store.list_payment_records().await.unwrap().is_empty());
        assert_eq!(store.list_salary_entries().await.unwrap().len(), 4);
    }

    /// Delegates to a memory store, but edits a credit entry right after the
    /// employee row has been read, as another operator would.
    struct EditsAfterEmployeeRead {
        inner: MemoryRecordStore,
        credit_id: u64,
    }

    #[async_trait]
    impl RecordStore for EditsAfterEmployeeRead {
        async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
            self.inner.list_employees().await
        }
        async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
            let employee = self.inner.get_employee(id).await?;
            let update = CreditEntryUpdate::new(None, None, Some(dec("45")))?;
            self.inner.update_credit_entry(self.credit_id, update).await?;
            Ok(employee)
        }
        async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
            self.inner.insert_employee(employee).await
        }
        async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> Result<Employee, StoreError> {
            self.inner.update_employee(id, update).await
        }
        async fn delete_employee(&self, id: u64) -> Result<(), StoreError> {
            self.inner.delete_employee(id).await
        }
        async fn list_salary_entries(&self) -> Result<Vec<SalaryEntry>, StoreError> {
            self.inner.list_salary_entries().await
        }
        async fn insert_salary_entry(&self, entry: NewSalaryEntry) -> Result<SalaryEntry, StoreError> {
            self.inner.insert_salary_entry(entry).await
        }
        async fn update_salary_entry(
            &self,
            id: u64,
            update: SalaryEntryUpdate,
        ) -> Result<SalaryEntry, StoreError> {
            self.inner.update_salary_entry(id, update).await
        }
        async fn delete_salary_entry(&self, id: u64) -> Result<(), StoreError> {
            self.inner.delete_salary_entry(id).await
        }
        async fn delete_all_salary_entries(&self) -> Result<u64, StoreError> {
            self.inner.delete_all_salary_entries().await
        }
        async fn list_credit_entries(&self) -> Result<Vec<CreditEntry>, StoreError> {
            self.inner.list_credit_entries().await
        }
        async fn insert_credit_entry(&self, entry: NewCreditEntry) -> Result<CreditEntry, StoreError> {
            self.inner.insert_credit_entry(entry).await
        }
        async fn update_credit_entry(
            &self,
            id: u64,
            update: CreditEntryUpdate,
        ) -> Result<CreditEntry, StoreError> {
            self.inner.update_credit_entry(id, update).await
        }
        async fn delete_credit_entry(&self, id: u64) -> Result<(), StoreError> {
            self.inner.delete_credit_entry(id).await
        }
        async fn replace_all_credit_entries(&self, entries: Vec<CreditEntry>) -> Result<(), StoreError> {
            self.inner.replace_all_credit_entries(entries).await
        }
        async fn list_payment_records(&self) -> Result<Vec<PaymentRecord>, StoreError> {
            self.inner.list_payment_records().await
        }
        async fn insert_payment_record(
            &self,
            record: NewPaymentRecord,
        ) -> Result<PaymentRecord, StoreError> {
            self.inner.insert_payment_record(record).await
        }
        async fn commit_settlement(&self, plan: &SettlementPlan) -> Result<PaymentRecord, StoreError> {
            self.inner.commit_settlement(plan).await
        }
    }

    #[actix_web::test]
    async fn edit_between_reads_makes_settlement_conflict() {
        let (inner, alice, _) = seeded_store().await;
        let oldest = inner
            .list_credit_entries()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.employee_id == alice && c.amount == dec("50"))
            .unwrap();
        let store = EditsAfterEmployeeRead {
            inner,
            credit_id: oldest.id,
        };

        let err = settle(&store, alice, dec("40"), today()).await.unwrap_err();

        assert!(matches!(err, SettlementError::Store(StoreError::Conflict { .. })));
        let credits = store.inner.list_credit_entries().await.unwrap();
        let edited = credits.iter().find(|c| c.id == oldest.id).unwrap();
        assert_eq!(edited.amount, dec("45"));
        assert!(store.inner.list_payment_records().await.unwrap().is_empty());
        assert_eq!(
            total_salary(&store.inner.list_salary_entries().await.unwrap(), alice),
            dec("750")
        );
    }
}

//! Process-local record store, used when no database is configured and by
//! the test suite. A single lock makes every operation atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{RecordStore, StoreError};
use crate::ledger::settlement::SettlementPlan;
use crate::model::{
    CreditEntry, CreditEntryUpdate, Employee, EmployeeUpdate, NewCreditEntry, NewEmployee,
    NewPaymentRecord, NewSalaryEntry, PaymentRecord, SalaryEntry, SalaryEntryUpdate,
};

#[derive(Debug, Default)]
struct Tables {
    last_id: u64,
    revision: u64,
    employees: BTreeMap<u64, Employee>,
    salary_entries: BTreeMap<u64, SalaryEntry>,
    credit_entries: BTreeMap<u64, CreditEntry>,
    payment_records: BTreeMap<u64, PaymentRecord>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn require_employee(&self, id: u64) -> Result<(), StoreError> {
        if self.employees.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::not_found("employee", id))
        }
    }

    fn touch(&mut self, employee_id: u64) {
        if let Some(employee) = self.employees.get_mut(&employee_id) {
            employee.version += 1;
        }
    }

    fn touch_all(&mut self) {
        for employee in self.employees.values_mut() {
            employee.version += 1;
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: Mutex<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of writes applied so far.
    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.tables.lock().revision
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.lock();
        f(&tables)
    }

    /// `f` must check everything before mutating, so an error leaves the
    /// tables untouched.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.lock();
        let out = f(&mut *tables)?;
        tables.revision += 1;
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<_> = self.read(|t| t.employees.values().cloned().collect());
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.read(|t| t.employees.get(&id).cloned()))
    }

    async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        self.write(|t| {
            let id = t.next_id();
            let employee = Employee {
                id,
                name: employee.name().to_string(),
                mobile: employee.mobile().to_string(),
                version: 0,
                created_at: Utc::now(),
            };
            t.employees.insert(id, employee.clone());
            Ok(employee)
        })
    }

    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> Result<Employee, StoreError> {
        self.write(|t| {
            let employee = t
                .employees
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("employee", id))?;
            update.apply(employee);
            Ok(employee.clone())
        })
    }

    async fn delete_employee(&self, id: u64) -> Result<(), StoreError> {
        self.write(|t| {
            t.employees
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("employee", id))?;
            t.salary_entries.retain(|_, e| e.employee_id != id);
            t.credit_entries.retain(|_, e| e.employee_id != id);
            t.payment_records.retain(|_, p| p.employee_id != id);
            Ok(())
        })
    }

    async fn list_salary_entries(&self) -> Result<Vec<SalaryEntry>, StoreError> {
        let mut entries: Vec<_> = self.read(|t| t.salary_entries.values().cloned().collect());
        entries.sort_by_key(|e| (e.date, e.id));
        Ok(entries)
    }

    async fn insert_salary_entry(&self, entry: NewSalaryEntry) -> Result<SalaryEntry, StoreError> {
        self.write(|t| {
            t.require_employee(entry.employee_id())?;
            let id = t.next_id();
            let entry = entry.into_entry(id, Utc::now());
            t.touch(entry.employee_id);
            t.salary_entries.insert(id, entry.clone());
            Ok(entry)
        })
    }

    async fn update_salary_entry(
        &self,
        id: u64,
        update: SalaryEntryUpdate,
    ) -> Result<SalaryEntry, StoreError> {
        self.write(|t| {
            let entry = t
                .salary_entries
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("salary entry", id))?;
            update.apply(entry);
            let entry = entry.clone();
            t.touch(entry.employee_id);
            Ok(entry)
        })
    }

    async fn delete_salary_entry(&self, id: u64) -> Result<(), StoreError> {
        self.write(|t| {
            let entry = t
                .salary_entries
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("salary entry", id))?;
            t.touch(entry.employee_id);
            Ok(())
        })
    }

    async fn delete_all_salary_entries(&self) -> Result<u64, StoreError> {
        self.write(|t| {
            let removed = t.salary_entries.len() as u64;
            t.salary_entries.clear();
            t.touch_all();
            Ok(removed)
        })
    }

    async fn list_credit_entries(&self) -> Result<Vec<CreditEntry>, StoreError> {
        let mut entries: Vec<_> = self.read(|t| t.credit_entries.values().cloned().collect());
        entries.sort_by_key(|e| (e.date, e.id));
        Ok(entries)
    }

    async fn insert_credit_entry(&self, entry: NewCreditEntry) -> Result<CreditEntry, StoreError> {
        self.write(|t| {
            t.require_employee(entry.employee_id())?;
            let id = t.next_id();
            let entry = entry.into_entry(id, Utc::now());
            t.touch(entry.employee_id);
            t.credit_entries.insert(id, entry.clone());
            Ok(entry)
        })
    }

    async fn update_credit_entry(
        &self,
        id: u64,
        update: CreditEntryUpdate,
    ) -> Result<CreditEntry, StoreError> {
        self.write(|t| {
            let entry = t
                .credit_entries
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("credit entry", id))?;
            update.apply(entry);
            let entry = entry.clone();
            t.touch(entry.employee_id);
            Ok(entry)
        })
    }

    async fn delete_credit_entry(&self, id: u64) -> Result<(), StoreError> {
        self.write(|t| {
            let entry = t
                .credit_entries
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("credit entry", id))?;
            t.touch(entry.employee_id);
            Ok(())
        })
    }

    async fn replace_all_credit_entries(&self, entries: Vec<CreditEntry>) -> Result<(), StoreError> {
        self.write(|t| {
            for entry in &entries {
                entry.validate()?;
                t.require_employee(entry.employee_id)?;
            }
            t.credit_entries = entries.into_iter().map(|e| (e.id, e)).collect();
            if let Some(max_id) = t.credit_entries.keys().next_back().copied() {
                t.last_id = t.last_id.max(max_id);
            }
            t.touch_all();
            Ok(())
        })
    }

    async fn list_payment_records(&self) -> Result<Vec<PaymentRecord>, StoreError> {
        let mut records: Vec<_> = self.read(|t| t.payment_records.values().cloned().collect());
        records.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn insert_payment_record(
        &self,
        record: NewPaymentRecord,
    ) -> Result<PaymentRecord, StoreError> {
        self.write(|t| {
            t.require_employee(record.employee_id)?;
            let id = t.next_id();
            let record = record.into_record(id, Utc::now());
            t.payment_records.insert(id, record.clone());
            Ok(record)
        })
    }

    async fn commit_settlement(&self, plan: &SettlementPlan) -> Result<PaymentRecord, StoreError> {
        self.write(|t| {
            let employee = t
                .employees
                .get_mut(&plan.employee_id)
                .ok_or_else(|| StoreError::not_found("employee", plan.employee_id))?;
            if employee.version != plan.expected_version {
                return Err(StoreError::Conflict {
                    employee_id: plan.employee_id,
                    expected_version: plan.expected_version,
                });
            }
            employee.version += 1;

            let id = t.next_id();
            let record = plan.payment.clone().into_record(id, Utc::now());
            t.payment_records.insert(id, record.clone());

            for adjustment in &plan.credit.adjustments {
                if adjustment.is_consumed() {
                    t.credit_entries.remove(&adjustment.credit_entry_id);
                } else if let Some(entry) = t.credit_entries.get_mut(&adjustment.credit_entry_id) {
                    entry.amount = adjustment.new_amount;
                }
            }
            for salary_id in &plan.cleared_salary_entry_ids {
                t.salary_entries.remove(salary_id);
            }
            Ok(record)
        })
    }
}

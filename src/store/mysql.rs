use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlConnection, MySqlPool, Row};
use tracing::debug;

use super::{RecordStore, StoreError};
use crate::ledger::settlement::SettlementPlan;
use crate::model::{
    CreditEntry, CreditEntryUpdate, Employee, EmployeeUpdate, NewCreditEntry, NewEmployee,
    NewPaymentRecord, NewSalaryEntry, PaymentRecord, SalaryEntry, SalaryEntryUpdate,
};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

impl<'r> FromRow<'r, MySqlRow> for SalaryEntry {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let animal_type: String = row.try_get("animal_type")?;
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            date: row.try_get("date")?,
            amount: row.try_get("amount")?,
            liters: row.try_get("liters")?,
            animal_type: animal_type
                .parse()
                .map_err(|e: strum::ParseError| sqlx::Error::ColumnDecode {
                    index: "animal_type".into(),
                    source: Box::new(e),
                })?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// MySQL-backed store. Multi-row writes run inside one transaction.
#[derive(Clone)]
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_employee(&self, id: u64) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, mobile, version, created_at
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn fetch_salary_entry(&self, id: u64) -> Result<SalaryEntry, StoreError> {
        sqlx::query_as::<_, SalaryEntry>(
            r#"
            SELECT id, employee_id, date, amount, liters, animal_type, created_at
            FROM salary_entries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("salary entry", id))
    }

    async fn fetch_credit_entry(&self, id: u64) -> Result<CreditEntry, StoreError> {
        sqlx::query_as::<_, CreditEntry>(
            r#"
            SELECT id, employee_id, date, item_name, amount, created_at
            FROM credit_entries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("credit entry", id))
    }

    async fn fetch_payment_record(&self, id: u64) -> Result<PaymentRecord, StoreError> {
        sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT id, reference, employee_id, salary_amount, credit_deducted, net_paid,
                   payment_date, created_at
            FROM payment_records
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("payment record", id))
    }
}

/// Lock the employee row for the rest of the transaction.
async fn lock_employee(conn: &mut MySqlConnection, employee_id: u64) -> Result<u32, StoreError> {
    sqlx::query_scalar::<_, u32>("SELECT version FROM employees WHERE id = ? FOR UPDATE")
        .bind(employee_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("employee", employee_id))
}

async fn touch_employee(conn: &mut MySqlConnection, employee_id: u64) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE employees SET version = version + 1 WHERE id = ?")
        .bind(employee_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("employee", employee_id));
    }
    Ok(())
}

/// Owner of a detail row, locked for the rest of the transaction.
async fn lock_owner(
    conn: &mut MySqlConnection,
    table: &'static str,
    entity: &'static str,
    id: u64,
) -> Result<u64, StoreError> {
    let sql = format!("SELECT employee_id FROM {} WHERE id = ? FOR UPDATE", table);
    sqlx::query_scalar::<_, u64>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found(entity, id))
}

async fn insert_payment(
    conn: &mut MySqlConnection,
    record: &NewPaymentRecord,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO payment_records
        (reference, employee_id, salary_amount, credit_deducted, net_paid, payment_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.reference)
    .bind(record.employee_id)
    .bind(record.salary_amount)
    .bind(record.credit_deducted)
    .bind(record.net_paid)
    .bind(record.payment_date)
    .execute(conn)
    .await?;
    Ok(result.last_insert_id())
}

fn employee_assignments(update: &EmployeeUpdate) -> Vec<(&'static str, SqlValue)> {
    let mut out = Vec::new();
    if let Some(name) = update.name() {
        out.push(("name", SqlValue::String(name.to_string())));
    }
    if let Some(mobile) = update.mobile() {
        out.push(("mobile", SqlValue::String(mobile.to_string())));
    }
    out
}

fn salary_assignments(update: &SalaryEntryUpdate) -> Vec<(&'static str, SqlValue)> {
    let mut out = Vec::new();
    if let Some(date) = update.date {
        out.push(("date", SqlValue::Date(date)));
    }
    if let Some(amount) = update.amount {
        out.push(("amount", SqlValue::Decimal(amount)));
    }
    if let Some(liters) = update.liters {
        out.push(("liters", SqlValue::Decimal(liters)));
    }
    if let Some(animal_type) = update.animal_type {
        out.push(("animal_type", SqlValue::String(animal_type.to_string())));
    }
    out
}

fn credit_assignments(update: &CreditEntryUpdate) -> Vec<(&'static str, SqlValue)> {
    let mut out = Vec::new();
    if let Some(date) = update.date {
        out.push(("date", SqlValue::Date(date)));
    }
    if let Some(item_name) = &update.item_name {
        out.push(("item_name", SqlValue::String(item_name.clone())));
    }
    if let Some(amount) = update.amount {
        out.push(("amount", SqlValue::Decimal(amount)));
    }
    out
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, mobile, version, created_at
            FROM employees
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.fetch_employee(id).await?)
    }

    async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let result = sqlx::query("INSERT INTO employees (name, mobile) VALUES (?, ?)")
            .bind(employee.name())
            .bind(employee.mobile())
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_id();
        debug!(employee_id = id, "Employee inserted");

        self.fetch_employee(id)
            .await?
            .ok_or_else(|| StoreError::not_found("employee", id))
    }

    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> Result<Employee, StoreError> {
        let update = build_update_sql(
            "employees",
            employee_assignments(&update),
            &["name", "mobile"],
            "id",
            id,
        )?;

        let mut tx = self.pool.begin().await?;
        lock_employee(&mut tx, id).await?;
        execute_update(&mut tx, update).await?;
        tx.commit().await?;

        self.fetch_employee(id)
            .await?
            .ok_or_else(|| StoreError::not_found("employee", id))
    }

    async fn delete_employee(&self, id: u64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("employee", id));
        }
        Ok(())
    }

    async fn list_salary_entries(&self) -> Result<Vec<SalaryEntry>, StoreError> {
        let entries = sqlx::query_as::<_, SalaryEntry>(
            r#"
            SELECT id, employee_id, date, amount, liters, animal_type, created_at
            FROM salary_entries
            ORDER BY date, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert_salary_entry(&self, entry: NewSalaryEntry) -> Result<SalaryEntry, StoreError> {
        let mut tx = self.pool.begin().await?;
        touch_employee(&mut tx, entry.employee_id()).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO salary_entries (employee_id, date, amount, liters, animal_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.employee_id())
        .bind(entry.date())
        .bind(entry.amount())
        .bind(entry.liters())
        .bind(entry.animal_type().to_string())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.fetch_salary_entry(result.last_insert_id()).await
    }

    async fn update_salary_entry(
        &self,
        id: u64,
        update: SalaryEntryUpdate,
    ) -> Result<SalaryEntry, StoreError> {
        let update = build_update_sql(
            "salary_entries",
            salary_assignments(&update),
            &["date", "amount", "liters", "animal_type"],
            "id",
            id,
        )?;

        let mut tx = self.pool.begin().await?;
        let owner = lock_owner(&mut tx, "salary_entries", "salary entry", id).await?;
        execute_update(&mut tx, update).await?;
        touch_employee(&mut tx, owner).await?;
        tx.commit().await?;

        self.fetch_salary_entry(id).await
    }

    async fn delete_salary_entry(&self, id: u64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let owner = lock_owner(&mut tx, "salary_entries", "salary entry", id).await?;
        sqlx::query("DELETE FROM salary_entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        touch_employee(&mut tx, owner).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_salary_entries(&self) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM salary_entries")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("UPDATE employees SET version = version + 1")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(removed)
    }

    async fn list_credit_entries(&self) -> Result<Vec<CreditEntry>, StoreError> {
        let entries = sqlx::query_as::<_, CreditEntry>(
            r#"
            SELECT id, employee_id, date, item_name, amount, created_at
            FROM credit_entries
            ORDER BY date, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert_credit_entry(&self, entry: NewCreditEntry) -> Result<CreditEntry, StoreError> {
        let mut tx = self.pool.begin().await?;
        touch_employee(&mut tx, entry.employee_id()).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO credit_entries (employee_id, date, item_name, amount)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.employee_id())
        .bind(entry.date())
        .bind(entry.item_name())
        .bind(entry.amount())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.fetch_credit_entry(result.last_insert_id()).await
    }

    async fn update_credit_entry(
        &self,
        id: u64,
        update: CreditEntryUpdate,
    ) -> Result<CreditEntry, StoreError> {
        let update = build_update_sql(
            "credit_entries",
            credit_assignments(&update),
            &["date", "item_name", "amount"],
            "id",
            id,
        )?;

        let mut tx = self.pool.begin().await?;
        let owner = lock_owner(&mut tx, "credit_entries", "credit entry", id).await?;
        execute_update(&mut tx, update).await?;
        touch_employee(&mut tx, owner).await?;
        tx.commit().await?;

        self.fetch_credit_entry(id).await
    }

    async fn delete_credit_entry(&self, id: u64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let owner = lock_owner(&mut tx, "credit_entries", "credit entry", id).await?;
        sqlx::query("DELETE FROM credit_entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        touch_employee(&mut tx, owner).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_all_credit_entries(&self, entries: Vec<CreditEntry>) -> Result<(), StoreError> {
        for entry in &entries {
            entry.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM credit_entries")
            .execute(&mut *tx)
            .await?;
        for entry in &entries {
            sqlx::query(
                r#"
                INSERT INTO credit_entries (id, employee_id, date, item_name, amount, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.id)
            .bind(entry.employee_id)
            .bind(entry.date)
            .bind(&entry.item_name)
            .bind(entry.amount)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }
        sqlx::query("UPDATE employees SET version = version + 1")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(count = entries.len(), "Credit entries replaced");
        Ok(())
    }

    async fn list_payment_records(&self) -> Result<Vec<PaymentRecord>, StoreError> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT id, reference, employee_id, salary_amount, credit_deducted, net_paid,
                   payment_date, created_at
            FROM payment_records
            ORDER BY payment_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn insert_payment_record(
        &self,
        record: NewPaymentRecord,
    ) -> Result<PaymentRecord, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_employee(&mut tx, record.employee_id).await?;
        let id = insert_payment(&mut tx, &record).await?;
        tx.commit().await?;

        self.fetch_payment_record(id).await
    }

    async fn commit_settlement(&self, plan: &SettlementPlan) -> Result<PaymentRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            "UPDATE employees SET version = version + 1 WHERE id = ? AND version = ?",
        )
        .bind(plan.employee_id)
        .bind(plan.expected_version)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            // Dropping `tx` rolls back.
            return match lock_employee(&mut tx, plan.employee_id).await {
                Ok(_) => Err(StoreError::Conflict {
                    employee_id: plan.employee_id,
                    expected_version: plan.expected_version,
                }),
                Err(e) => Err(e),
            };
        }

        let payment_id = insert_payment(&mut tx, &plan.payment).await?;

        for adjustment in &plan.credit.adjustments {
            if adjustment.is_consumed() {
                sqlx::query("DELETE FROM credit_entries WHERE id = ? AND employee_id = ?")
                    .bind(adjustment.credit_entry_id)
                    .bind(plan.employee_id)
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query("UPDATE credit_entries SET amount = ? WHERE id = ? AND employee_id = ?")
                    .bind(adjustment.new_amount)
                    .bind(adjustment.credit_entry_id)
                    .bind(plan.employee_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        for salary_id in &plan.cleared_salary_entry_ids {
            sqlx::query("DELETE FROM salary_entries WHERE id = ? AND employee_id = ?")
                .bind(salary_id)
                .bind(plan.employee_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(payment_id, employee_id = plan.employee_id, "Settlement transaction committed");

        self.fetch_payment_record(payment_id).await
    }
}

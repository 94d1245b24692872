//! Filtering and paging over already-fetched record lists.

use chrono::NaiveDate;

use crate::model::{AnimalType, CreditEntry, Employee, PaymentRecord, SalaryEntry};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Criteria shared by the dated record lists. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntryFilter {
    pub employee_id: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EntryFilter {
    fn accepts(&self, employee_id: u64, date: NaiveDate) -> bool {
        self.employee_id.is_none_or(|id| id == employee_id)
            && self.from.is_none_or(|from| date >= from)
            && self.to.is_none_or(|to| date <= to)
    }
}

pub fn filter_salary_entries(
    entries: Vec<SalaryEntry>,
    filter: &EntryFilter,
    animal_type: Option<AnimalType>,
) -> Vec<SalaryEntry> {
    entries
        .into_iter()
        .filter(|e| filter.accepts(e.employee_id, e.date))
        .filter(|e| animal_type.is_none_or(|a| a == e.animal_type))
        .collect()
}

pub fn filter_credit_entries(entries: Vec<CreditEntry>, filter: &EntryFilter) -> Vec<CreditEntry> {
    entries
        .into_iter()
        .filter(|e| filter.accepts(e.employee_id, e.date))
        .collect()
}

pub fn filter_payments(payments: Vec<PaymentRecord>, filter: &EntryFilter) -> Vec<PaymentRecord> {
    payments
        .into_iter()
        .filter(|p| filter.accepts(p.employee_id, p.payment_date))
        .collect()
}

/// Case-insensitive match on name, substring match on mobile.
pub fn search_employees(employees: Vec<Employee>, search: Option<&str>) -> Vec<Employee> {
    let needle = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_lowercase(),
        None => return employees,
    };
    employees
        .into_iter()
        .filter(|e| e.name.to_lowercase().contains(&needle) || e.mobile.contains(&needle))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// 1-based paging; `per_page` is clamped to `1..=MAX_PER_PAGE`.
pub fn paginate<T>(items: Vec<T>, page: Option<u32>, per_page: Option<u32>) -> Page<T> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let total = items.len() as i64;
    let offset = (page as usize - 1).saturating_mul(per_page as usize);

    let data = items
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Page {
        data,
        page,
        per_page,
        total,
    }
}

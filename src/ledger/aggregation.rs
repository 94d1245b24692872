//! Pure reductions over fetched record lists.
//!
//! Nothing here fails: empty input gives zero, and every division is guarded
//! so a zero denominator yields zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use strum::IntoEnumIterator;

use crate::model::{
    AnimalType, CreditEntry, Employee, PaymentRecord, SalaryEntry,
    summary::{AnimalTotals, DairyReport, LedgerBalance, PaymentSummary},
};

pub fn total_salary(entries: &[SalaryEntry], employee_id: u64) -> Decimal {
    entries
        .iter()
        .filter(|e| e.employee_id == employee_id)
        .map(|e| e.amount)
        .sum()
}

pub fn total_liters(entries: &[SalaryEntry], employee_id: u64) -> Decimal {
    entries
        .iter()
        .filter(|e| e.employee_id == employee_id)
        .map(|e| e.liters)
        .sum()
}

pub fn salary_entry_count(entries: &[SalaryEntry], employee_id: u64) -> usize {
    entries.iter().filter(|e| e.employee_id == employee_id).count()
}

/// Lifetime credit total, not scoped to the last payment.
pub fn total_available_credit(entries: &[CreditEntry], employee_id: u64) -> Decimal {
    entries
        .iter()
        .filter(|e| e.employee_id == employee_id)
        .map(|e| e.amount)
        .sum()
}

/// Credit dated strictly after `since`; everything when `since` is `None`.
pub fn credit_since(entries: &[CreditEntry], employee_id: u64, since: Option<NaiveDate>) -> Decimal {
    entries
        .iter()
        .filter(|e| e.employee_id == employee_id)
        .filter(|e| since.is_none_or(|d| e.date > d))
        .map(|e| e.amount)
        .sum()
}

pub fn total_paid(payments: &[PaymentRecord], employee_id: u64) -> Decimal {
    payments
        .iter()
        .filter(|p| p.employee_id == employee_id)
        .map(|p| p.net_paid)
        .sum()
}

pub fn last_payment_date(payments: &[PaymentRecord], employee_id: u64) -> Option<NaiveDate> {
    payments
        .iter()
        .filter(|p| p.employee_id == employee_id)
        .map(|p| p.payment_date)
        .max()
}

/// May be negative when the deduction exceeds the salary.
pub fn net_payable(total_salary: Decimal, manual_credit: Decimal) -> Decimal {
    total_salary - manual_credit
}

pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
    }
}

pub fn average_per_entry(total: Decimal, count: usize) -> Decimal {
    safe_div(total, Decimal::from(count)).round_dp(2)
}

pub fn rate_per_liter(amount: Decimal, liters: Decimal) -> Decimal {
    safe_div(amount, liters).round_dp(2)
}

pub fn ledger_balance(
    employee_id: u64,
    salaries: &[SalaryEntry],
    credits: &[CreditEntry],
    payments: &[PaymentRecord],
) -> LedgerBalance {
    let own_payments = payments.iter().filter(|p| p.employee_id == employee_id);

    let (settled_salary, deducted_credit, payment_count) = own_payments.fold(
        (Decimal::ZERO, Decimal::ZERO, 0usize),
        |(salary, credit, count), p| (salary + p.salary_amount, credit + p.credit_deducted, count + 1),
    );

    let total_earned = total_salary(salaries, employee_id) + settled_salary;
    let total_credit = total_available_credit(credits, employee_id) + deducted_credit;
    let total_paid = total_paid(payments, employee_id);

    LedgerBalance {
        employee_id,
        total_earned,
        total_credit,
        total_paid,
        balance: total_earned - total_credit - total_paid,
        payment_count,
    }
}

pub fn animal_breakdown(entries: &[SalaryEntry]) -> Vec<AnimalTotals> {
    AnimalType::iter()
        .map(|animal_type| {
            let (entry_count, liters, amount) = entries
                .iter()
                .filter(|e| e.animal_type == animal_type)
                .fold((0usize, Decimal::ZERO, Decimal::ZERO), |(n, l, a), e| {
                    (n + 1, l + e.liters, a + e.amount)
                });
            AnimalTotals {
                animal_type,
                entry_count,
                liters,
                amount,
                rate_per_liter: rate_per_liter(amount, liters),
            }
        })
        .collect()
}

pub fn payment_summary(
    employee: &Employee,
    salaries: &[SalaryEntry],
    credits: &[CreditEntry],
    payments: &[PaymentRecord],
    manual_credit: Decimal,
) -> PaymentSummary {
    let total_salary = total_salary(salaries, employee.id);
    let total_liters = total_liters(salaries, employee.id);
    let salary_entry_count = salary_entry_count(salaries, employee.id);
    let last_payment_date = last_payment_date(payments, employee.id);

    PaymentSummary {
        employee_id: employee.id,
        employee_name: employee.name.clone(),
        total_salary,
        total_available_credit: total_available_credit(credits, employee.id),
        credit_since_last_payment: credit_since(credits, employee.id, last_payment_date),
        manual_credit_deduction: manual_credit,
        net_payable: net_payable(total_salary, manual_credit),
        total_liters,
        salary_entry_count,
        avg_salary_per_entry: average_per_entry(total_salary, salary_entry_count),
        rate_per_liter: rate_per_liter(total_salary, total_liters),
        last_payment_date,
    }
}

/// One summary per employee, ordered by name.
pub fn payment_summaries(
    employees: &[Employee],
    salaries: &[SalaryEntry],
    credits: &[CreditEntry],
    payments: &[PaymentRecord],
    manual_credit: Decimal,
) -> Vec<PaymentSummary> {
    let mut summaries: Vec<_> = employees
        .iter()
        .map(|e| payment_summary(e, salaries, credits, payments, manual_credit))
        .collect();
    summaries.sort_by(|a, b| {
        a.employee_name
            .to_lowercase()
            .cmp(&b.employee_name.to_lowercase())
            .then(a.employee_id.cmp(&b.employee_id))
    });
    summaries
}

pub fn dairy_report(
    employees: &[Employee],
    salaries: &[SalaryEntry],
    credits: &[CreditEntry],
    payments: &[PaymentRecord],
) -> DairyReport {
    DairyReport {
        employee_count: employees.len(),
        salary_entry_count: salaries.len(),
        total_salary: salaries.iter().map(|e| e.amount).sum(),
        total_liters: salaries.iter().map(|e| e.liters).sum(),
        total_available_credit: credits.iter().map(|c| c.amount).sum(),
        payment_count: payments.len(),
        total_net_paid: payments.iter().map(|p| p.net_paid).sum(),
        total_credit_deducted: payments.iter().map(|p| p.credit_deducted).sum(),
        by_animal: animal_breakdown(salaries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::test_support::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(total_salary(&[], 1), Decimal::ZERO);
        assert_eq!(total_available_credit(&[], 1), Decimal::ZERO);
        assert_eq!(total_paid(&[], 1), Decimal::ZERO);
        assert_eq!(last_payment_date(&[], 1), None);
        assert_eq!(average_per_entry(Decimal::ZERO, 0), Decimal::ZERO);
        assert_eq!(rate_per_liter(dec("100"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn totals_only_count_the_given_employee() {
        let salaries = vec![
            salary(1, 1, date(2026, 3, 1), "450", "9", AnimalType::Buffalo),
            salary(2, 1, date(2026, 3, 2), "300.50", "10", AnimalType::Cow),
            salary(3, 2, date(2026, 3, 2), "999", "20", AnimalType::Cow),
        ];
        assert_eq!(total_salary(&salaries, 1), dec("750.50"));
        assert_eq!(total_liters(&salaries, 1), dec("19"));
        assert_eq!(salary_entry_count(&salaries, 1), 2);
        assert_eq!(total_salary(&salaries, 3), Decimal::ZERO);
    }

    #[test]
    fn net_payable_is_not_clamped() {
        assert_eq!(net_payable(dec("100"), dec("30")), dec("70"));
        assert_eq!(net_payable(dec("100"), dec("130")), dec("-30"));
    }

    #[test]
    fn credit_since_uses_strictly_later_dates() {
        let credits = vec![
            credit(1, 1, date(2026, 1, 10), "50"),
            credit(2, 1, date(2026, 2, 1), "30"),
            credit(3, 1, date(2026, 2, 20), "20"),
        ];
        assert_eq!(credit_since(&credits, 1, None), dec("100"));
        assert_eq!(credit_since(&credits, 1, Some(date(2026, 2, 1))), dec("20"));
        assert_eq!(total_available_credit(&credits, 1), dec("100"));
    }

    #[test]
    fn summary_keeps_lifetime_credit_as_available() {
        let alice = employee(1, "Alice");
        let salaries = vec![
            salary(1, 1, date(2026, 3, 1), "400", "8", AnimalType::Cow),
            salary(2, 1, date(2026, 3, 2), "200", "4", AnimalType::Cow),
        ];
        let credits = vec![
            credit(1, 1, date(2026, 1, 5), "70"),
            credit(2, 1, date(2026, 3, 1), "30"),
        ];
        let payments = vec![payment(1, 1, "500", "0", date(2026, 2, 1))];

        let summary = payment_summary(&alice, &salaries, &credits, &payments, dec("40"));

        assert_eq!(summary.total_salary, dec("600"));
        assert_eq!(summary.total_available_credit, dec("100"));
        assert_eq!(summary.credit_since_last_payment, dec("30"));
        assert_eq!(summary.net_payable, dec("560"));
        assert_eq!(summary.salary_entry_count, 2);
        assert_eq!(summary.avg_salary_per_entry, dec("300"));
        assert_eq!(summary.rate_per_liter, dec("50"));
        assert_eq!(summary.last_payment_date, Some(date(2026, 2, 1)));
    }

    #[test]
    fn balance_is_outstanding_salary_minus_outstanding_credit() {
        let salaries = vec![salary(1, 1, date(2026, 4, 1), "300", "6", AnimalType::Cow)];
        let credits = vec![credit(1, 1, date(2026, 4, 2), "50")];
        let payments = vec![payment(1, 1, "1000", "200", date(2026, 3, 31))];

        let balance = ledger_balance(1, &salaries, &credits, &payments);

        assert_eq!(balance.total_earned, dec("1300"));
        assert_eq!(balance.total_credit, dec("250"));
        assert_eq!(balance.total_paid, dec("800"));
        assert_eq!(balance.balance, dec("250"));
        assert_eq!(balance.payment_count, 1);
    }

    #[test]
    fn breakdown_covers_every_animal() {
        let salaries = vec![
            salary(1, 1, date(2026, 3, 1), "450", "9", AnimalType::Buffalo),
            salary(2, 2, date(2026, 3, 1), "300", "10", AnimalType::Buffalo),
        ];
        let breakdown = animal_breakdown(&salaries);

        assert_eq!(breakdown.len(), 2);
        let cow = &breakdown[0];
        assert_eq!(cow.animal_type, AnimalType::Cow);
        assert_eq!(cow.entry_count, 0);
        assert_eq!(cow.rate_per_liter, Decimal::ZERO);
        let buffalo = &breakdown[1];
        assert_eq!(buffalo.liters, dec("19"));
        assert_eq!(buffalo.amount, dec("750"));
        assert_eq!(buffalo.rate_per_liter, dec("39.47"));
    }

    #[test]
    fn summaries_sort_by_name() {
        let employees = vec![employee(1, "zoya"), employee(2, "Arun"), employee(3, "meena")];
        let names: Vec<_> = payment_summaries(&employees, &[], &[], &[], Decimal::ZERO)
            .into_iter()
            .map(|s| s.employee_name)
            .collect();
        assert_eq!(names, ["Arun", "meena", "zoya"]);
    }

    #[test]
    fn report_totals_everything() {
        let employees = vec![employee(1, "A"), employee(2, "B")];
        let salaries = vec![
            salary(1, 1, date(2026, 3, 1), "100", "2", AnimalType::Cow),
            salary(2, 2, date(2026, 3, 1), "200", "4", AnimalType::Buffalo),
        ];
        let credits = vec![credit(1, 2, date(2026, 3, 1), "25")];
        let payments = vec![payment(1, 1, "500", "100", date(2026, 2, 28))];

        let report = dairy_report(&employees, &salaries, &credits, &payments);

        assert_eq!(report.employee_count, 2);
        assert_eq!(report.total_salary, dec("300"));
        assert_eq!(report.total_liters, dec("6"));
        assert_eq!(report.total_available_credit, dec("25"));
        assert_eq!(report.total_net_paid, dec("400"));
        assert_eq!(report.total_credit_deducted, dec("100"));
    }
}

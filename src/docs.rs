use crate::api::credit::{
    CreateCreditEntry, CreditEntryListResponse, CreditEntryRow, UpdateCreditEntry,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::payment::PaginatedPaymentResponse;
use crate::api::salary::{CreateSalaryEntry, SalaryEntryListResponse, UpdateSalaryEntry};
use crate::api::settlement::{SettleRequest, SettlementPreview};
use crate::ledger::settlement::CreditAdjustment;
use crate::model::summary::{AnimalTotals, DairyReport, LedgerBalance, PaymentSummary};
use crate::model::{AnimalType, CreditEntry, Employee, PaymentRecord, SalaryEntry};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dairy Ledger API",
        version = "1.0.0",
        description = r#"
## Dairy Ledger

Business records for a small dairy: the people who deliver milk, what they are owed, what they have taken on credit, and what has been paid out.

### Key Features
- **Employees**
  - Create, update, search, and delete employees
- **Salary entries**
  - Record each milk delivery with liters, amount, and animal type
- **Credit entries**
  - Record goods or advances given on credit
- **Settlement**
  - Pay out all pending salary, deduct credit oldest first, keep a payment record
- **Summaries and reports**
  - Per-employee payable amounts, lifetime balance, business-wide totals

### Settlement rules
- The deduction must be between 0 and the employee's total available credit
- Settling clears every salary entry of the employee
- Credit is reduced oldest entry first; fully consumed entries are removed

### Response Format
- JSON-based RESTful responses
- Errors are `{"message": "..."}` with status 400, 404, 409 or 500
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::salary::create_salary_entry,
        crate::api::salary::list_salary_entries,
        crate::api::salary::update_salary_entry,
        crate::api::salary::delete_salary_entry,
        crate::api::salary::delete_all_salary_entries,

        crate::api::credit::create_credit_entry,
        crate::api::credit::list_credit_entries,
        crate::api::credit::update_credit_entry,
        crate::api::credit::delete_credit_entry,
        crate::api::credit::replace_credit_entries,

        crate::api::payment::list_payments,

        crate::api::summary::list_summaries,
        crate::api::summary::employee_summary,
        crate::api::summary::employee_balance,
        crate::api::summary::report,

        crate::api::settlement::settle,
        crate::api::settlement::preview
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeListResponse,
            AnimalType,
            SalaryEntry,
            CreateSalaryEntry,
            UpdateSalaryEntry,
            SalaryEntryListResponse,
            CreditEntry,
            CreateCreditEntry,
            UpdateCreditEntry,
            CreditEntryRow,
            CreditEntryListResponse,
            PaymentRecord,
            PaginatedPaymentResponse,
            PaymentSummary,
            LedgerBalance,
            AnimalTotals,
            DairyReport,
            SettleRequest,
            SettlementPreview,
            CreditAdjustment
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Salary", description = "Milk delivery salary entries"),
        (name = "Credit", description = "Credit given to employees"),
        (name = "Payment", description = "Payment history"),
        (name = "Summary", description = "Payable summaries, balances and reports"),
        (name = "Settlement", description = "Pay out salary and deduct credit"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_settlement_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/employees/{employee_id}/settlement"));
        assert!(paths.contains_key("/api/v1/employees/{employee_id}/settlement/preview"));
        assert!(paths.contains_key("/api/v1/report"));
    }
}

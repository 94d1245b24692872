use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::ledger::aggregation::{dairy_report, ledger_balance, payment_summaries, payment_summary};
use crate::ledger::filter::search_employees;
use crate::model::summary::{DairyReport, LedgerBalance, PaymentSummary};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Credit the operator intends to deduct; defaults to 0
    #[param(value_type = Option<f64>, example = 100.0)]
    pub manual_credit: Option<Decimal>,
    /// Search by employee name or mobile
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/summaries",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Payment summary per employee, by name", body = Vec<PaymentSummary>)
    ),
    tag = "Summary"
)]
pub async fn list_summaries(
    store: web::Data<dyn RecordStore>,
    query: web::Query<SummaryQuery>,
) -> Result<impl Responder, ApiError> {
    let (employees, salaries, credits, payments) = futures::try_join!(
        store.list_employees(),
        store.list_salary_entries(),
        store.list_credit_entries(),
        store.list_payment_records(),
    )?;
    let employees = search_employees(employees, query.search.as_deref());

    let summaries = payment_summaries(
        &employees,
        &salaries,
        &credits,
        &payments,
        query.manual_credit.unwrap_or_default(),
    );

    Ok(HttpResponse::Ok().json(summaries))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/summary",
    params(
        ("employee_id", Path, description = "Employee ID"),
        SummaryQuery
    ),
    responses(
        (status = 200, body = PaymentSummary),
        (status = 404, description = "Employee not found")
    ),
    tag = "Summary"
)]
pub async fn employee_summary(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
    query: web::Query<SummaryQuery>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();
    let (employee, salaries, credits, payments) = futures::try_join!(
        store.get_employee(employee_id),
        store.list_salary_entries(),
        store.list_credit_entries(),
        store.list_payment_records(),
    )?;
    let employee = employee.ok_or_else(|| StoreError::not_found("employee", employee_id))?;

    let summary = payment_summary(
        &employee,
        &salaries,
        &credits,
        &payments,
        query.manual_credit.unwrap_or_default(),
    );

    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/balance",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, body = LedgerBalance),
        (status = 404, description = "Employee not found")
    ),
    tag = "Summary"
)]
pub async fn employee_balance(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();
    let (employee, salaries, credits, payments) = futures::try_join!(
        store.get_employee(employee_id),
        store.list_salary_entries(),
        store.list_credit_entries(),
        store.list_payment_records(),
    )?;
    if employee.is_none() {
        return Err(StoreError::not_found("employee", employee_id).into());
    }

    Ok(HttpResponse::Ok().json(ledger_balance(employee_id, &salaries, &credits, &payments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/report",
    responses(
        (status = 200, description = "Business-wide totals", body = DairyReport)
    ),
    tag = "Summary"
)]
pub async fn report(store: web::Data<dyn RecordStore>) -> Result<impl Responder, ApiError> {
    let (employees, salaries, credits, payments) = futures::try_join!(
        store.list_employees(),
        store.list_salary_entries(),
        store.list_credit_entries(),
        store.list_payment_records(),
    )?;

    Ok(HttpResponse::Ok().json(dairy_report(&employees, &salaries, &credits, &payments)))
}

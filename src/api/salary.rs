use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::ledger::filter::{EntryFilter, filter_salary_entries, paginate};
use crate::model::{AnimalType, NewSalaryEntry, SalaryEntry, SalaryEntryUpdate};
use crate::store::RecordStore;

#[derive(Deserialize, ToSchema)]
pub struct CreateSalaryEntry {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = 450.0, value_type = f64)]
    pub amount: Decimal,
    #[schema(example = 9.0, value_type = f64)]
    pub liters: Decimal,
    #[schema(example = "buffalo")]
    pub animal_type: AnimalType,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSalaryEntry {
    #[schema(format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub liters: Option<Decimal>,
    pub animal_type: Option<AnimalType>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SalaryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    /// Inclusive lower date bound
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
    pub animal_type: Option<AnimalType>,
}

#[derive(Serialize, ToSchema)]
pub struct SalaryEntryListResponse {
    pub data: Vec<SalaryEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/salary-entries",
    request_body = CreateSalaryEntry,
    responses(
        (status = 201, description = "Salary entry recorded", body = SalaryEntry),
        (status = 400, description = "Amount or liters not positive"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Salary"
)]
pub async fn create_salary_entry(
    store: web::Data<dyn RecordStore>,
    payload: web::Json<CreateSalaryEntry>,
) -> Result<impl Responder, ApiError> {
    let entry = NewSalaryEntry::new(
        payload.employee_id,
        payload.date,
        payload.amount,
        payload.liters,
        payload.animal_type,
    )?;
    let entry = store.insert_salary_entry(entry).await?;

    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/v1/salary-entries",
    params(SalaryQuery),
    responses(
        (status = 200, body = SalaryEntryListResponse)
    ),
    tag = "Salary"
)]
pub async fn list_salary_entries(
    store: web::Data<dyn RecordStore>,
    query: web::Query<SalaryQuery>,
) -> Result<impl Responder, ApiError> {
    let filter = EntryFilter {
        employee_id: query.employee_id,
        from: query.from,
        to: query.to,
    };
    let entries = filter_salary_entries(store.list_salary_entries().await?, &filter, query.animal_type);
    let page = paginate(entries, query.page, query.per_page);

    Ok(HttpResponse::Ok().json(SalaryEntryListResponse {
        data: page.data,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/salary-entries/{entry_id}",
    params(
        ("entry_id", Path, description = "Salary entry ID")
    ),
    request_body = UpdateSalaryEntry,
    responses(
        (status = 200, body = SalaryEntry),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "Salary entry not found")
    ),
    tag = "Salary"
)]
pub async fn update_salary_entry(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
    body: web::Json<UpdateSalaryEntry>,
) -> Result<impl Responder, ApiError> {
    let update = SalaryEntryUpdate::new(body.date, body.amount, body.liters, body.animal_type)?;
    let entry = store.update_salary_entry(path.into_inner(), update).await?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/v1/salary-entries/{entry_id}",
    params(
        ("entry_id", Path, description = "Salary entry ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Salary entry not found")
    ),
    tag = "Salary"
)]
pub async fn delete_salary_entry(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    store.delete_salary_entry(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/salary-entries",
    responses(
        (status = 200, description = "All salary entries deleted", body = Object, example = json!({
            "message": "All salary entries deleted",
            "deleted": 12
        }))
    ),
    tag = "Salary"
)]
pub async fn delete_all_salary_entries(
    store: web::Data<dyn RecordStore>,
) -> Result<impl Responder, ApiError> {
    let deleted = store.delete_all_salary_entries().await?;

    warn!(deleted, "All salary entries deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "All salary entries deleted",
        "deleted": deleted
    })))
}

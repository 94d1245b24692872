use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::ledger::filter::{EntryFilter, filter_credit_entries, paginate};
use crate::model::{CreditEntry, CreditEntryUpdate, NewCreditEntry};
use crate::store::RecordStore;

#[derive(Deserialize, ToSchema)]
pub struct CreateCreditEntry {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-02-14", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Cattle feed")]
    pub item_name: String,
    #[schema(example = 120.0, value_type = f64)]
    pub amount: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateCreditEntry {
    #[schema(format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    pub item_name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
}

/// Full row for bulk replacement; `created_at` defaults to now.
#[derive(Deserialize, ToSchema)]
pub struct CreditEntryRow {
    pub id: u64,
    pub employee_id: u64,
    #[schema(format = "date", value_type = String)]
    pub date: NaiveDate,
    pub item_name: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CreditEntryRow> for CreditEntry {
    fn from(row: CreditEntryRow) -> Self {
        CreditEntry {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            item_name: row.item_name,
            amount: row.amount,
            created_at: row.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CreditQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct CreditEntryListResponse {
    pub data: Vec<CreditEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/credit-entries",
    request_body = CreateCreditEntry,
    responses(
        (status = 201, description = "Credit recorded", body = CreditEntry),
        (status = 400, description = "Empty item name or non-positive amount"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Credit"
)]
pub async fn create_credit_entry(
    store: web::Data<dyn RecordStore>,
    payload: web::Json<CreateCreditEntry>,
) -> Result<impl Responder, ApiError> {
    let entry = NewCreditEntry::new(
        payload.employee_id,
        payload.date,
        &payload.item_name,
        payload.amount,
    )?;
    let entry = store.insert_credit_entry(entry).await?;

    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/v1/credit-entries",
    params(CreditQuery),
    responses(
        (status = 200, body = CreditEntryListResponse)
    ),
    tag = "Credit"
)]
pub async fn list_credit_entries(
    store: web::Data<dyn RecordStore>,
    query: web::Query<CreditQuery>,
) -> Result<impl Responder, ApiError> {
    let filter = EntryFilter {
        employee_id: query.employee_id,
        from: query.from,
        to: query.to,
    };
    let entries = filter_credit_entries(store.list_credit_entries().await?, &filter);
    let page = paginate(entries, query.page, query.per_page);

    Ok(HttpResponse::Ok().json(CreditEntryListResponse {
        data: page.data,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/credit-entries/{entry_id}",
    params(
        ("entry_id", Path, description = "Credit entry ID")
    ),
    request_body = UpdateCreditEntry,
    responses(
        (status = 200, body = CreditEntry),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "Credit entry not found")
    ),
    tag = "Credit"
)]
pub async fn update_credit_entry(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
    body: web::Json<UpdateCreditEntry>,
) -> Result<impl Responder, ApiError> {
    let update = CreditEntryUpdate::new(body.date, body.item_name.as_deref(), body.amount)?;
    let entry = store.update_credit_entry(path.into_inner(), update).await?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/v1/credit-entries/{entry_id}",
    params(
        ("entry_id", Path, description = "Credit entry ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Credit entry not found")
    ),
    tag = "Credit"
)]
pub async fn delete_credit_entry(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    store.delete_credit_entry(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Replace the whole credit collection
#[utoipa::path(
    put,
    path = "/api/v1/credit-entries",
    request_body = Vec<CreditEntryRow>,
    responses(
        (status = 200, description = "Credit entries replaced", body = Object, example = json!({
            "message": "Credit entries replaced",
            "count": 4
        })),
        (status = 400, description = "A row failed validation; nothing was replaced")
    ),
    tag = "Credit"
)]
pub async fn replace_credit_entries(
    store: web::Data<dyn RecordStore>,
    body: web::Json<Vec<CreditEntryRow>>,
) -> Result<impl Responder, ApiError> {
    let entries: Vec<CreditEntry> = body.into_inner().into_iter().map(Into::into).collect();
    let count = entries.len();

    store.replace_all_credit_entries(entries).await?;

    info!(count, "Credit entries replaced");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Credit entries replaced",
        "count": count
    })))
}

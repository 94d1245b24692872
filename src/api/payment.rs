use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::ledger::filter::{EntryFilter, filter_payments, paginate};
use crate::model::PaymentRecord;
use crate::store::RecordStore;

#[derive(Deserialize, IntoParams)]
pub struct PaymentQuery {
    #[param(example = 1)]
    pub page: Option<u32>,

    #[param(example = 10)]
    pub per_page: Option<u32>,

    #[param(example = 1)]
    pub employee_id: Option<u64>,

    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,

    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPaymentResponse {
    pub data: Vec<PaymentRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Payment history, newest first. Payments are only created by settlement.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PaymentQuery),
    responses(
        (status = 200, body = PaginatedPaymentResponse)
    ),
    tag = "Payment"
)]
pub async fn list_payments(
    store: web::Data<dyn RecordStore>,
    query: web::Query<PaymentQuery>,
) -> Result<impl Responder, ApiError> {
    let filter = EntryFilter {
        employee_id: query.employee_id,
        from: query.from,
        to: query.to,
    };
    let payments = filter_payments(store.list_payment_records().await?, &filter);
    let page = paginate(payments, query.page, query.per_page);

    Ok(HttpResponse::Ok().json(PaginatedPaymentResponse {
        data: page.data,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

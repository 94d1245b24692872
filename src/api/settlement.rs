use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::ledger::settlement::{self, CreditAdjustment, SettlementPlan};
use crate::model::PaymentRecord;
use crate::store::RecordStore;

#[derive(Deserialize, ToSchema)]
pub struct SettleRequest {
    /// Credit to deduct, between 0 and the employee's available credit
    #[schema(example = 200.0, value_type = f64)]
    pub credit_deduction: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct SettlementPreview {
    pub employee_id: u64,
    #[schema(value_type = f64)]
    pub salary_amount: Decimal,
    #[schema(value_type = f64)]
    pub available_credit: Decimal,
    #[schema(value_type = f64)]
    pub credit_deducted: Decimal,
    #[schema(value_type = f64)]
    pub net_paid: Decimal,
    #[schema(value_type = f64)]
    pub remaining_credit: Decimal,
    #[schema(value_type = String, format = "date")]
    pub payment_date: NaiveDate,
    pub cleared_salary_entry_ids: Vec<u64>,
    pub credit_adjustments: Vec<CreditAdjustment>,
}

impl From<SettlementPlan> for SettlementPreview {
    fn from(plan: SettlementPlan) -> Self {
        let remaining_credit = plan.remaining_credit();
        SettlementPreview {
            employee_id: plan.employee_id,
            salary_amount: plan.payment.salary_amount,
            available_credit: plan.available_credit,
            credit_deducted: plan.payment.credit_deducted,
            net_paid: plan.payment.net_paid,
            remaining_credit,
            payment_date: plan.payment.payment_date,
            cleared_salary_entry_ids: plan.cleared_salary_entry_ids,
            credit_adjustments: plan.credit.adjustments,
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Settle an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/settlement",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = SettleRequest,
    responses(
        (status = 201, description = "Payment recorded, salary cleared, credit reduced", body = PaymentRecord),
        (status = 400, description = "Deduction out of range or nothing to settle", body = Object, example = json!({
            "message": "no salary entries to settle"
        })),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee ledger changed while settling; retry")
    ),
    tag = "Settlement"
)]
pub async fn settle(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
    body: web::Json<SettleRequest>,
) -> Result<impl Responder, ApiError> {
    let payment =
        settlement::settle(store.get_ref(), path.into_inner(), body.credit_deduction, today())
            .await?;

    Ok(HttpResponse::Created().json(payment))
}

/// Show what a settlement would write, without writing it
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/settlement/preview",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = SettleRequest,
    responses(
        (status = 200, body = SettlementPreview),
        (status = 400, description = "Deduction out of range or nothing to settle"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Settlement"
)]
pub async fn preview(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
    body: web::Json<SettleRequest>,
) -> Result<impl Responder, ApiError> {
    let plan =
        settlement::preview(store.get_ref(), path.into_inner(), body.credit_deduction, today())
            .await?;

    Ok(HttpResponse::Ok().json(SettlementPreview::from(plan)))
}

/// Registers `""` and `/preview` under a `/employees/{id}/settlement` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(settle)))
        .service(web::resource("/preview").route(web::post().to(preview)));
}

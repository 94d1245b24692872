use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

use crate::ledger::settlement::SettlementError;
use crate::model::ValidationError;
use crate::store::StoreError;

/// Error returned by every handler; rendered as `{"message": ...}`.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(ValidationError),
    #[display(fmt = "{}", _0)]
    Store(StoreError),
    #[display(fmt = "{}", _0)]
    Settlement(SettlementError),
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<SettlementError> for ApiError {
    fn from(e: SettlementError) -> Self {
        ApiError::Settlement(e)
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Conflict { .. } => StatusCode::CONFLICT,
        StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => store_status(e),
            ApiError::Settlement(SettlementError::EmployeeNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Settlement(SettlementError::Store(e)) => store_status(e),
            ApiError::Settlement(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
            return HttpResponse::build(status).json(json!({
                "message": "Something went wrong, Contact with system admin"
            }));
        }
        HttpResponse::build(status).json(json!({ "message": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ValidationError::InvalidMobile.into(), StatusCode::BAD_REQUEST),
            (StoreError::not_found("employee", 1).into(), StatusCode::NOT_FOUND),
            (
                StoreError::Conflict {
                    employee_id: 1,
                    expected_version: 3,
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                SettlementError::ExceedsAvailableCredit {
                    requested: Decimal::ONE,
                    available: Decimal::ZERO,
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (SettlementError::EmployeeNotFound(9).into(), StatusCode::NOT_FOUND),
            (
                SettlementError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error}");
        }
    }
}

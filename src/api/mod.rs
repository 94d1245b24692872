pub mod credit;
pub mod employee;
pub mod payment;
pub mod salary;
pub mod settlement;
pub mod summary;

use actix_web::{HttpResponse, error::InternalError, web};
use serde_json::json;

/// Record and report routes. Settlement routes are mounted separately so they
/// can carry their own rate limit.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employees/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::put().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee)),
            )
            .service(web::resource("/{id}/summary").route(web::get().to(summary::employee_summary)))
            .service(web::resource("/{id}/balance").route(web::get().to(summary::employee_balance))),
    )
    .service(
        web::scope("/salary-entries")
            .service(
                web::resource("")
                    .route(web::post().to(salary::create_salary_entry))
                    .route(web::get().to(salary::list_salary_entries))
                    .route(web::delete().to(salary::delete_all_salary_entries)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::put().to(salary::update_salary_entry))
                    .route(web::delete().to(salary::delete_salary_entry)),
            ),
    )
    .service(
        web::scope("/credit-entries")
            .service(
                web::resource("")
                    .route(web::post().to(credit::create_credit_entry))
                    .route(web::get().to(credit::list_credit_entries))
                    .route(web::put().to(credit::replace_credit_entries)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::put().to(credit::update_credit_entry))
                    .route(web::delete().to(credit::delete_credit_entry)),
            ),
    )
    .service(web::resource("/payments").route(web::get().to(payment::list_payments)))
    .service(web::resource("/summaries").route(web::get().to(summary::list_summaries)))
    .service(web::resource("/report").route(web::get().to(summary::report)));
}

/// Malformed JSON bodies get the same `{"message": ...}` shape as other errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "message": message })),
        )
        .into()
    })
}

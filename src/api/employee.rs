use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::ledger::filter::{paginate, search_employees};
use crate::model::{Employee, EmployeeUpdate, NewEmployee};
use crate::store::{RecordStore, StoreError};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Ramesh Patel")]
    pub name: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Search by name or mobile
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    #[schema(example = "9876543210")]
    pub mobile: Option<String>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid name or mobile", body = Object, example = json!({
            "message": "mobile number must be exactly 10 digits"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    store: web::Data<dyn RecordStore>,
    payload: web::Json<CreateEmployee>,
) -> Result<impl Responder, ApiError> {
    let new_employee = NewEmployee::new(&payload.name, &payload.mobile)?;
    let employee = store.insert_employee(new_employee).await?;

    info!(employee_id = employee.id, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    store: web::Data<dyn RecordStore>,
    query: web::Query<EmployeeQuery>,
) -> Result<impl Responder, ApiError> {
    let employees = store.list_employees().await?;
    let page = paginate(
        search_employees(employees, query.search.as_deref()),
        query.page,
        query.per_page,
    );

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: page.data,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 7 not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    let employee = store
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| StoreError::not_found("employee", employee_id))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();
    let update = EmployeeUpdate::new(body.name.as_deref(), body.mobile.as_deref())?;

    let employee = store.update_employee(employee_id, update).await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee together with all of their entries and payments
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    store.delete_employee(employee_id).await?;

    info!(employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

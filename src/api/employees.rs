//! Employee route handlers

use axum::{
    extract::State,
    routing::get,
    Router,
};

use super::extract::{Json, Path, Query};
use super::server::{PageQuery, SharedState};
use crate::auth::{endpoint, Authorized};
use crate::error::{Error, Result};
use crate::models::{Employee, EmployeeChanges, EmployeeResponse, Message, NewEmployee, Validate};

pub fn router() -> Router<SharedState> {
    let collection = get(list_employees).post(create_employee);

    Router::new()
        .route("/employee", collection.clone())
        .route("/employee/", collection)
        .route(
            "/employee/{employee_id}",
            get(read_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
}

/// Attach the employee's tickets
async fn with_tickets(state: &SharedState, employee: Employee) -> Result<EmployeeResponse> {
    let tickets = state.store.list_tickets_by_employee(employee.id).await?;
    Ok(EmployeeResponse { employee, tickets })
}

pub async fn create_employee(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::CreateEmployee>,
    Json(payload): Json<NewEmployee>,
) -> Result<Json<EmployeeResponse>> {
    payload.validate()?;
    let employee = state.store.create_employee(&payload).await?;
    tracing::info!(
        "Employee {} created by '{}'",
        employee.id,
        auth.user().username
    );
    Ok(Json(EmployeeResponse {
        employee,
        tickets: Vec::new(),
    }))
}

pub async fn list_employees(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ListEmployees>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<EmployeeResponse>>> {
    let employees = state.store.list_employees(state.page(&query)).await?;

    let mut response = Vec::with_capacity(employees.len());
    for employee in employees {
        response.push(with_tickets(&state, employee).await?);
    }
    Ok(Json(response))
}

pub async fn read_employee(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadEmployee>,
    Path(employee_id): Path<i64>,
) -> Result<Json<EmployeeResponse>> {
    let employee = state
        .store
        .get_employee(employee_id)
        .await?
        .ok_or(Error::EmployeeNotFound)?;
    Ok(Json(with_tickets(&state, employee).await?))
}

pub async fn update_employee(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReplaceEmployee>,
    Path(employee_id): Path<i64>,
    Json(changes): Json<EmployeeChanges>,
) -> Result<Json<EmployeeResponse>> {
    changes.validate()?;
    let employee = state.store.update_employee(employee_id, changes).await?;
    tracing::info!("Updated employee {}", employee.id);
    Ok(Json(with_tickets(&state, employee).await?))
}

pub async fn delete_employee(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::DeleteEmployee>,
    Path(employee_id): Path<i64>,
) -> Result<Json<Message>> {
    state.store.delete_employee(employee_id).await?;
    tracing::info!(
        "Employee {} deleted by '{}'",
        employee_id,
        auth.user().username
    );
    Ok(Json(Message::new("Employee deleted successfully")))
}

//! Ticket route handlers

use axum::{
    extract::State,
    routing::get,
    Router,
};

use super::extract::{Json, Path, Query};
use super::server::{PageQuery, SharedState};
use crate::auth::{endpoint, Authorized};
use crate::error::{Error, Result};
use crate::models::{Message, NewTicket, Ticket, TicketChanges, Validate};

pub fn router() -> Router<SharedState> {
    let collection = get(list_tickets);
    let mine = get(list_my_tickets);

    Router::new()
        .route("/ticket", collection.clone())
        .route("/ticket/", collection)
        .route("/ticket/my", mine.clone())
        .route("/ticket/my/", mine)
        // POST takes the employee id, the other verbs a ticket id
        .route(
            "/ticket/{id}",
            get(read_ticket)
                .post(create_ticket)
                .put(update_ticket)
                .delete(delete_ticket),
        )
}

/// File a ticket against an employee; the caller becomes its owner
pub async fn create_ticket(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::CreateTicket>,
    Path(employee_id): Path<i64>,
    Json(payload): Json<NewTicket>,
) -> Result<Json<Ticket>> {
    payload.validate()?;
    if state.store.get_employee(employee_id).await?.is_none() {
        return Err(Error::EmployeeNotFound);
    }

    let ticket = state
        .store
        .create_ticket(&payload, employee_id, Some(auth.user().id))
        .await?;
    tracing::info!(
        "Ticket {} filed for employee {} by '{}'",
        ticket.id,
        employee_id,
        auth.user().username
    );
    Ok(Json(ticket))
}

pub async fn list_tickets(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadTickets>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Ticket>>> {
    Ok(Json(state.store.list_tickets(state.page(&query)).await?))
}

/// Tickets filed by the caller
pub async fn list_my_tickets(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::ReadTickets>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Ticket>>> {
    let tickets = state
        .store
        .list_tickets_by_owner(auth.user().id, state.page(&query))
        .await?;
    Ok(Json(tickets))
}

pub async fn read_ticket(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadTickets>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<Ticket>> {
    state
        .store
        .get_ticket(ticket_id)
        .await?
        .map(Json)
        .ok_or(Error::TicketNotFound)
}

pub async fn update_ticket(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReplaceTicket>,
    Path(ticket_id): Path<i64>,
    Json(changes): Json<TicketChanges>,
) -> Result<Json<Ticket>> {
    changes.validate()?;
    let ticket = state.store.update_ticket(ticket_id, changes).await?;
    tracing::info!("Updated ticket {}", ticket.id);
    Ok(Json(ticket))
}

pub async fn delete_ticket(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::DeleteTicket>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<Message>> {
    state.store.delete_ticket(ticket_id).await?;
    tracing::info!("Ticket {} deleted by '{}'", ticket_id, auth.user().username);
    Ok(Json(Message::new("Ticket deleted successfully")))
}

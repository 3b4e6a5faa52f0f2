//! Tickets filed against employees

use serde::{Deserialize, Serialize};

use super::{check_len, check_opt_len, Validate};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub employee_id: i64,
    /// User that filed the ticket; cleared when that user is deleted
    pub owner_id: Option<i64>,
    pub created: String,
    pub updated: Option<String>,
}

/// Body of `POST /ticket/{employee_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Validate for NewTicket {
    fn validate(&self) -> Result<()> {
        check_len("title", &self.title, 32)?;
        check_len("description", &self.description, 64)?;
        check_len("status", &self.status, 16)
    }
}

/// Body of `PUT /ticket/{ticket_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Validate for TicketChanges {
    fn validate(&self) -> Result<()> {
        check_opt_len("title", self.title.as_ref(), 32)?;
        check_opt_len("description", self.description.as_ref(), 64)?;
        check_opt_len("status", self.status.as_ref(), 16)
    }
}

impl TicketChanges {
    pub fn apply(self, ticket: &mut Ticket) {
        if let Some(title) = self.title {
            ticket.title = title;
        }
        if let Some(description) = self.description {
            ticket.description = description;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
    }
}

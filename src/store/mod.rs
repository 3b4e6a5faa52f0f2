//! Persistence for users, employees and tickets

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{
    Employee, EmployeeChanges, NewEmployee, NewTicket, NewUser, Ticket, TicketChanges, User,
    UserChanges,
};

/// Offset/limit window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }
}

/// Storage backend.
///
/// Lookups return `Ok(None)` for missing rows; updates and deletes of a
/// missing row fail with the matching not-found error. Username, phone and
/// email are unique among users, phone and email among employees.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: &NewUser, hashed_password: &str) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self, page: Page) -> Result<Vec<User>>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User>;
    /// Tickets the user filed keep existing with no owner
    async fn delete_user(&self, id: i64) -> Result<()>;

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee>;
    async fn get_employee(&self, id: i64) -> Result<Option<Employee>>;
    async fn list_employees(&self, page: Page) -> Result<Vec<Employee>>;
    async fn update_employee(&self, id: i64, changes: EmployeeChanges) -> Result<Employee>;
    /// Also removes the employee's tickets
    async fn delete_employee(&self, id: i64) -> Result<()>;

    async fn create_ticket(
        &self,
        ticket: &NewTicket,
        employee_id: i64,
        owner_id: Option<i64>,
    ) -> Result<Ticket>;
    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>>;
    async fn list_tickets(&self, page: Page) -> Result<Vec<Ticket>>;
    async fn list_tickets_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Ticket>>;
    async fn list_tickets_by_employee(&self, employee_id: i64) -> Result<Vec<Ticket>>;
    async fn update_ticket(&self, id: i64, changes: TicketChanges) -> Result<Ticket>;
    async fn delete_ticket(&self, id: i64) -> Result<()>;
}

pub type SharedStore = Arc<dyn Store>;

/// Open the configured backend; no database url means in-memory storage
pub async fn connect(config: &DatabaseConfig) -> Result<SharedStore> {
    match config.connection_url() {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database configured, data is kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

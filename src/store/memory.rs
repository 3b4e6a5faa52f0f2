//! In-memory storage

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Page, Store};
use crate::error::{Error, Result};
use crate::models::{
    timestamp_now, Employee, EmployeeChanges, NewEmployee, NewTicket, NewUser, Ticket,
    TicketChanges, User, UserChanges,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    employees: BTreeMap<i64, Employee>,
    tickets: BTreeMap<i64, Ticket>,
    last_user_id: i64,
    last_employee_id: i64,
    last_ticket_id: i64,
}

impl Tables {
    /// Enforce the unique user columns, ignoring the row being updated
    fn check_user_unique(&self, candidate: &User) -> Result<()> {
        for other in self.users.values().filter(|u| u.id != candidate.id) {
            if other.username == candidate.username {
                return Err(Error::AlreadyRegistered("Username"));
            }
            if other.phone == candidate.phone {
                return Err(Error::AlreadyRegistered("Phone"));
            }
            if other.email == candidate.email {
                return Err(Error::AlreadyRegistered("Email"));
            }
        }
        Ok(())
    }

    fn check_employee_unique(&self, candidate: &Employee) -> Result<()> {
        for other in self.employees.values().filter(|e| e.id != candidate.id) {
            if other.phone == candidate.phone {
                return Err(Error::AlreadyRegistered("Phone"));
            }
            if other.email == candidate.email {
                return Err(Error::AlreadyRegistered("Email"));
            }
        }
        Ok(())
    }
}

fn paginate<'a, T: Clone + 'a>(rows: impl Iterator<Item = &'a T>, page: Page) -> Vec<T> {
    rows.skip(page.skip as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

/// Store backed by ordered maps behind a lock
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: &NewUser, hashed_password: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        let record = User {
            id: tables.last_user_id + 1,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            disabled: user.disabled,
            login_denied: user.login_denied,
            hashed_password: hashed_password.to_string(),
            created: timestamp_now(),
            updated: None,
        };
        tables.check_user_unique(&record)?;

        tables.last_user_id = record.id;
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.phone == phone).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>> {
        Ok(paginate(self.tables.read().await.users.values(), page))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User> {
        let mut tables = self.tables.write().await;
        let mut updated = tables.users.get(&id).cloned().ok_or(Error::UserNotFound)?;

        changes.apply(&mut updated);
        updated.updated = Some(timestamp_now());
        tables.check_user_unique(&updated)?;

        tables.users.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(Error::UserNotFound)?;

        for ticket in tables.tickets.values_mut() {
            if ticket.owner_id == Some(id) {
                ticket.owner_id = None;
            }
        }
        Ok(())
    }

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let mut tables = self.tables.write().await;
        let record = Employee {
            id: tables.last_employee_id + 1,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            nick_name: employee.nick_name.clone(),
            phone: employee.phone.clone(),
            email: employee.email.clone(),
            birthday: employee.birthday.clone(),
            country: employee.country.clone(),
            city: employee.city.clone(),
            address: employee.address.clone(),
            created: timestamp_now(),
            updated: None,
        };
        tables.check_employee_unique(&record)?;

        tables.last_employee_id = record.id;
        tables.employees.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_employee(&self, id: i64) -> Result<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn list_employees(&self, page: Page) -> Result<Vec<Employee>> {
        Ok(paginate(self.tables.read().await.employees.values(), page))
    }

    async fn update_employee(&self, id: i64, changes: EmployeeChanges) -> Result<Employee> {
        let mut tables = self.tables.write().await;
        let mut updated = tables
            .employees
            .get(&id)
            .cloned()
            .ok_or(Error::EmployeeNotFound)?;

        changes.apply(&mut updated);
        updated.updated = Some(timestamp_now());
        tables.check_employee_unique(&updated)?;

        tables.employees.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_employee(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .employees
            .remove(&id)
            .ok_or(Error::EmployeeNotFound)?;
        tables.tickets.retain(|_, ticket| ticket.employee_id != id);
        Ok(())
    }

    async fn create_ticket(
        &self,
        ticket: &NewTicket,
        employee_id: i64,
        owner_id: Option<i64>,
    ) -> Result<Ticket> {
        let mut tables = self.tables.write().await;
        if !tables.employees.contains_key(&employee_id) {
            return Err(Error::EmployeeNotFound);
        }
        if let Some(owner_id) = owner_id {
            if !tables.users.contains_key(&owner_id) {
                return Err(Error::UserNotFound);
            }
        }

        let record = Ticket {
            id: tables.last_ticket_id + 1,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            status: ticket.status.clone(),
            employee_id,
            owner_id,
            created: timestamp_now(),
            updated: None,
        };
        tables.last_ticket_id = record.id;
        tables.tickets.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        Ok(self.tables.read().await.tickets.get(&id).cloned())
    }

    async fn list_tickets(&self, page: Page) -> Result<Vec<Ticket>> {
        Ok(paginate(self.tables.read().await.tickets.values(), page))
    }

    async fn list_tickets_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Ticket>> {
        let tables = self.tables.read().await;
        let owned = tables
            .tickets
            .values()
            .filter(|t| t.owner_id == Some(owner_id));
        Ok(paginate(owned, page))
    }

    async fn list_tickets_by_employee(&self, employee_id: i64) -> Result<Vec<Ticket>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .values()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn update_ticket(&self, id: i64, changes: TicketChanges) -> Result<Ticket> {
        let mut tables = self.tables.write().await;
        let ticket = tables.tickets.get_mut(&id).ok_or(Error::TicketNotFound)?;

        changes.apply(ticket);
        ticket.updated = Some(timestamp_now());
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.tickets.remove(&id).ok_or(Error::TicketNotFound)?;
        Ok(())
    }
}

//! PostgreSQL storage

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{error::SqlState, Client, NoTls, Row};

use super::{Page, Store};
use crate::error::{Error, Result};
use crate::models::{
    timestamp_now, Employee, EmployeeChanges, NewEmployee, NewTicket, NewUser, Ticket,
    TicketChanges, User, UserChanges,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(16) NOT NULL UNIQUE,
    first_name VARCHAR(64) NOT NULL,
    last_name VARCHAR(64) NOT NULL,
    phone VARCHAR(20) NOT NULL UNIQUE,
    email VARCHAR(64) NOT NULL UNIQUE,
    role TEXT[] NOT NULL DEFAULT '{}',
    disabled BOOLEAN NOT NULL DEFAULT FALSE,
    login_denied BOOLEAN NOT NULL DEFAULT FALSE,
    hashed_password VARCHAR(64) NOT NULL,
    created VARCHAR(19) NOT NULL,
    updated VARCHAR(19)
);

CREATE TABLE IF NOT EXISTS employees (
    id BIGSERIAL PRIMARY KEY,
    first_name VARCHAR(64) NOT NULL,
    last_name VARCHAR(64) NOT NULL,
    nick_name VARCHAR(20) NOT NULL,
    phone VARCHAR(20) NOT NULL UNIQUE,
    email VARCHAR(64) NOT NULL UNIQUE,
    birthday VARCHAR(10) NOT NULL,
    country VARCHAR(64) NOT NULL,
    city VARCHAR(64) NOT NULL,
    address VARCHAR(254) NOT NULL,
    created VARCHAR(19) NOT NULL,
    updated VARCHAR(19)
);

CREATE TABLE IF NOT EXISTS tickets (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(32) NOT NULL,
    description VARCHAR(64) NOT NULL,
    status VARCHAR(16) NOT NULL,
    employee_id BIGINT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    owner_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
    created VARCHAR(19) NOT NULL,
    updated VARCHAR(19)
);

CREATE INDEX IF NOT EXISTS tickets_employee_id_idx ON tickets (employee_id);
CREATE INDEX IF NOT EXISTS tickets_owner_id_idx ON tickets (owner_id);
"#;

const USER_COLUMNS: &str = "id, username, first_name, last_name, phone, email, role, \
     disabled, login_denied, hashed_password, created, updated";

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, nick_name, phone, email, \
     birthday, country, city, address, created, updated";

const TICKET_COLUMNS: &str =
    "id, title, description, status, employee_id, owner_id, created, updated";

/// Translate constraint violations into client-facing errors
fn map_db_error(err: tokio_postgres::Error) -> Error {
    let Some(db_error) = err.as_db_error() else {
        return Error::Database(err);
    };

    let code = db_error.code();
    let mapped = match db_error.constraint() {
        Some("users_username_key") if code == &SqlState::UNIQUE_VIOLATION => {
            Some(Error::AlreadyRegistered("Username"))
        }
        Some("users_phone_key" | "employees_phone_key") if code == &SqlState::UNIQUE_VIOLATION => {
            Some(Error::AlreadyRegistered("Phone"))
        }
        Some("users_email_key" | "employees_email_key") if code == &SqlState::UNIQUE_VIOLATION => {
            Some(Error::AlreadyRegistered("Email"))
        }
        Some("tickets_employee_id_fkey") if code == &SqlState::FOREIGN_KEY_VIOLATION => {
            Some(Error::EmployeeNotFound)
        }
        Some("tickets_owner_id_fkey") if code == &SqlState::FOREIGN_KEY_VIOLATION => {
            Some(Error::UserNotFound)
        }
        _ => None,
    };

    mapped.unwrap_or(Error::Database(err))
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        email: row.get("email"),
        role: row.get("role"),
        disabled: row.get("disabled"),
        login_denied: row.get("login_denied"),
        hashed_password: row.get("hashed_password"),
        created: row.get("created"),
        updated: row.get("updated"),
    }
}

fn employee_from_row(row: &Row) -> Employee {
    Employee {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        nick_name: row.get("nick_name"),
        phone: row.get("phone"),
        email: row.get("email"),
        birthday: row.get("birthday"),
        country: row.get("country"),
        city: row.get("city"),
        address: row.get("address"),
        created: row.get("created"),
        updated: row.get("updated"),
    }
}

fn ticket_from_row(row: &Row) -> Ticket {
    Ticket {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: row.get("status"),
        employee_id: row.get("employee_id"),
        owner_id: row.get("owner_id"),
        created: row.get("created"),
        updated: row.get("updated"),
    }
}

/// Store backed by a single PostgreSQL connection, reopened when it drops
pub struct PgStore {
    url: String,
    client: RwLock<Arc<Client>>,
}

/// Open a connection and drive it on a background task
async fn open_connection(url: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(url, NoTls)
        .await
        .map_err(Error::Database)?;

    // Spawn the connection handler
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

impl PgStore {
    /// Connect and create the tables if they do not exist yet
    pub async fn connect(url: &str) -> Result<Self> {
        let client = open_connection(url).await?;
        client.batch_execute(SCHEMA).await?;
        tracing::info!("Connected to PostgreSQL, schema ready");

        Ok(Self {
            url: url.to_string(),
            client: RwLock::new(Arc::new(client)),
        })
    }

    /// Live client, reconnecting first if the server closed the last one
    async fn client(&self) -> Result<Arc<Client>> {
        {
            let client = self.client.read().await;
            if !client.is_closed() {
                return Ok(Arc::clone(&*client));
            }
        }

        let mut client = self.client.write().await;
        // Another task may have reconnected while we waited
        if client.is_closed() {
            tracing::warn!("PostgreSQL connection closed, reconnecting");
            *client = Arc::new(open_connection(&self.url).await?);
        }
        Ok(Arc::clone(&*client))
    }

    async fn query_user(&self, column: &str, value: &str) -> Result<Option<User>> {
        // column names come from this module only
        let query = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = self.client().await?.query_opt(&query, &[&value]).await?;
        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: &NewUser, hashed_password: &str) -> Result<User> {
        let query = format!(
            "INSERT INTO users (username, first_name, last_name, phone, email, role, \
             disabled, login_denied, hashed_password, created) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            USER_COLUMNS
        );
        let row = self
            .client()
            .await?
            .query_one(
                &query,
                &[
                    &user.username,
                    &user.first_name,
                    &user.last_name,
                    &user.phone,
                    &user.email,
                    &user.role,
                    &user.disabled,
                    &user.login_denied,
                    &hashed_password,
                    &timestamp_now(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        Ok(user_from_row(&row))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = self.client().await?.query_opt(&query, &[&id]).await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.query_user("username", username).await
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.query_user("phone", phone).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user("email", email).await
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>> {
        let query = format!(
            "SELECT {} FROM users ORDER BY id OFFSET $1 LIMIT $2",
            USER_COLUMNS
        );
        let rows = self
            .client()
            .await?
            .query(&query, &[&i64::from(page.skip), &i64::from(page.limit)])
            .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User> {
        let query = format!(
            "UPDATE users SET \
             username = COALESCE($2, username), \
             first_name = COALESCE($3, first_name), \
             last_name = COALESCE($4, last_name), \
             phone = COALESCE($5, phone), \
             email = COALESCE($6, email), \
             role = COALESCE($7, role), \
             disabled = COALESCE($8, disabled), \
             login_denied = COALESCE($9, login_denied), \
             hashed_password = COALESCE($10, hashed_password), \
             updated = $11 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = self
            .client()
            .await?
            .query_opt(
                &query,
                &[
                    &id,
                    &changes.username,
                    &changes.first_name,
                    &changes.last_name,
                    &changes.phone,
                    &changes.email,
                    &changes.role,
                    &changes.disabled,
                    &changes.login_denied,
                    &changes.hashed_password,
                    &timestamp_now(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        row.as_ref().map(user_from_row).ok_or(Error::UserNotFound)
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        let deleted = self
            .client()
            .await?
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(Error::UserNotFound);
        }
        Ok(())
    }

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let query = format!(
            "INSERT INTO employees (first_name, last_name, nick_name, phone, email, \
             birthday, country, city, address, created) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let row = self
            .client()
            .await?
            .query_one(
                &query,
                &[
                    &employee.first_name,
                    &employee.last_name,
                    &employee.nick_name,
                    &employee.phone,
                    &employee.email,
                    &employee.birthday,
                    &employee.country,
                    &employee.city,
                    &employee.address,
                    &timestamp_now(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        Ok(employee_from_row(&row))
    }

    async fn get_employee(&self, id: i64) -> Result<Option<Employee>> {
        let query = format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS);
        let row = self.client().await?.query_opt(&query, &[&id]).await?;
        Ok(row.as_ref().map(employee_from_row))
    }

    async fn list_employees(&self, page: Page) -> Result<Vec<Employee>> {
        let query = format!(
            "SELECT {} FROM employees ORDER BY id OFFSET $1 LIMIT $2",
            EMPLOYEE_COLUMNS
        );
        let rows = self
            .client()
            .await?
            .query(&query, &[&i64::from(page.skip), &i64::from(page.limit)])
            .await?;
        Ok(rows.iter().map(employee_from_row).collect())
    }

    async fn update_employee(&self, id: i64, changes: EmployeeChanges) -> Result<Employee> {
        let query = format!(
            "UPDATE employees SET \
             first_name = COALESCE($2, first_name), \
             last_name = COALESCE($3, last_name), \
             nick_name = COALESCE($4, nick_name), \
             phone = COALESCE($5, phone), \
             email = COALESCE($6, email), \
             birthday = COALESCE($7, birthday), \
             country = COALESCE($8, country), \
             city = COALESCE($9, city), \
             address = COALESCE($10, address), \
             updated = $11 \
             WHERE id = $1 RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let row = self
            .client()
            .await?
            .query_opt(
                &query,
                &[
                    &id,
                    &changes.first_name,
                    &changes.last_name,
                    &changes.nick_name,
                    &changes.phone,
                    &changes.email,
                    &changes.birthday,
                    &changes.country,
                    &changes.city,
                    &changes.address,
                    &timestamp_now(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        row.as_ref()
            .map(employee_from_row)
            .ok_or(Error::EmployeeNotFound)
    }

    async fn delete_employee(&self, id: i64) -> Result<()> {
        let deleted = self
            .client()
            .await?
            .execute("DELETE FROM employees WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(Error::EmployeeNotFound);
        }
        Ok(())
    }

    async fn create_ticket(
        &self,
        ticket: &NewTicket,
        employee_id: i64,
        owner_id: Option<i64>,
    ) -> Result<Ticket> {
        let query = format!(
            "INSERT INTO tickets (title, description, status, employee_id, owner_id, created) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TICKET_COLUMNS
        );
        let row = self
            .client()
            .await?
            .query_one(
                &query,
                &[
                    &ticket.title,
                    &ticket.description,
                    &ticket.status,
                    &employee_id,
                    &owner_id,
                    &timestamp_now(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        Ok(ticket_from_row(&row))
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let query = format!("SELECT {} FROM tickets WHERE id = $1", TICKET_COLUMNS);
        let row = self.client().await?.query_opt(&query, &[&id]).await?;
        Ok(row.as_ref().map(ticket_from_row))
    }

    async fn list_tickets(&self, page: Page) -> Result<Vec<Ticket>> {
        let query = format!(
            "SELECT {} FROM tickets ORDER BY id OFFSET $1 LIMIT $2",
            TICKET_COLUMNS
        );
        let rows = self
            .client()
            .await?
            .query(&query, &[&i64::from(page.skip), &i64::from(page.limit)])
            .await?;
        Ok(rows.iter().map(ticket_from_row).collect())
    }

    async fn list_tickets_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Ticket>> {
        let query = format!(
            "SELECT {} FROM tickets WHERE owner_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
            TICKET_COLUMNS
        );
        let rows = self
            .client()
            .await?
            .query(
                &query,
                &[&owner_id, &i64::from(page.skip), &i64::from(page.limit)],
            )
            .await?;
        Ok(rows.iter().map(ticket_from_row).collect())
    }

    async fn list_tickets_by_employee(&self, employee_id: i64) -> Result<Vec<Ticket>> {
        let query = format!(
            "SELECT {} FROM tickets WHERE employee_id = $1 ORDER BY id",
            TICKET_COLUMNS
        );
        let rows = self.client().await?.query(&query, &[&employee_id]).await?;
        Ok(rows.iter().map(ticket_from_row).collect())
    }

    async fn update_ticket(&self, id: i64, changes: TicketChanges) -> Result<Ticket> {
        let query = format!(
            "UPDATE tickets SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             status = COALESCE($4, status), \
             updated = $5 \
             WHERE id = $1 RETURNING {}",
            TICKET_COLUMNS
        );
        let row = self
            .client()
            .await?
            .query_opt(
                &query,
                &[
                    &id,
                    &changes.title,
                    &changes.description,
                    &changes.status,
                    &timestamp_now(),
                ],
            )
            .await?;
        row.as_ref().map(ticket_from_row).ok_or(Error::TicketNotFound)
    }

    async fn delete_ticket(&self, id: i64) -> Result<()> {
        let deleted = self
            .client()
            .await?
            .execute("DELETE FROM tickets WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(Error::TicketNotFound);
        }
        Ok(())
    }
}

//! Employees

use serde::{Deserialize, Serialize};

use super::{check_len, check_opt_len, Ticket, Validate};
use crate::error::Result;

/// Stored employee record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub phone: String,
    pub email: String,
    pub birthday: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub created: String,
    pub updated: Option<String>,
}

/// Employee together with the tickets filed against them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeResponse {
    #[serde(flatten)]
    pub employee: Employee,
    pub tickets: Vec<Ticket>,
}

/// Body of `POST /employee/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub phone: String,
    pub email: String,
    pub birthday: String,
    pub country: String,
    pub city: String,
    pub address: String,
}

impl Validate for NewEmployee {
    fn validate(&self) -> Result<()> {
        check_len("first_name", &self.first_name, 64)?;
        check_len("last_name", &self.last_name, 64)?;
        check_len("nick_name", &self.nick_name, 20)?;
        check_len("phone", &self.phone, 20)?;
        check_len("email", &self.email, 64)?;
        check_len("birthday", &self.birthday, 10)?;
        check_len("country", &self.country, 64)?;
        check_len("city", &self.city, 64)?;
        check_len("address", &self.address, 254)
    }
}

/// Body of `PUT /employee/{employee_id}`; absent fields are kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeChanges {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Validate for EmployeeChanges {
    fn validate(&self) -> Result<()> {
        check_opt_len("first_name", self.first_name.as_ref(), 64)?;
        check_opt_len("last_name", self.last_name.as_ref(), 64)?;
        check_opt_len("nick_name", self.nick_name.as_ref(), 20)?;
        check_opt_len("phone", self.phone.as_ref(), 20)?;
        check_opt_len("email", self.email.as_ref(), 64)?;
        check_opt_len("birthday", self.birthday.as_ref(), 10)?;
        check_opt_len("country", self.country.as_ref(), 64)?;
        check_opt_len("city", self.city.as_ref(), 64)?;
        check_opt_len("address", self.address.as_ref(), 254)
    }
}

impl EmployeeChanges {
    pub fn apply(self, employee: &mut Employee) {
        let fields = [
            (self.first_name, &mut employee.first_name),
            (self.last_name, &mut employee.last_name),
            (self.nick_name, &mut employee.nick_name),
            (self.phone, &mut employee.phone),
            (self.email, &mut employee.email),
            (self.birthday, &mut employee.birthday),
            (self.country, &mut employee.country),
            (self.city, &mut employee.city),
            (self.address, &mut employee.address),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_flattens_employee() {
        let response = EmployeeResponse {
            employee: Employee {
                id: 7,
                first_name: "Ivan".to_string(),
                last_name: "Petrenko".to_string(),
                nick_name: "ivan".to_string(),
                phone: "+380".to_string(),
                email: "ivan@example.com".to_string(),
                birthday: "1990-01-01".to_string(),
                country: "UA".to_string(),
                city: "Kyiv".to_string(),
                address: "Main st. 1".to_string(),
                created: "2024-01-01 00:00:00".to_string(),
                updated: None,
            },
            tickets: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["city"], "Kyiv");
        assert_eq!(json["tickets"], serde_json::json!([]));
    }

    #[test]
    fn test_birthday_limit() {
        let changes = EmployeeChanges {
            birthday: Some("1990-01-01T00".to_string()),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }
}

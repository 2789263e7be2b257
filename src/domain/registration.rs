use crate::domain::phone::PhoneNumber;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Cleaner,
}

/// Payload of the account-registration call.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: PhoneNumber,
    pub password: String,
    pub role: Role,
}

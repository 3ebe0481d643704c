use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Reader,
    Writer,
    Admin,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            UserRole::Reader => "READER",
            UserRole::Writer => "WRITER",
            UserRole::Admin => "ADMIN",
        };
        write!(f, "{}", role)
    }
}

impl UserRole {
    /// Unknown roles fall back to the least privileged one.
    pub fn from_str(value: &str) -> Self {
        match value {
            "WRITER" => UserRole::Writer,
            "ADMIN" => UserRole::Admin,
            _ => UserRole::Reader,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Role carried by an access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Access key model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub key: String,
    pub role: Role,
    /// Contestant this key belongs to, if any
    pub stage_name: Option<String>,
}

impl AccessKey {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

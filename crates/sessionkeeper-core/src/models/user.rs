use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role attached to a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RoleInfo {
    pub name: String,
    #[serde(default)]
    pub precedence: Option<i32>,
}

/// The current user's profile. Everything except `role` is opaque to the
/// session layer; the record is replaced wholesale on every successful check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    pub organization_id: Option<i64>,
    pub role_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub role: Option<RoleInfo>,
}

impl UserIdentity {
    pub fn new(id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: None,
            last_name: None,
            email_verified: false,
            email_verified_at: None,
            is_active: false,
            organization_id: None,
            role_id: None,
            created_at: None,
            updated_at: None,
            role: None,
        }
    }

    pub fn with_role(mut self, name: impl Into<String>) -> Self {
        self.role = Some(RoleInfo {
            name: name.into(),
            precedence: None,
        });
        self
    }

    /// Role name, treating an empty name as no role
    pub fn role_name(&self) -> Option<&str> {
        self.role
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

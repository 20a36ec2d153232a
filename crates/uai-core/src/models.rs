//! Records persisted by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Created through onboarding, waiting for activation.
    Unverified,
    /// Activated or bootstrapped.
    Active,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Unverified => "unverified",
            UserStatus::Active => "active",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for UserStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(UserStatus::Unverified),
            "active" => Ok(UserStatus::Active),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    /// Starts at 1 and is bumped on every status change.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

/// A stored password credential. At most one per user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("hashed_password", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for creating a credential.
#[derive(Clone)]
pub struct NewCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

impl fmt::Debug for NewCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredentials")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A row of the roles catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub code: String,
    pub name: String,
}

/// An association between a user and a role, recording who granted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub user_id: Uuid,
    pub role_id: i32,
    pub grantor: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a role grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoleGrant {
    pub user_id: Uuid,
    pub role_id: i32,
    pub grantor: Uuid,
}

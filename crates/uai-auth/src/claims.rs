//! Token scopes and the payload carried inside a token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The single purpose a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Activation,
    Authentication,
    PasswordReset,
}

impl Scope {
    /// Lifetime of a token issued for this scope.
    pub fn ttl(&self) -> Duration {
        match self {
            Scope::Activation => Duration::hours(72),
            Scope::PasswordReset => Duration::minutes(15),
            Scope::Authentication => Duration::hours(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Activation => "activation",
            Scope::Authentication => "authentication",
            Scope::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// The user the token was issued for.
    #[serde(rename = "sub")]
    pub subject: Uuid,

    pub scope: Scope,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    pub fn new(subject: Uuid, scope: Scope, issued_at: DateTime<Utc>) -> Self {
        Self {
            subject,
            scope,
            issued_at,
            expires_at: issued_at + scope.ttl(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

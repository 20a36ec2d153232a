//! Error taxonomy for store operations.

use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) and [`Queries`](crate::Queries).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lookup matched nothing.
    #[error("no rows in result set")]
    NoRows,

    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// The unit of work failed and so did the rollback that followed.
    #[error("tx error: {source}, rollback error: {rollback}")]
    Rollback {
        source: Box<StoreError>,
        rollback: Box<StoreError>,
    },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be mapped onto a domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_no_rows(&self) -> bool {
        matches!(self, StoreError::NoRows)
    }

    /// True when a unique constraint was violated, optionally a specific one.
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            StoreError::UniqueViolation { constraint: c } => constraint.is_none_or(|want| c == want),
            _ => false,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, StoreError::ForeignKeyViolation { .. })
    }

    /// The error that aborted the unit of work, looking through rollback failures.
    pub fn root(&self) -> &StoreError {
        match self {
            StoreError::Rollback { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NoRows,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::UniqueViolation {
                    constraint: db.constraint().unwrap_or_default().to_string(),
                }
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::ForeignKeyViolation {
                    constraint: db.constraint().unwrap_or_default().to_string(),
                }
            }
            other => StoreError::Database(other),
        }
    }
}

/// Constraint names shared by both backends.
pub mod constraints {
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const CREDENTIALS_PKEY: &str = "credentials_pkey";
    pub const CREDENTIALS_USER: &str = "credentials_user_id_fkey";
    pub const ROLE_GRANTS_USER: &str = "role_grants_user_id_fkey";
    pub const ROLE_GRANTS_ROLE: &str = "role_grants_role_id_fkey";
    pub const ROLE_GRANTS_GRANTOR: &str = "role_grants_grantor_fkey";
}

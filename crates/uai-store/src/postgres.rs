//! Postgres backend.

use crate::error::StoreError;
use crate::queries::{Queries, Store, TxFuture};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use uai_core::DatabaseConfig;
use uai_core::models::{
    Credential, NewCredentials, NewRoleGrant, NewUser, Role, User, UserStatus,
};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, status, version, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.connect_timeout())
            .connect(&cfg.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn exec_tx<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn Queries) -> TxFuture<'c, T> + Send + 'static,
    {
        let mut tx = self.pool.begin().await?;

        let result = {
            let queries: &mut dyn Queries = &mut PgQueries { conn: &mut *tx };
            work(queries).await
        };

        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => Err(err),
                Err(rb) => {
                    tracing::error!(error = %err, rollback_error = %rb, "transaction rollback failed");
                    Err(StoreError::Rollback {
                        source: Box::new(err),
                        rollback: Box::new(rb.into()),
                    })
                }
            },
        }
    }

    async fn exec<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn Queries) -> TxFuture<'c, T> + Send + 'static,
    {
        let mut conn = self.pool.acquire().await?;
        let queries: &mut dyn Queries = &mut PgQueries { conn: &mut *conn };
        work(queries).await
    }
}

/// Query handle bound to one connection, usually an open transaction.
pub struct PgQueries<'t> {
    conn: &'t mut PgConnection,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    status: String,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let status: UserStatus = row
            .status
            .parse()
            .map_err(|e: uai_core::UnknownStatus| StoreError::Corrupt(e.to_string()))?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            status,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    user_id: Uuid,
    email: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            user_id: row.user_id,
            email: row.email,
            hashed_password: row.hashed_password,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl Queries for PgQueries<'_> {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, status) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .fetch_one(&mut *self.conn)
            .await?;
        row.try_into()
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<User, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: UserRow = sqlx::query_as(&sql)
            .bind(email)
            .fetch_one(&mut *self.conn)
            .await?;
        row.try_into()
    }

    async fn get_user_by_id(&mut self, id: Uuid) -> Result<User, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: UserRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        row.try_into()
    }

    async fn activate_user(&mut self, id: Uuid) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET status = 'active', version = version + 1, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        row.try_into()
    }

    async fn create_credentials(&mut self, credentials: &NewCredentials) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO credentials (user_id, email, hashed_password) VALUES ($1, $2, $3)")
            .bind(credentials.user_id)
            .bind(&credentials.email)
            .bind(&credentials.hashed_password)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn get_credentials_by_email(&mut self, email: &str) -> Result<Credential, StoreError> {
        let row: CredentialRow = sqlx::query_as(
            "SELECT user_id, email, hashed_password, created_at FROM credentials WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(row.into())
    }

    async fn get_roles_by_codes(&mut self, codes: &[String]) -> Result<Vec<Role>, StoreError> {
        let rows: Vec<(i32, String, String)> =
            sqlx::query_as("SELECT id, code, name FROM roles WHERE code = ANY($1) ORDER BY id")
                .bind(codes)
                .fetch_all(&mut *self.conn)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, code, name)| Role { id, code, name })
            .collect())
    }

    async fn add_role_grants(&mut self, grants: &[NewRoleGrant]) -> Result<u64, StoreError> {
        if grants.is_empty() {
            return Ok(0);
        }

        let user_ids: Vec<Uuid> = grants.iter().map(|g| g.user_id).collect();
        let role_ids: Vec<i32> = grants.iter().map(|g| g.role_id).collect();
        let grantors: Vec<Uuid> = grants.iter().map(|g| g.grantor).collect();

        let result = sqlx::query(
            "INSERT INTO role_grants (user_id, role_id, grantor) \
             SELECT * FROM UNNEST($1::uuid[], $2::int4[], $3::uuid[])",
        )
        .bind(&user_ids)
        .bind(&role_ids)
        .bind(&grantors)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }
}

//! In-process backend.
//!
//! Transactions run against a private copy of the state and replace it on
//! commit. The state lock is held for the whole unit of work, so transactions
//! are serialized and never observe each other's uncommitted writes.

use crate::error::{StoreError, constraints};
use crate::queries::{Queries, Store, TxFuture};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uai_core::RoleCode;
use uai_core::models::{
    Credential, NewCredentials, NewRoleGrant, NewUser, Role, RoleGrant, User, UserStatus,
};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    credentials: HashMap<Uuid, Credential>,
    roles: Vec<Role>,
    grants: Vec<RoleGrant>,
}

impl MemoryState {
    fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn has_user(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    operations: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// A store seeded with the standard roles.
    pub fn new() -> Self {
        let roles = RoleCode::ALL
            .iter()
            .zip(1..)
            .map(|(code, id)| Role {
                id,
                code: code.as_str().to_string(),
                name: code.as_str().to_string(),
            })
            .collect();
        Self::with_roles(roles)
    }

    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                roles,
                ..MemoryState::default()
            })),
            operations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Units of work started plus queries executed since creation.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.lock().await.users.clone()
    }

    pub async fn credentials(&self) -> Vec<Credential> {
        self.state.lock().await.credentials.values().cloned().collect()
    }

    pub async fn role_grants(&self) -> Vec<RoleGrant> {
        self.state.lock().await.grants.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exec_tx<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn Queries) -> TxFuture<'c, T> + Send + 'static,
    {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let mut committed = self.state.lock().await;
        let mut working = committed.clone();

        let result = {
            let queries: &mut dyn Queries = &mut MemoryQueries {
                state: &mut working,
                operations: &self.operations,
            };
            work(queries).await
        };

        if result.is_ok() {
            *committed = working;
        }
        result
    }

    async fn exec<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn Queries) -> TxFuture<'c, T> + Send + 'static,
    {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        let queries: &mut dyn Queries = &mut MemoryQueries {
            state: &mut *state,
            operations: &self.operations,
        };
        work(queries).await
    }
}

struct MemoryQueries<'s> {
    state: &'s mut MemoryState,
    operations: &'s AtomicUsize,
}

impl MemoryQueries<'_> {
    fn count(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Queries for MemoryQueries<'_> {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, StoreError> {
        self.count();
        if self.state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::USERS_EMAIL.to_string(),
            });
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            status: user.status,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.state.users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<User, StoreError> {
        self.count();
        self.state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NoRows)
    }

    async fn get_user_by_id(&mut self, id: Uuid) -> Result<User, StoreError> {
        self.count();
        self.state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NoRows)
    }

    async fn activate_user(&mut self, id: Uuid) -> Result<User, StoreError> {
        self.count();
        let user = self.state.user_mut(id).ok_or(StoreError::NoRows)?;
        user.status = UserStatus::Active;
        user.version += 1;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_credentials(&mut self, credentials: &NewCredentials) -> Result<(), StoreError> {
        self.count();
        if !self.state.has_user(credentials.user_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: constraints::CREDENTIALS_USER.to_string(),
            });
        }
        if self.state.credentials.contains_key(&credentials.user_id) {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::CREDENTIALS_PKEY.to_string(),
            });
        }
        self.state.credentials.insert(
            credentials.user_id,
            Credential {
                user_id: credentials.user_id,
                email: credentials.email.clone(),
                hashed_password: credentials.hashed_password.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_credentials_by_email(&mut self, email: &str) -> Result<Credential, StoreError> {
        self.count();
        self.state
            .credentials
            .values()
            .find(|c| c.email == email)
            .cloned()
            .ok_or(StoreError::NoRows)
    }

    async fn get_roles_by_codes(&mut self, codes: &[String]) -> Result<Vec<Role>, StoreError> {
        self.count();
        Ok(self
            .state
            .roles
            .iter()
            .filter(|r| codes.contains(&r.code))
            .cloned()
            .collect())
    }

    async fn add_role_grants(&mut self, grants: &[NewRoleGrant]) -> Result<u64, StoreError> {
        self.count();
        for grant in grants {
            if !self.state.has_user(grant.user_id) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: constraints::ROLE_GRANTS_USER.to_string(),
                });
            }
            if !self.state.roles.iter().any(|r| r.id == grant.role_id) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: constraints::ROLE_GRANTS_ROLE.to_string(),
                });
            }
            if !self.state.has_user(grant.grantor) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: constraints::ROLE_GRANTS_GRANTOR.to_string(),
                });
            }
        }

        let now = Utc::now();
        self.state
            .grants
            .extend(grants.iter().map(|g| RoleGrant {
                user_id: g.user_id,
                role_id: g.role_id,
                grantor: g.grantor,
                created_at: now,
            }));
        Ok(grants.len() as u64)
    }
}

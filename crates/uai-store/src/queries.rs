//! Capability traits shared by every backend.

use crate::error::StoreError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use uai_core::models::{Credential, NewCredentials, NewRoleGrant, NewUser, Role, User};
use uuid::Uuid;

/// Future returned by a unit of work.
pub type TxFuture<'c, T> = BoxFuture<'c, Result<T, StoreError>>;

/// Query operations available to a unit of work.
///
/// Lookups that match nothing return [`StoreError::NoRows`].
#[async_trait]
pub trait Queries: Send {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, StoreError>;

    async fn get_user_by_email(&mut self, email: &str) -> Result<User, StoreError>;

    async fn get_user_by_id(&mut self, id: Uuid) -> Result<User, StoreError>;

    /// Mark the user active and bump its version.
    async fn activate_user(&mut self, id: Uuid) -> Result<User, StoreError>;

    async fn create_credentials(&mut self, credentials: &NewCredentials) -> Result<(), StoreError>;

    async fn get_credentials_by_email(&mut self, email: &str) -> Result<Credential, StoreError>;

    /// Roles whose code is in `codes`. Unknown codes are skipped.
    async fn get_roles_by_codes(&mut self, codes: &[String]) -> Result<Vec<Role>, StoreError>;

    /// Insert grants, returning how many rows were written.
    async fn add_role_grants(&mut self, grants: &[NewRoleGrant]) -> Result<u64, StoreError>;
}

/// Runs units of work against a backend.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run `work` in a transaction.
    ///
    /// Commits when `work` returns `Ok`. On `Err` the transaction is rolled
    /// back; a failed rollback is reported as [`StoreError::Rollback`] carrying
    /// both errors. Dropping the returned future before it completes also
    /// rolls back.
    async fn exec_tx<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn Queries) -> TxFuture<'c, T> + Send + 'static;

    /// Run `work` outside a transaction, each query committing on its own.
    async fn exec<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn Queries) -> TxFuture<'c, T> + Send + 'static;
}

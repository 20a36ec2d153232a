//! User workflows: onboarding, activation, login and token authentication.

mod activation;
mod login;
mod onboarding;

pub use activation::Activation;
pub use onboarding::{NewAccount, Onboarded};

use crate::background::BackgroundTasks;
use crate::error::ServiceError;
use crate::notifier::Notifier;
use std::sync::Arc;
use uai_auth::{CredentialHasher, TokenMaker};
use uai_core::RoleCatalog;
use uai_store::Store;

/// Entry point for every user-facing workflow.
///
/// Holds no per-request state; clones share the same collaborators.
pub struct UserService<S> {
    store: S,
    tokens: Arc<dyn TokenMaker>,
    hasher: Arc<dyn CredentialHasher>,
    notifier: Arc<dyn Notifier>,
    roles: Arc<RoleCatalog>,
    background: BackgroundTasks,
}

impl<S: Clone> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tokens: self.tokens.clone(),
            hasher: self.hasher.clone(),
            notifier: self.notifier.clone(),
            roles: self.roles.clone(),
            background: self.background.clone(),
        }
    }
}

impl<S: Store> UserService<S> {
    pub fn new(
        store: S,
        tokens: Arc<dyn TokenMaker>,
        hasher: Arc<dyn CredentialHasher>,
        notifier: Arc<dyn Notifier>,
        roles: Arc<RoleCatalog>,
        background: BackgroundTasks,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            notifier,
            roles,
            background,
        }
    }

    /// Hash on the blocking pool; digests are deliberately slow.
    async fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(ServiceError::internal)?
            .map_err(ServiceError::internal)
    }

    async fn password_matches(&self, password: &str, digest: &str) -> Result<bool, ServiceError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || hasher.matches(&password, &digest))
            .await
            .map_err(ServiceError::internal)?
            .map_err(ServiceError::internal)
    }
}

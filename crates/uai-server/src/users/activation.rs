//! Account activation with a one-time activation token.
//!
//! The token is checked before any store access. The status change and the
//! credential insert commit together, so a second activation of the same
//! user fails on the credential key.

use super::UserService;
use crate::error::{AuthFailure, ServiceError};
use uai_auth::{IssuedToken, Scope};
use uai_core::models::{NewCredentials, User};
use uai_store::error::constraints;
use uai_store::{Store, StoreError};

/// Result of a successful activation.
#[derive(Debug, Clone)]
pub struct Activation {
    pub user: User,
    pub token: IssuedToken,
}

impl<S: Store> UserService<S> {
    /// Redeem an activation token: set the password, mark the user active and
    /// issue an authentication token.
    ///
    /// A rejected token is reported before any store access. A second
    /// activation of the same user fails with a conflict.
    pub async fn activate_user(
        &self,
        token: &str,
        password: &str,
    ) -> Result<Activation, ServiceError> {
        let payload = self.tokens.verify_token(token, Scope::Activation)?;
        let user_id = payload.subject;

        let user = self
            .store
            .exec(move |q| Box::pin(async move { q.get_user_by_id(user_id).await }))
            .await
            .map_err(|err| {
                if err.is_no_rows() {
                    ServiceError::Unauthenticated(AuthFailure::InvalidToken)
                } else {
                    ServiceError::internal(err)
                }
            })?;

        let hashed_password = self.hash_password(password).await?;
        let credentials = NewCredentials {
            user_id: user.id,
            email: user.email.clone(),
            hashed_password,
        };

        let user = self
            .store
            .exec_tx(move |q| {
                Box::pin(async move {
                    let user = q.activate_user(credentials.user_id).await?;
                    q.create_credentials(&credentials).await?;
                    Ok::<_, StoreError>(user)
                })
            })
            .await
            .map_err(|err| {
                let root = err.root();
                if root.is_unique_violation(Some(constraints::CREDENTIALS_PKEY)) {
                    ServiceError::Conflict("user has already been activated".into())
                } else if root.is_no_rows() {
                    ServiceError::Unauthenticated(AuthFailure::InvalidToken)
                } else {
                    ServiceError::internal(err)
                }
            })?;

        tracing::info!(user_id = %user.id, version = user.version, "user activated");

        let token = self.tokens.issue(user.id, Scope::Authentication)?;
        Ok(Activation { user, token })
    }
}

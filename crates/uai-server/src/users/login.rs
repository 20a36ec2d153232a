//! Password login and bearer token resolution.

use super::UserService;
use crate::error::{AuthFailure, ServiceError};
use uai_auth::{IssuedToken, Scope};
use uai_core::models::User;
use uai_store::Store;

impl<S: Store> UserService<S> {
    /// Exchange an email and password for an authentication token.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, ServiceError> {
        let email = email.to_owned();
        let credential = self
            .store
            .exec(move |q| Box::pin(async move { q.get_credentials_by_email(&email).await }))
            .await
            .map_err(|err| {
                if err.is_no_rows() {
                    ServiceError::Unauthenticated(AuthFailure::InvalidCredentials)
                } else {
                    ServiceError::internal(err)
                }
            })?;

        if !self
            .password_matches(password, &credential.hashed_password)
            .await?
        {
            tracing::debug!(user_id = %credential.user_id, "password mismatch");
            return Err(ServiceError::Unauthenticated(AuthFailure::InvalidCredentials));
        }

        Ok(self.tokens.issue(credential.user_id, Scope::Authentication)?)
    }

    /// Resolve an authentication token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let payload = self.tokens.verify_token(token, Scope::Authentication)?;
        let user_id = payload.subject;

        self.store
            .exec(move |q| Box::pin(async move { q.get_user_by_id(user_id).await }))
            .await
            .map_err(|err| {
                if err.is_no_rows() {
                    ServiceError::Unauthenticated(AuthFailure::InvalidToken)
                } else {
                    ServiceError::internal(err)
                }
            })
    }
}

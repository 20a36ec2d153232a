//! Bearer token extractor for authenticated routes.

use crate::error::{AuthFailure, ServiceError};
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uai_core::models::User;
use uai_store::Store;

/// The user behind the request's `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<AppState<S>> for AuthenticatedUser
where
    S: Store + Clone + 'static,
{
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or(ServiceError::Unauthenticated(AuthFailure::InvalidToken))?;
        let user = state.within(state.users.authenticate(token)).await?;
        Ok(AuthenticatedUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

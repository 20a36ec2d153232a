//! Request handlers and their wire types.

use super::validation;
use crate::auth::AuthenticatedUser;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::users::NewAccount;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uai_auth::IssuedToken;
use uai_core::RoleCode;
use uai_core::models::{User, UserStatus};
use uai_store::Store;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleCode>,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenView {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl From<IssuedToken> for TokenView {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expiry: issued.expires_at,
        }
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServiceError::invalid("body", rejection.body_text()))
}

pub(super) async fn healthcheck<S>(State(state): State<AppState<S>>) -> Json<Value>
where
    S: Store + Clone + 'static,
{
    Json(json!({
        "status": "available",
        "environment": state.environment.as_str(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(super) async fn create_user<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ServiceError>
where
    S: Store + Clone + 'static,
{
    let request = body(payload)?;
    validation::new_user(&request)?;

    let account = NewAccount {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        roles: request.roles,
    };
    let onboarded = state.within(state.users.add_user(account)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": UserView::from(onboarded.user) })),
    ))
}

pub(super) async fn activate_user<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> Result<Json<Value>, ServiceError>
where
    S: Store + Clone + 'static,
{
    let request = body(payload)?;
    validation::activation(&request)?;

    let activation = state
        .within(state.users.activate_user(&request.token, &request.password))
        .await?;

    Ok(Json(json!({
        "user": UserView::from(activation.user),
        "authentication_token": TokenView::from(activation.token),
    })))
}

pub(super) async fn create_authentication_token<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ServiceError>
where
    S: Store + Clone + 'static,
{
    let request = body(payload)?;
    validation::login(&request)?;

    let issued = state
        .within(state.users.login(&request.email, &request.password))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "authentication_token": TokenView::from(issued) })),
    ))
}

pub(super) async fn current_user(AuthenticatedUser(user): AuthenticatedUser) -> Json<Value> {
    Json(json!({ "user": UserView::from(user) }))
}

//! HTTP transport.

mod handlers;
pub mod validation;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use uai_store::Store;

pub use handlers::{
    ActivateRequest, CreateUserRequest, LoginRequest, TokenView, UserView,
};

/// Build the service router.
pub fn router<S>(state: AppState<S>) -> Router
where
    S: Store + Clone + 'static,
{
    Router::new()
        .route("/v1/healthcheck", get(handlers::healthcheck::<S>))
        .route("/v1/users", post(handlers::create_user::<S>))
        .route("/v1/users/activate", post(handlers::activate_user::<S>))
        .route("/v1/users/me", get(handlers::current_user))
        .route(
            "/v1/tokens/authentication",
            post(handlers::create_authentication_token::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

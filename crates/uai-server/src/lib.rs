//! # uai-server
//!
//! User onboarding, activation and password login over HTTP.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/v1/healthcheck` | liveness and build info |
//! | `POST` | `/v1/users` | register a user and email an activation token |
//! | `POST` | `/v1/users/activate` | redeem an activation token and set a password |
//! | `POST` | `/v1/tokens/authentication` | exchange email and password for a token |
//! | `GET` | `/v1/users/me` | the user behind a bearer token |

pub mod auth;
pub mod background;
pub mod error;
pub mod http;
pub mod notifier;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod users;

pub use background::BackgroundTasks;
pub use error::{AuthFailure, ServiceError};
pub use notifier::{LogNotifier, Notifier, WELCOME_TEMPLATE};
pub use state::AppState;
pub use users::UserService;

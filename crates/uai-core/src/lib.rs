//! # uai-core
//!
//! Shared building blocks for the Uai user service.
//!
//! - [`models`]: users, credentials, roles and role grants
//! - [`roles`]: the closed set of role codes and the constructed [`RoleCatalog`]
//! - [`clock`]: a time source that tests can pin
//! - [`config`]: the TOML application configuration
//!
//! ## User lifecycle
//!
//! | Status | Reached by | Can log in |
//! |--------|------------|------------|
//! | `unverified` | onboarding | no |
//! | `active` | activation or bootstrap | yes, once a credential exists |

pub mod clock;
pub mod config;
pub mod models;
pub mod roles;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use config::{
    AppConfig, BootstrapConfig, ConfigError, DatabaseConfig, Environment, LogFormat,
    LoggingConfig, PasswordConfig, ServerConfig, TokenConfig, load_config,
};
pub use models::{
    Credential, NewCredentials, NewRoleGrant, NewUser, Role, RoleGrant, UnknownStatus, User,
    UserStatus,
};
pub use roles::{RoleCatalog, RoleCode, RoleError};

//! Startup seeding of the first administrator.

use std::fmt;
use uai_core::RoleCode;
use uai_core::models::{NewCredentials, NewRoleGrant, NewUser, UserStatus};
use uai_store::error::constraints;
use uai_store::{Store, StoreError};
use uuid::Uuid;

/// The privileged account ensured at startup.
#[derive(Clone)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    /// PHC digest of the admin password.
    pub password_hash: String,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(Uuid),
    /// A user with the configured email already exists. Nothing was written.
    AlreadyPresent,
}

/// On startup, make sure the administrator account exists.
///
/// Safe to run on every start: when a user with the configured email exists
/// only reads are performed. Otherwise the user, its `admin` grant and its
/// credential are written in one transaction.
pub async fn bootstrap_admin<S: Store>(
    store: &S,
    account: AdminAccount,
) -> anyhow::Result<BootstrapOutcome> {
    let email = account.email.clone();
    let existing = store
        .exec(move |q| Box::pin(async move { q.get_user_by_email(&email).await }))
        .await;
    match existing {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "admin account already present");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }
        Err(StoreError::NoRows) => {}
        Err(err) => return Err(err.into()),
    }

    let admin_code = vec![RoleCode::Admin.as_str().to_string()];
    let roles = store
        .exec(move |q| Box::pin(async move { q.get_roles_by_codes(&admin_code).await }))
        .await?;
    let Some(admin_role) = roles.into_iter().next() else {
        anyhow::bail!("roles table has no 'admin' row; have migrations been applied?");
    };

    let result = store
        .exec_tx(move |q| {
            Box::pin(async move {
                let user = q
                    .create_user(&NewUser {
                        name: account.name,
                        email: account.email,
                        status: UserStatus::Active,
                    })
                    .await?;
                q.add_role_grants(&[NewRoleGrant {
                    user_id: user.id,
                    role_id: admin_role.id,
                    grantor: user.id,
                }])
                .await?;
                q.create_credentials(&NewCredentials {
                    user_id: user.id,
                    email: user.email.clone(),
                    hashed_password: account.password_hash,
                })
                .await?;
                Ok::<_, StoreError>(user)
            })
        })
        .await;

    match result {
        Ok(user) => {
            tracing::warn!(user_id = %user.id, email = %user.email, "bootstrapped admin account");
            Ok(BootstrapOutcome::Created(user.id))
        }
        // Another instance won the race.
        Err(err) if err.root().is_unique_violation(Some(constraints::USERS_EMAIL)) => {
            Ok(BootstrapOutcome::AlreadyPresent)
        }
        Err(err) => Err(err.into()),
    }
}

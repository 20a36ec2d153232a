//! Self-registration: user, role grants and the welcome email.

use super::UserService;
use crate::error::ServiceError;
use crate::notifier::WELCOME_TEMPLATE;
use serde_json::json;
use uai_auth::Scope;
use uai_core::models::{NewRoleGrant, NewUser, User, UserStatus};
use uai_core::{RoleCode, RoleError};
use uai_store::error::constraints;
use uai_store::{Store, StoreError};

/// A self-registration request.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleCode>,
}

#[derive(Debug, Clone)]
pub struct Onboarded {
    pub user: User,
    /// Role grants written. Lower than the requested count when a code has
    /// no row in the roles table.
    pub granted_roles: u64,
}

impl<S: Store> UserService<S> {
    /// Create an unverified user with its roles in one transaction, then
    /// send the activation email in the background.
    pub async fn add_user(&self, account: NewAccount) -> Result<Onboarded, ServiceError> {
        if account.roles.is_empty() {
            return Err(ServiceError::invalid("roles", "must contain at least one role"));
        }
        let codes = self.roles.resolve(&account.roles).map_err(|err| match err {
            RoleError::NotSelfAssignable(code) => {
                ServiceError::invalid("roles", format!("role '{code}' cannot be requested"))
            }
            RoleError::Unknown(code) => {
                ServiceError::invalid("roles", format!("unknown role '{code}'"))
            }
        })?;
        let requested = codes.len();

        let new_user = NewUser {
            name: account.name,
            email: account.email,
            status: UserStatus::Unverified,
        };

        let (user, granted_roles) = self
            .store
            .exec_tx(move |q| {
                Box::pin(async move {
                    let user = q.create_user(&new_user).await?;
                    let roles = q.get_roles_by_codes(&codes).await?;
                    let grants: Vec<NewRoleGrant> = roles
                        .iter()
                        .map(|role| NewRoleGrant {
                            user_id: user.id,
                            role_id: role.id,
                            grantor: user.id,
                        })
                        .collect();
                    let granted = q.add_role_grants(&grants).await?;
                    Ok::<_, StoreError>((user, granted))
                })
            })
            .await
            .map_err(|err| {
                let root = err.root();
                if root.is_unique_violation(Some(constraints::USERS_EMAIL)) {
                    ServiceError::Conflict("email already in use".into())
                } else if root.is_foreign_key_violation() {
                    tracing::error!(error = %root, "role grant referenced a missing row");
                    ServiceError::ReferentialViolation("referenced record does not exist".into())
                } else {
                    ServiceError::internal(err)
                }
            })?;

        if (granted_roles as usize) < requested {
            tracing::warn!(
                user_id = %user.id,
                requested,
                granted = granted_roles,
                "requested roles missing from roles table were skipped"
            );
        }
        tracing::info!(user_id = %user.id, roles = granted_roles, "user onboarded");

        self.send_welcome(&user);
        Ok(Onboarded {
            user,
            granted_roles,
        })
    }

    fn send_welcome(&self, user: &User) {
        let tokens = self.tokens.clone();
        let notifier = self.notifier.clone();
        let user_id = user.id;
        let recipient = user.email.clone();

        self.background.spawn("welcome_email", async move {
            let issued = match tokens.issue(user_id, Scope::Activation) {
                Ok(issued) => issued,
                Err(err) => {
                    tracing::error!(%user_id, error = %err, "failed to issue activation token");
                    return;
                }
            };

            let data = json!({
                "activation_token": issued.token,
                "expires_at": issued.expires_at,
                "user_id": user_id,
            });
            if let Err(err) = notifier.send(&recipient, WELCOME_TEMPLATE, data).await {
                tracing::error!(%user_id, error = ?err, "failed to send welcome email");
            }
        });
    }
}

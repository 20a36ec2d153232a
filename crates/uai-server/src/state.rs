//! Shared application state.

use crate::error::ServiceError;
use crate::users::UserService;
use std::future::Future;
use std::time::Duration;
use uai_core::Environment;

#[derive(Clone)]
pub struct AppState<S> {
    pub users: UserService<S>,
    pub environment: Environment,
    /// Deadline applied to every workflow invocation.
    pub request_timeout: Duration,
}

impl<S> AppState<S> {
    pub fn new(users: UserService<S>, environment: Environment, request_timeout: Duration) -> Self {
        Self {
            users,
            environment,
            request_timeout,
        }
    }

    /// Run a workflow under the request deadline.
    ///
    /// On expiry the workflow future is dropped, which rolls back any open
    /// transaction.
    pub async fn within<T, F>(&self, workflow: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        match tokio::time::timeout(self.request_timeout, workflow).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "workflow deadline exceeded"
                );
                Err(ServiceError::Timeout)
            }
        }
    }
}

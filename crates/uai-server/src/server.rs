//! Process wiring: store selection, bootstrap, HTTP serving and shutdown.

use crate::auth::{AdminAccount, BootstrapOutcome, bootstrap_admin};
use crate::background::BackgroundTasks;
use crate::http;
use crate::notifier::LogNotifier;
use crate::state::AppState;
use crate::users::UserService;
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use uai_auth::{Argon2Hasher, CredentialHasher, KeyError, ScopedTokenMaker, SymmetricKey, TokenMaker};
use uai_core::{AppConfig, BootstrapConfig, RoleCatalog};
use uai_store::{MemoryStore, PgStore, Store};

/// Run the service until a shutdown signal arrives.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let key_hex = cfg.token.key.as_deref().ok_or(KeyError::Missing)?;
    let key = SymmetricKey::from_hex(key_hex).context("invalid token.key")?;
    let tokens: Arc<dyn TokenMaker> = Arc::new(ScopedTokenMaker::new(&key));
    let hasher: Arc<dyn CredentialHasher> =
        Arc::new(Argon2Hasher::new(&cfg.password).context("invalid password settings")?);

    if cfg.database.is_memory() {
        tracing::warn!("using in-memory store; data is lost on exit");
        serve(cfg, MemoryStore::new(), tokens, hasher).await
    } else {
        let store = PgStore::connect(&cfg.database)
            .await
            .context("failed to connect to database")?;
        if cfg.database.run_migrations {
            store.migrate().await?;
            tracing::info!("migrations applied");
        }
        serve(cfg, store, tokens, hasher).await
    }
}

async fn serve<S>(
    cfg: AppConfig,
    store: S,
    tokens: Arc<dyn TokenMaker>,
    hasher: Arc<dyn CredentialHasher>,
) -> anyhow::Result<()>
where
    S: Store + Clone + 'static,
{
    if let Some(account) = admin_account(&cfg.bootstrap, hasher.as_ref())? {
        let outcome =
            tokio::time::timeout(cfg.server.request_timeout(), bootstrap_admin(&store, account))
                .await
                .context("admin bootstrap timed out")??;
        if let BootstrapOutcome::Created(id) = outcome {
            tracing::info!(user_id = %id, "admin account created");
        }
    }

    let background = BackgroundTasks::new();
    let users = UserService::new(
        store,
        tokens,
        hasher,
        Arc::new(LogNotifier),
        Arc::new(RoleCatalog::standard()),
        background.clone(),
    );
    let state = AppState::new(users, cfg.environment, cfg.server.request_timeout());
    let app = http::router(state);

    let listener = TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind))?;
    tracing::info!(address = %cfg.server.bind, environment = %cfg.environment, "uai server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let abandoned = background.shutdown(cfg.server.shutdown_grace()).await;
    if abandoned > 0 {
        tracing::warn!(abandoned, "background tasks abandoned at shutdown");
    }
    tracing::info!("uai server stopped");
    Ok(())
}

/// Resolve the bootstrap password digest, hashing a plaintext password if
/// that is all that was configured.
fn admin_account(
    cfg: &BootstrapConfig,
    hasher: &dyn CredentialHasher,
) -> anyhow::Result<Option<AdminAccount>> {
    if !cfg.enabled {
        return Ok(None);
    }

    let password_hash = match (&cfg.password_hash, &cfg.password) {
        (Some(hash), _) => hash.clone(),
        (None, Some(password)) => {
            tracing::warn!("bootstrap.password is plaintext; prefer bootstrap.password_hash");
            hasher.hash(password)?
        }
        (None, None) => {
            tracing::warn!("no admin password configured; skipping admin bootstrap");
            return Ok(None);
        }
    };

    Ok(Some(AdminAccount {
        name: cfg.name.clone(),
        email: cfg.email.clone(),
        password_hash,
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

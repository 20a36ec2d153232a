#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uai_auth::{Argon2Hasher, CredentialHasher, Scope, ScopedTokenMaker, SymmetricKey, TokenMaker};
use uai_core::models::User;
use uai_core::{Clock, Environment, FixedClock, PasswordConfig, RoleCatalog, RoleCode};
use uai_server::users::NewAccount;
use uai_server::{AppState, BackgroundTasks, Notifier, UserService};
use uai_store::MemoryStore;

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub recipient: String,
    pub template: String,
    pub data: serde_json::Value,
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        recipient: &str,
        template: &str,
        data: serde_json::Value,
    ) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMessage {
            recipient: recipient.to_string(),
            template: template.to_string(),
            data,
        });
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _: &str, _: &str, _: serde_json::Value) -> anyhow::Result<()> {
        anyhow::bail!("smtp connection refused")
    }
}

pub fn cheap_hasher() -> Argon2Hasher {
    Argon2Hasher::new(&PasswordConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

pub struct Harness {
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
    pub tokens: Arc<ScopedTokenMaker>,
    pub hasher: Arc<Argon2Hasher>,
    pub notifier: Arc<RecordingNotifier>,
    pub background: BackgroundTasks,
    pub users: UserService<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(MemoryStore::new(), None)
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(store, None)
    }

    pub fn with_failing_notifier() -> Self {
        Self::build(MemoryStore::new(), Some(Arc::new(FailingNotifier)))
    }

    fn build(store: MemoryStore, notifier: Option<Arc<dyn Notifier>>) -> Self {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        let tokens = Arc::new(ScopedTokenMaker::with_clock(
            &SymmetricKey::generate(),
            clock.clone(),
        ));
        let hasher = Arc::new(cheap_hasher());
        let recorder = Arc::new(RecordingNotifier::default());
        let notifier: Arc<dyn Notifier> = notifier.unwrap_or_else(|| recorder.clone() as Arc<dyn Notifier>);
        let background = BackgroundTasks::new();

        let users = UserService::new(
            store.clone(),
            tokens.clone(),
            hasher.clone(),
            notifier,
            Arc::new(RoleCatalog::standard()),
            background.clone(),
        );

        Self {
            store,
            clock,
            tokens,
            hasher,
            notifier: recorder,
            background,
            users,
        }
    }

    pub fn app_state(&self) -> AppState<MemoryStore> {
        AppState::new(
            self.users.clone(),
            Environment::Development,
            Duration::from_secs(5),
        )
    }

    pub async fn onboard(&self, email: &str) -> User {
        self.users
            .add_user(NewAccount {
                name: "Test User".into(),
                email: email.into(),
                roles: vec![RoleCode::Staff],
            })
            .await
            .unwrap()
            .user
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn activation_token(&self, user: &User) -> String {
        self.tokens.create_token(user.id, Scope::Activation).unwrap()
    }

    /// Onboard and activate, returning the user and its password.
    pub async fn active_user(&self, email: &str) -> (User, String) {
        let user = self.onboard(email).await;
        let password = "pa55word-long".to_string();
        self.users
            .activate_user(&self.activation_token(&user), &password)
            .await
            .unwrap();
        (user, password)
    }

    pub fn password_matches(&self, password: &str, digest: &str) -> bool {
        self.hasher.matches(password, digest).unwrap()
    }
}

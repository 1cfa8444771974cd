//! Shared test infrastructure.
//!
//! Provides in-memory implementations of the store contracts so the auth
//! flow and the full router can be exercised without a database, plus a
//! `TestContext` that wires them into the application.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkpad::{
    app::{build_router, AppState},
    auth::{
        jwt::{JwtCodec, TokenCodec},
        password::Argon2Hasher,
        service::AuthService,
    },
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
    models::{
        note::{Note, NoteStore, SaveNote},
        refresh_token::{RefreshToken, RefreshTokenStore},
        user::{CreateUser, CredentialStore, User},
    },
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// In-memory credential store.
#[derive(Default)]
pub struct InMemoryUsers {
    records: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    /// Removes a user, simulating an account that vanished after a token
    /// was issued.
    pub fn remove(&self, id: Uuid) {
        self.records.lock().unwrap().retain(|u| u.id != id);
    }
}

#[async_trait]
impl CredentialStore for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, data: CreateUser) -> Result<User, sqlx::Error> {
        let mut records = self.records.lock().unwrap();

        if records.iter().any(|u| u.email == data.email) {
            return Err(sqlx::Error::Protocol(
                "unique constraint violation: users.email".into(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        records.push(user.clone());
        Ok(user)
    }
}

/// In-memory refresh-token store.
#[derive(Default)]
pub struct InMemoryRefreshTokens {
    records: Mutex<Vec<RefreshToken>>,
}

impl InMemoryRefreshTokens {
    pub fn contains(&self, user_id: Uuid, token_hash: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.user_id == user_id && r.token_hash == token_hash)
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokens {
    async fn save(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, sqlx::Error> {
        let record = RefreshToken {
            id: Uuid::new_v4(),
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_user_and_hash(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.token_hash == token_hash)
            .cloned())
    }

    async fn delete_by_user_and_hash(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.user_id == user_id && r.token_hash == token_hash));
        Ok(records.len() < before)
    }
}

/// In-memory note store.
#[derive(Default)]
pub struct InMemoryNotes {
    records: Mutex<Vec<Note>>,
}

impl InMemoryNotes {
    pub fn contains(&self, id: Uuid) -> bool {
        self.records.lock().unwrap().iter().any(|n| n.id == id)
    }
}

#[async_trait]
impl NoteStore for InMemoryNotes {
    async fn save(&self, data: SaveNote) -> Result<Option<Note>, sqlx::Error> {
        let mut records = self.records.lock().unwrap();

        if let Some(id) = data.id {
            if let Some(existing) = records.iter_mut().find(|n| n.id == id) {
                if existing.owner_id != data.owner_id {
                    return Ok(None);
                }
                existing.title = data.title;
                existing.content = data.content;
                existing.color = data.color;
                return Ok(Some(existing.clone()));
            }
        }

        let note = Note {
            id: data.id.unwrap_or_else(Uuid::new_v4),
            title: data.title,
            content: data.content,
            color: data.color,
            created_at: Utc::now(),
            owner_id: data.owner_id,
        };
        records.push(note.clone());
        Ok(Some(note))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|n| n.id != id);
        Ok(records.len() < before)
    }
}

/// Default test codec: 15 minute access, 30 day refresh.
pub fn test_codec() -> JwtCodec {
    JwtCodec::new(
        TEST_SECRET,
        chrono::Duration::minutes(15),
        chrono::Duration::days(30),
    )
}

/// Builds an [`AuthService`] over in-memory stores, returning the stores so
/// tests can observe what was persisted.
pub fn auth_service(
    codec: JwtCodec,
) -> (AuthService, Arc<InMemoryUsers>, Arc<InMemoryRefreshTokens>) {
    let users = Arc::new(InMemoryUsers::default());
    let refresh_tokens = Arc::new(InMemoryRefreshTokens::default());

    let service = AuthService::new(
        Arc::new(Argon2Hasher),
        Arc::new(codec),
        users.clone(),
        refresh_tokens.clone(),
    );

    (service, users, refresh_tokens)
}

/// Full-application test context over in-memory stores.
pub struct TestContext {
    pub app: axum::Router,
    pub users: Arc<InMemoryUsers>,
    pub refresh_tokens: Arc<InMemoryRefreshTokens>,
    pub notes: Arc<InMemoryNotes>,
    pub codec: Arc<dyn TokenCodec>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/inkpad_test".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 30,
            },
        };

        // Lazy pool: never actually connects as long as no handler under
        // test touches the database.
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");

        let codec: Arc<dyn TokenCodec> = Arc::new(JwtCodec::from_config(&config.jwt));
        let users = Arc::new(InMemoryUsers::default());
        let refresh_tokens = Arc::new(InMemoryRefreshTokens::default());
        let notes = Arc::new(InMemoryNotes::default());

        let state = AppState::with_stores(
            pool,
            config,
            codec.clone(),
            users.clone(),
            refresh_tokens.clone(),
            notes.clone(),
        );

        Self {
            app: build_router(state),
            users,
            refresh_tokens,
            notes,
            codec,
        }
    }
}

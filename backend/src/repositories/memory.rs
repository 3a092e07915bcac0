//! In-process user store for tests and local runs without PostgreSQL

use super::user::{DuplicateEmail, UserRecord, UserStore};
use admin_panel_shared::OAuthProfile;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User store backed by a map. Enforces the same unique-email rule as the
/// `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == record.email) {
            return Err(DuplicateEmail(record.email).into());
        }
        users.insert(record.id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create_with_password(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<UserRecord> {
        let now = Utc::now();
        self.insert(UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            password_hash: Some(password_hash.to_string()),
            oauth_provider: None,
            oauth_account_id: None,
            created_at: now,
            updated_at: now,
        })
        .await
    }

    async fn create_from_oauth(&self, email: &str, profile: &OAuthProfile) -> Result<UserRecord> {
        let now = Utc::now();
        self.insert(UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: profile.name.clone(),
            password_hash: None,
            oauth_provider: Some(profile.provider.clone()),
            oauth_account_id: Some(profile.provider_account_id.clone()),
            created_at: now,
            updated_at: now,
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

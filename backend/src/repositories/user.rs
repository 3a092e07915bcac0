//! User records and the store the auth flows resolve them from

use admin_panel_shared::{OAuthProfile, UserProfile};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Insert refused because another record already holds the email
#[derive(Debug, Error)]
#[error("email already registered: {0}")]
pub struct DuplicateEmail(pub String);

impl DuplicateEmail {
    /// Whether a store error is a duplicate-email refusal
    pub fn is(err: &anyhow::Error) -> bool {
        err.downcast_ref::<DuplicateEmail>().is_some()
    }
}

/// User record from the store
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Absent for accounts created through OAuth
    pub password_hash: Option<String>,
    pub oauth_provider: Option<String>,
    pub oauth_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Lookup and creation of user records
///
/// Emails arrive already normalised (trimmed, lower-cased). The `create_*`
/// methods fail with [`DuplicateEmail`] when the email is taken, even if a
/// lookup just before said it was free.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn create_with_password(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<UserRecord>;

    async fn create_from_oauth(&self, email: &str, profile: &OAuthProfile) -> Result<UserRecord>;

    /// Check the backing store is reachable
    async fn ping(&self) -> Result<()>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn insert_error(email: &str, err: sqlx::Error) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DuplicateEmail(email.to_string()).into()
        }
        _ => err.into(),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, oauth_provider, oauth_account_id,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, oauth_provider, oauth_account_id,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_with_password(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, oauth_provider, oauth_account_id,
                      created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(email, e))?;

        Ok(user)
    }

    async fn create_from_oauth(&self, email: &str, profile: &OAuthProfile) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, name, oauth_provider, oauth_account_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, oauth_provider, oauth_account_id,
                      created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(profile.name.as_deref())
        .bind(&profile.provider)
        .bind(&profile.provider_account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(email, e))?;

        Ok(user)
    }

    async fn ping(&self) -> Result<()> {
        crate::db::health_check(&self.pool).await
    }
}

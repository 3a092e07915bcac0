//! Authentication flows that end in a credential
//!
//! Sign-up, sign-in and the OAuth hand-off resolve a user record through
//! the `UserStore`, then ask the `TokenService` for a credential carrying
//! `{sub: user id, email}`. A signing failure surfaces as an internal
//! error, never as bad credentials.

use crate::auth::{IssueClaims, PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{DuplicateEmail, UserRecord, UserStore};
use admin_panel_shared::validation::normalize_email;
use admin_panel_shared::{
    AuthError, OAuthProfile, SessionResponse, SignInRequest, SignUpRequest, UserProfile,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Create a password account and open a session for it
    ///
    /// Nothing is stored when no credential could be issued for it.
    pub async fn sign_up(
        users: &dyn UserStore,
        tokens: &TokenService,
        req: SignUpRequest,
    ) -> Result<SessionResponse, ApiError> {
        req.validate()?;
        Self::ensure_can_sign(tokens)?;

        let conflict = || ApiError::Conflict("Email already registered".to_string());

        let email = normalize_email(&req.email);
        if users.find_by_email(&email).await?.is_some() {
            return Err(conflict());
        }

        let password_hash = PasswordService::hash_async(req.password).await?;

        let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        // A concurrent sign-up may have taken the email since the lookup
        let user = match users.create_with_password(&email, name, &password_hash).await {
            Ok(user) => user,
            Err(e) if DuplicateEmail::is(&e) => return Err(conflict()),
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %user.id, "User registered");

        Self::open_session(tokens, &user)
    }

    /// Check email and password, then open a session
    ///
    /// Unknown email, OAuth-only account and wrong password all fail the
    /// same way.
    pub async fn sign_in(
        users: &dyn UserStore,
        tokens: &TokenService,
        req: SignInRequest,
    ) -> Result<SessionResponse, ApiError> {
        req.validate()?;

        let email = normalize_email(&req.email);
        let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

        let user = users.find_by_email(&email).await?;
        let hash = user.as_ref().and_then(|u| u.password_hash.clone());

        // One Argon2 verify on every path
        let matched = match hash {
            Some(hash) => PasswordService::verify_async(req.password, hash).await?,
            None => PasswordService::verify_unmatched_async(req.password).await?,
        };

        match user {
            Some(user) if matched => Self::open_session(tokens, &user),
            _ => Err(invalid()),
        }
    }

    /// OAuth hand-off: resolve or create the account for a provider
    /// profile, then open a session
    pub async fn complete_oauth(
        users: &dyn UserStore,
        tokens: &TokenService,
        profile: OAuthProfile,
    ) -> Result<SessionResponse, ApiError> {
        if let Err(errors) = profile.validate() {
            warn!(provider = %profile.provider, "Rejected malformed OAuth profile");
            return Err(errors.into());
        }

        Self::ensure_can_sign(tokens)?;

        let email = normalize_email(&profile.email);
        let user = match users.find_by_email(&email).await? {
            Some(user) => user,
            None => Self::create_oauth_user(users, &email, &profile).await?,
        };

        Self::open_session(tokens, &user)
    }

    async fn create_oauth_user(
        users: &dyn UserStore,
        email: &str,
        profile: &OAuthProfile,
    ) -> Result<UserRecord, ApiError> {
        match users.create_from_oauth(email, profile).await {
            Ok(user) => {
                info!(user_id = %user.id, provider = %profile.provider, "User created from OAuth profile");
                Ok(user)
            }
            // Lost a race with another hand-off for the same email
            Err(e) if DuplicateEmail::is(&e) => users
                .find_by_email(email)
                .await?
                .ok_or_else(|| ApiError::Internal(e.context("duplicate email but no record found"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Profile of the user a verified credential names
    pub async fn profile(users: &dyn UserStore, subject: &str) -> Result<UserProfile, ApiError> {
        let not_found = || ApiError::NotFound("User not found".to_string());

        let id = Uuid::parse_str(subject).map_err(|_| not_found())?;
        let user = users.find_by_id(id).await?.ok_or_else(not_found)?;

        Ok(user.profile())
    }

    fn ensure_can_sign(tokens: &TokenService) -> Result<(), ApiError> {
        if tokens.can_sign() {
            Ok(())
        } else {
            Err(AuthError::SigningFailure("signing secret is empty".to_string()).into())
        }
    }

    fn open_session(tokens: &TokenService, user: &UserRecord) -> Result<SessionResponse, ApiError> {
        let issued = tokens.issue(&user.id.to_string(), IssueClaims::with_email(&user.email))?;

        Ok(SessionResponse {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.claims.expires_at(),
            user: user.profile(),
        })
    }
}

//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Sign-up request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"), length(max = 255, message = "Email too long"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
}

/// Sign-in request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile handed over by an OAuth provider after a successful exchange
///
/// Treated as untrusted input: it is validated before any user record is
/// resolved or created from it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OAuthProfile {
    #[validate(length(min = 1, max = 50, message = "Provider is required"))]
    pub provider: String,
    #[validate(length(min = 1, max = 255, message = "Provider account id is required"))]
    pub provider_account_id: String,
    #[validate(email(message = "Invalid email format"), length(max = 255, message = "Email too long"))]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Name too long"))]
    pub name: Option<String>,
}

/// Issued session returned by sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Identity carried by a verified credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry (Unix timestamp)
    pub exp: i64,
}

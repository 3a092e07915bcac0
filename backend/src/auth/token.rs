//! Signed credential issuance and verification
//!
//! Credentials are HS256 JWTs carrying `sub`, an optional `email`, `iat`,
//! `exp` and any extra claims the caller supplies. Every credential lives
//! for [`TOKEN_TTL_SECS`]; there is no refresh and no revocation.
//!
//! Both operations are pure over `(token, secret, now)`. The `*_at`
//! variants take the clock value explicitly, the plain variants read the
//! wall clock.

use admin_panel_shared::AuthError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// Lifetime of every issued credential (72 hours)
pub const TOKEN_TTL_SECS: i64 = 72 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claim names the service controls. Extras using them are dropped.
const RESERVED_CLAIMS: [&str; 7] = ["sub", "email", "iat", "exp", "nbf", "aud", "iss"];

/// Payload of a credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Additional caller-supplied claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Claims the caller wants embedded next to the subject
#[derive(Debug, Clone, Default)]
pub struct IssueClaims {
    pub email: Option<String>,
    pub extra: Map<String, Value>,
}

impl IssueClaims {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            extra: Map::new(),
        }
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A freshly signed credential and the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Pre-computed signing keys
#[derive(Clone)]
struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }
}

/// Issues and verifies credentials under one process-wide secret
///
/// Build once at startup and share through `AppState`; clones only bump
/// reference counts. An empty secret leaves the service without keys:
/// issuance reports [`AuthError::SigningFailure`] and nothing verifies.
#[derive(Clone)]
pub struct TokenService {
    keys: Option<TokenKeys>,
    validation: Arc<Validation>,
}

impl TokenService {
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        let keys = (!secret.is_empty()).then(|| TokenKeys::new(secret));

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is compared against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys,
            validation: Arc::new(validation),
        }
    }

    /// Whether a signing key is configured
    pub fn can_sign(&self) -> bool {
        self.keys.is_some()
    }

    /// Sign a credential for `subject`, valid for 72 hours from now
    #[inline]
    pub fn issue(&self, subject: &str, claims: IssueClaims) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, claims, Utc::now())
    }

    /// Sign a credential as if issued at `now`
    pub fn issue_at(
        &self,
        subject: &str,
        claims: IssueClaims,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let result = self.sign(subject, claims, now);
        match &result {
            Ok(_) => metrics::counter!("auth_tokens_issued_total").increment(1),
            Err(e) => {
                error!(error = %e, "Credential issuance failed");
                metrics::counter!("auth_token_signing_failures_total").increment(1);
            }
        }
        result
    }

    fn sign(
        &self,
        subject: &str,
        claims: IssueClaims,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| AuthError::SigningFailure("signing secret is empty".to_string()))?;

        if subject.trim().is_empty() {
            return Err(AuthError::SigningFailure("subject is empty".to_string()));
        }

        let mut extra = claims.extra;
        extra.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        let claims = Claims {
            sub: subject.to_string(),
            email: claims.email,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
            extra,
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &keys.encoding)
            .map_err(|e| AuthError::SigningFailure(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a credential against the wall clock
    ///
    /// Returns `None` for anything that is not a valid, unexpired
    /// credential, including no token at all.
    #[inline]
    pub fn verify(&self, token: Option<&str>) -> Option<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a credential as of `now`
    pub fn verify_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Option<Claims> {
        match self.check_at(token?, now) {
            Ok(claims) => Some(claims),
            Err(reason) => {
                debug!(%reason, "Credential rejected");
                None
            }
        }
    }

    /// Classified verification, for callers that log the reason
    pub fn check_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let keys = self.keys.as_ref().ok_or(AuthError::InvalidCredential)?;

        if token.is_empty() {
            return Err(AuthError::InvalidCredential);
        }

        let claims = decode::<Claims>(token, &keys.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                _ => AuthError::InvalidCredential,
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(AuthError::InvalidCredential);
        }
        if now.timestamp() >= claims.exp {
            return Err(AuthError::ExpiredCredential);
        }

        Ok(claims)
    }
}

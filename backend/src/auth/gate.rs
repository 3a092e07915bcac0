//! Request gate decisions
//!
//! One verification path, two extraction rules: page navigation carries the
//! credential in the `auth-token` cookie, API calls carry it in
//! `Authorization: <scheme> <token>`. These functions only decide; the
//! axum adapters in `middleware` turn decisions into responses.

use super::token::{Claims, TokenService};
use admin_panel_shared::AuthError;

/// Cookie carrying the credential for page navigation
pub const SESSION_COOKIE: &str = "auth-token";

/// Outcome of the page gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    /// Let the request through unchanged
    Allow,
    /// Send the visitor to the sign-in page
    SignIn,
}

/// Token part of an `Authorization` header value.
///
/// The scheme is not interpreted; the token is the second
/// whitespace-delimited segment.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut segments = header.split_whitespace();
    segments.next()?;
    segments.next()
}

/// Header gate for JSON API calls
///
/// No header is `MissingCredential`. A header whose token is absent or
/// fails verification is `InvalidCredential`.
pub fn authorize_api(
    tokens: &TokenService,
    authorization: Option<&str>,
) -> Result<Claims, AuthError> {
    let outcome = match authorization {
        None => Err(AuthError::MissingCredential),
        Some(header) => tokens
            .verify(bearer_token(header))
            .ok_or(AuthError::InvalidCredential),
    };

    let label = match &outcome {
        Ok(_) => "allowed",
        Err(AuthError::MissingCredential) => "missing",
        Err(_) => "invalid",
    };
    metrics::counter!("auth_gate_decisions_total", "surface" => "api", "outcome" => label)
        .increment(1);

    outcome
}

/// Cookie gate for page navigation
pub fn authorize_page(tokens: &TokenService, cookie: Option<&str>) -> PageDecision {
    let decision = match tokens.verify(cookie) {
        Some(_) => PageDecision::Allow,
        None => PageDecision::SignIn,
    };

    let label = match decision {
        PageDecision::Allow => "allowed",
        PageDecision::SignIn => "redirected",
    };
    metrics::counter!("auth_gate_decisions_total", "surface" => "page", "outcome" => label)
        .increment(1);

    decision
}

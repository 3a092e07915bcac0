//! Authentication module
//!
//! Stateless credential issuance and the request gates built on it, plus
//! argon2 password hashing for the sign-in flow.

mod gate;
mod middleware;
mod password;
mod token;

pub use gate::{authorize_api, authorize_page, bearer_token, PageDecision, SESSION_COOKIE};
pub use middleware::{expired_session_cookie, require_session, session_cookie, AuthUser};
pub use password::PasswordService;
pub use token::{Claims, IssueClaims, IssuedToken, TokenService, TOKEN_TTL_SECS};

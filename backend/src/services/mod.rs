//! Business logic services
//!
//! Services coordinate the user store, password hashing and credential
//! issuance.

pub mod auth;

pub use auth::AuthService;

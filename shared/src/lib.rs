//! Admin Panel Shared Library
//!
//! Wire types, the credential failure taxonomy and validation helpers used
//! by the backend and by clients of its API.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;

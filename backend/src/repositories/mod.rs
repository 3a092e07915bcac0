//! User data access
//!
//! The auth flows depend on the [`UserStore`] trait; PostgreSQL backs it in
//! production and an in-memory map backs it in tests.

pub mod memory;
pub mod user;

pub use memory::MemoryUserStore;
pub use user::{DuplicateEmail, PgUserStore, UserRecord, UserStore};

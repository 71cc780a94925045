//! Outbound security adapters.

mod sha_password_hasher;

pub use sha_password_hasher::ShaPasswordHasher;

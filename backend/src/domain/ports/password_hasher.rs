//! Seam for password hashing so credential storage stays swappable.

/// Port for one-way password hashing.
///
/// Implementations must embed whatever salt material they need inside the
/// stored string so [`PasswordHasher::verify`] is self-contained.
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password into its storable form.
    fn hash(&self, password: &str) -> String;

    /// Check a raw password against a stored hash.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

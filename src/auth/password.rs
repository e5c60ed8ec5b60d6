use bcrypt::BcryptError;

/// Hash a plaintext password. The salt is generated per call and embedded
/// in the returned hash.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(plaintext, cost)
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a failed match rather than an error,
/// so callers get a plain yes/no.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

pub trait PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, PasswordHashError>;
    fn verify_password(&self, password: &str, password_hash: &str) -> bool;
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(pub String);

pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, PasswordHashError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordHashError(e.to_string()))
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        match bcrypt::verify(password, password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = BcryptPasswordHasher::new(4);
        let hash = hasher.hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(hasher.verify_password("hunter22", &hash));
        assert!(!hasher.verify_password("hunter23", &hash));
    }

    #[test]
    fn test_verify_garbage_hash() {
        let hasher = BcryptPasswordHasher::new(4);
        assert!(!hasher.verify_password("hunter22", "not-a-hash"));
    }
}

use std::collections::HashMap;

use sha2::{Digest, Sha256};

const DIGEST_HEX_LEN: usize = 64;

/// Development accounts: `admin` / `admin123` and `clerk` / `clerk123`.
const DEVELOPMENT_CREDENTIALS: &[(&str, &str)] = &[
    (
        "admin",
        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9",
    ),
    (
        "clerk",
        "a3630b8b8f6c82d33b0695f77f915e69ed7b0c5214062f8b870219845e069d30",
    ),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential entry `{0}` must look like `username:sha256hex`")]
    MalformedEntry(String),
    #[error("password digest for `{0}` must be 64 hexadecimal characters")]
    InvalidDigest(String),
}

/// Lower-case hex SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Staff accounts keyed by username, holding password digests only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    digests: HashMap<String, String>,
}

impl CredentialStore {
    pub fn development() -> Self {
        Self {
            digests: DEVELOPMENT_CREDENTIALS
                .iter()
                .map(|(user, digest)| ((*user).to_string(), (*digest).to_string()))
                .collect(),
        }
    }

    /// Parse `user:digest` pairs separated by commas.
    pub fn parse(pairs: &str) -> Result<Self, CredentialError> {
        let mut digests = HashMap::new();
        for entry in pairs.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (user, digest) = entry
                .split_once(':')
                .map(|(user, digest)| (user.trim(), digest.trim()))
                .filter(|(user, _)| !user.is_empty())
                .ok_or_else(|| CredentialError::MalformedEntry(entry.to_string()))?;

            let valid_digest = digest.len() == DIGEST_HEX_LEN
                && digest.bytes().all(|byte| byte.is_ascii_hexdigit());
            if !valid_digest {
                return Err(CredentialError::InvalidDigest(user.to_string()));
            }

            digests.insert(user.to_string(), digest.to_ascii_lowercase());
        }
        Ok(Self { digests })
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        let candidate = hash_password(password);
        match self.digests.get(username) {
            Some(expected) => constant_time_eq(expected.as_bytes(), candidate.as_bytes()),
            None => false,
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::development()
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_to_lowercase_hex() {
        assert_eq!(
            hash_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
    }

    #[test]
    fn development_accounts_verify() {
        let store = CredentialStore::development();
        assert!(store.verify("admin", "admin123"));
        assert!(store.verify("clerk", "clerk123"));
        assert!(!store.verify("admin", "wrong"));
        assert!(!store.verify("nobody", "admin123"));
    }

    #[test]
    fn parses_configured_pairs() {
        let pairs = format!(" nurse:{} ,", hash_password("ward7"));
        let store = CredentialStore::parse(&pairs).expect("valid pairs");
        assert_eq!(store.len(), 1);
        assert!(store.verify("nurse", "ward7"));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            CredentialStore::parse("nurse"),
            Err(CredentialError::MalformedEntry("nurse".to_string()))
        );
        assert_eq!(
            CredentialStore::parse("nurse:abc123"),
            Err(CredentialError::InvalidDigest("nurse".to_string()))
        );
    }
}

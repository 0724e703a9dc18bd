use sha2::{Digest, Sha512};
use thiserror::Error;

use crate::flag::MigrationFlag;

/// bcrypt work factor for new credentials.
pub const BCRYPT_COST: u32 = 12;

/// Length of a hex-encoded SHA-512 digest.
const SHA512_HEX_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Bcrypt,
    Sha512,
}

/// The hash engine itself failed. This is a broken deployment, never a
/// property of the password.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt engine failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone)]
pub struct CredentialHasher {
    flag: MigrationFlag,
}

impl CredentialHasher {
    pub fn new(flag: MigrationFlag) -> Self {
        Self { flag }
    }

    /// Algorithm the next `hash` call will use.
    pub fn algorithm(&self) -> HashAlgorithm {
        if self.flag.uses_bcrypt() {
            HashAlgorithm::Bcrypt
        } else {
            HashAlgorithm::Sha512
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        self.hash_with(self.algorithm(), password)
    }

    /// Hash with an algorithm chosen earlier, so a flag flip mid-request
    /// can't change it.
    pub fn hash_with(&self, algorithm: HashAlgorithm, password: &str) -> Result<String, HashError> {
        match algorithm {
            HashAlgorithm::Bcrypt => Ok(bcrypt::hash(password, BCRYPT_COST)?),
            HashAlgorithm::Sha512 => Ok(sha512_hex(password)),
        }
    }
}

/// Lowercase hex SHA-512 of the UTF-8 bytes.
pub fn sha512_hex(password: &str) -> String {
    hex::encode(Sha512::digest(password.as_bytes()))
}

/// Work out which algorithm produced a stored hash.
pub fn detect(stored: &str) -> Option<HashAlgorithm> {
    if stored.starts_with("$2") {
        Some(HashAlgorithm::Bcrypt)
    } else if stored.len() == SHA512_HEX_LEN && stored.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(HashAlgorithm::Sha512)
    } else {
        None
    }
}

/// Check a password against a stored hash of either format.
pub fn verify(password: &str, stored: &str) -> bool {
    match detect(stored) {
        Some(HashAlgorithm::Bcrypt) => bcrypt::verify(password, stored).unwrap_or(false),
        Some(HashAlgorithm::Sha512) => sha512_hex(password).eq_ignore_ascii_case(stored),
        None => false,
    }
}

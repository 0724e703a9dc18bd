//! Registry credential hashing
//!
//! New credentials are hashed with one of two algorithms:
//! - bcrypt (cost 12, random salt per call) once the migration flag is on
//! - unsalted SHA-512 hex, the format of credentials issued before migration
//!
//! The flag is a shared handle so it can be flipped at runtime.

pub mod flag;
pub mod hash;

pub use flag::MigrationFlag;
pub use hash::{BCRYPT_COST, CredentialHasher, HashAlgorithm, HashError};

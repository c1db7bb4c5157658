use bcrypt::{hash, BcryptResult, DEFAULT_COST};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];
const DUMMY_SECRET: &str = "vaultftpd-unknown-user";

/// A stored shared secret, either plaintext or a bcrypt hash.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    Plain(String),
    Bcrypt(String),
}

impl Secret {
    pub fn parse(stored: &str) -> Self {
        if BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix)) {
            Secret::Bcrypt(stored.to_string())
        } else {
            Secret::Plain(stored.to_string())
        }
    }

    /// Stand-in secret checked for unknown users, so that rejecting them costs
    /// as much as rejecting a known user with a secret of `cost`.
    pub fn dummy(bcrypt_cost: Option<u32>) -> BcryptResult<Self> {
        match bcrypt_cost {
            Some(cost) => Ok(Secret::Bcrypt(hash(DUMMY_SECRET, cost)?)),
            None => Ok(Secret::Plain(DUMMY_SECRET.to_string())),
        }
    }

    /// Timing-safe verification of a submitted password.
    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            Secret::Plain(expected) => {
                // Digests have a fixed length, so the comparison leaks neither
                // content nor length.
                let expected = Sha256::digest(expected.as_bytes());
                let candidate = Sha256::digest(candidate.as_bytes());
                bool::from(expected.as_slice().ct_eq(candidate.as_slice()))
            }
            Secret::Bcrypt(hashed) => bcrypt::verify(candidate, hashed).unwrap_or(false),
        }
    }

    /// Work factor of a bcrypt secret (`$2b$12$...` -> 12).
    pub fn bcrypt_cost(&self) -> Option<u32> {
        match self {
            Secret::Bcrypt(hashed) => hashed.get(4..6)?.parse().ok(),
            Secret::Plain(_) => None,
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Plain(_) => f.write_str("Secret::Plain(<redacted>)"),
            Secret::Bcrypt(_) => f.write_str("Secret::Bcrypt(<redacted>)"),
        }
    }
}

/// Hashes a password for storage in the users file.
pub fn hash_password(password: &str) -> BcryptResult<String> {
    hash(password, DEFAULT_COST)
}

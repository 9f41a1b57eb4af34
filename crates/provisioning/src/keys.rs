//! Write-authorization secrets.
//!
//! A secret is issued once, at creation or fork time, and returned to the
//! caller. Only its SHA-256 digest is persisted (in `metaData.json`);
//! possession of the plaintext later proves the right to edit. Verification
//! happens in the request middleware, outside this workspace.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of random bytes in a secret (rendered as twice as many hex chars).
pub const SECRET_BYTES: usize = 32;

/// Plaintext secret. `Debug` is redacted so it never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plaintext, for handing back to the caller exactly once.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Lowercase hex SHA-256 digest of a [`Secret`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyDigest(String);

impl KeyDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A freshly issued secret and its digest.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub secret: Secret,
    pub digest: KeyDigest,
}

impl IssuedKey {
    /// Derives the digest for a given plaintext.
    pub fn from_secret(secret: Secret) -> Self {
        let digest = digest_of(secret.expose());
        Self { secret, digest }
    }
}

/// Capability that produces new secrets.
pub trait KeyIssuer: Send + Sync {
    fn issue(&self) -> IssuedKey;
}

/// Issues 32 bytes from the thread-local CSPRNG, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeyIssuer;

impl KeyIssuer for RandomKeyIssuer {
    fn issue(&self) -> IssuedKey {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        IssuedKey::from_secret(Secret(hex::encode(bytes)))
    }
}

/// One-way digest of a plaintext secret.
pub fn digest_of(secret: &str) -> KeyDigest {
    KeyDigest(hex::encode(Sha256::digest(secret.as_bytes())))
}

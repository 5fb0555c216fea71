// src/services/hasher.rs

//! Content digests for change detection and archive addressing.

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::models::HashAlgorithm;

/// Deterministic hex digest of a byte sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Lowercase hex digest of `content`.
    pub fn hash(&self, content: impl AsRef<[u8]>) -> String {
        match self.algorithm {
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(content.as_ref())),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(content.as_ref())),
        }
    }
}

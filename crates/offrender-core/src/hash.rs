//! Content hashing for deterministic rendering verification.
//!
//! Produces a SHA-256 digest of a pixel buffer so two runs of the same scene
//! can be compared bit for bit.

use sha2::{Digest, Sha256};

use crate::frame::PixelBuffer;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Compute the digest of a pixel buffer, dimensions included.
    pub fn of(buffer: &PixelBuffer) -> Self {
        let mut hasher = Sha256::new();
        // Same bytes reshaped to other dimensions must not collide.
        hasher.update(buffer.width().to_le_bytes());
        hasher.update(buffer.height().to_le_bytes());
        hasher.update(buffer.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self::from_bytes(bytes)
    }

    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

//! Cache key and ETag derivation
//!
//! Keys are derived from the canonical URL, ETags from the artifact bytes.
//! Both are truncated SHA-256 digests rendered as lowercase hex.

use sha2::{Digest, Sha256};
use std::fmt;

/// Stable storage identifier for a bundled artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a canonical URL, keeping the first `len` hex chars
    pub fn for_url(canonical_url: &str, len: usize) -> Self {
        let digest = Sha256::digest(canonical_url.as_bytes());
        let mut hash = hex::encode(digest);
        hash.truncate(len);
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the quoted ETag for artifact bytes from the first `bytes` digest bytes
pub fn etag(content: &[u8], bytes: usize) -> String {
    let digest = Sha256::digest(content);
    let n = bytes.min(digest.len());
    format!("\"{}\"", hex::encode(&digest[..n]))
}

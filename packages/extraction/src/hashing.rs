//! Content hashing for upload deduplication.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw file bytes.
///
/// The persistence collaborator uses this to detect duplicate uploads
/// before paying for extraction.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn same_bytes_same_hash() {
        assert_eq!(content_hash(b"resume"), content_hash(b"resume"));
        assert_ne!(content_hash(b"resume"), content_hash(b"resume2"));
    }
}

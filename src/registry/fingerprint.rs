use sha2::{Digest, Sha256};

/// Deterministic content fingerprint of a schema document.
///
/// Lowercase hex SHA-256 of the raw text. Used as the dedup key for pushes,
/// scoped per (graph, service), never globally.
#[must_use]
pub fn fingerprint(type_defs: &str) -> String {
    let digest = Sha256::digest(type_defs.as_bytes());
    hex::encode(digest)
}

//! Deterministic edge ID derivation.
//!
//! Edge IDs are a pure function of the `(source, type, target)` triple:
//! SHA-256 over the canonical triple encoding, truncated to a fixed-length
//! base36 string. The same relationship always produces the same ID, which
//! is what lets the store detect a duplicate edge as a plain key collision.
//!
//! # Format
//!
//! `dep-{hash}` where `hash` is 12 base36 characters, e.g.
//! `dep-a3f82k09qm1x`.

use sha2::{Digest, Sha256};

use crate::domain::{DependencyId, DependencyType, IssueId};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const HASH_LENGTH: usize = 12;
const ID_PREFIX: &str = "dep";

/// Derive the edge ID for a `(source, type, target)` triple.
///
/// Deterministic: equal triples always yield equal IDs. The triple
/// components are joined with a separator that cannot appear ambiguity-free
/// inside the type name, so `("a", blocks, "b")` and `("a", blocks, "b|x")`
/// cannot collide structurally.
pub fn dependency_id(
    source: &IssueId,
    dep_type: DependencyType,
    target: &IssueId,
) -> DependencyId {
    let mut hasher = Sha256::new();
    hasher.update(source.as_str().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(dep_type.as_str().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(target.as_str().as_bytes());
    let digest = hasher.finalize();

    let encoded = base36_encode(&digest, HASH_LENGTH);
    DependencyId::new(format!("{ID_PREFIX}-{encoded}"))
}

/// Encode the leading bytes of a digest as `length` base36 characters.
fn base36_encode(bytes: &[u8], length: usize) -> String {
    // 16 bytes give 128 bits of input entropy, far more than the
    // 36^12 (~62 bits) that survive truncation.
    let mut value = 0u128;
    for &byte in bytes.iter().take(16) {
        value = (value << 8) | u128::from(byte);
    }

    let mut encoded = String::with_capacity(length);
    for _ in 0..length {
        let digit = usize::try_from(value % 36).unwrap_or(0);
        encoded.push(BASE36_CHARS[digit] as char);
        value /= 36;
    }
    encoded
}

//! Stable identity of a code snippet.

use sha2::{Digest, Sha256};

/// Length of the display excerpt attached to analysis results.
pub const CODE_CONTEXT_CHARS: usize = 200;

/// Hex fingerprint of the exact code text.
///
/// Identical text always yields the same value; any whitespace change
/// yields a different one.
pub fn fingerprint(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    hex::encode(&digest[..16])
}

/// First [`CODE_CONTEXT_CHARS`] characters of the code.
pub fn code_context(code: &str) -> String {
    code.chars().take(CODE_CONTEXT_CHARS).collect()
}

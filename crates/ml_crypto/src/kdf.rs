//! Key derivation — HKDF-SHA256.
//!
//! Per-conversation content keys are expanded from a root key with the
//! conversation id as the info string, so one compromised conversation key
//! never exposes a sibling conversation.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::CryptoError;

/// Expand `ikm` + `info` into `output.len()` bytes of key material.
///
/// `salt` may be empty (HKDF will use a zeroed salt).
pub fn hkdf_expand(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
    output: &mut [u8],
) -> Result<(), CryptoError> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    hk.expand(info, output)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_is_deterministic() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        hkdf_expand(b"root", Some(b"salt"), b"conv-1", &mut a).unwrap();
        hkdf_expand(b"root", Some(b"salt"), b"conv-1", &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_info_gives_distinct_keys() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        hkdf_expand(b"root", Some(b"salt"), b"conv-1", &mut a).unwrap();
        hkdf_expand(b"root", Some(b"salt"), b"conv-2", &mut b).unwrap();
        assert_ne!(a, b);
    }
}

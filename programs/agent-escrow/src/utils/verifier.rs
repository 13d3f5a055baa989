//! Proof verification seam
//!
//! Settlement only ever asks a `ProofVerifier` whether a submitted hash is
//! acceptable. The deployed program uses `PlaceholderVerifier`, which
//! accepts any non-zero hash; a zero-knowledge verifier can replace it
//! without touching the ledger.

use crate::state::{EMPTY_PROOF_HASH, HASH_SIZE};

pub trait ProofVerifier {
    fn verify(&self, proof_hash: &[u8; HASH_SIZE]) -> bool;
}

/// Accepts every hash except the all-zero one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderVerifier;

impl ProofVerifier for PlaceholderVerifier {
    fn verify(&self, proof_hash: &[u8; HASH_SIZE]) -> bool {
        *proof_hash != EMPTY_PROOF_HASH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_rejects_empty_hash() {
        assert!(!PlaceholderVerifier.verify(&EMPTY_PROOF_HASH));
    }

    #[test]
    fn test_placeholder_accepts_any_non_zero_hash() {
        let mut hash = [0u8; HASH_SIZE];
        hash[HASH_SIZE - 1] = 1;
        assert!(PlaceholderVerifier.verify(&hash));
        assert!(PlaceholderVerifier.verify(&[0xAB; HASH_SIZE]));
    }
}

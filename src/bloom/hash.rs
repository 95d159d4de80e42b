use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::error::{DeltaError, Result};

/// Digest functions a key can be probed with, in the order they are enabled.
#[derive(Debug, Clone, Copy)]
enum DigestKind {
    Sha1,
    Sha256,
    Sha512,
    Sha224,
    Sha384,
}

impl DigestKind {
    fn digest(self, key: &[u8]) -> Vec<u8> {
        match self {
            DigestKind::Sha1 => Sha1::digest(key).to_vec(),
            DigestKind::Sha256 => Sha256::digest(key).to_vec(),
            DigestKind::Sha512 => Sha512::digest(key).to_vec(),
            DigestKind::Sha224 => Sha224::digest(key).to_vec(),
            DigestKind::Sha384 => Sha384::digest(key).to_vec(),
        }
    }
}

/// Maps keys to probe positions in a filter of `filter_size` bits: one
/// position per digest function, taken from the big-endian value of the
/// first `entropy` digest bytes reduced mod the filter size.
#[derive(Debug, Clone)]
pub struct PositionHasher {
    kinds: Vec<DigestKind>,
    filter_size: u64,
    entropy: u8,
}

impl PositionHasher {
    pub fn new(num_functions: u8, filter_size: u64, entropy: u8) -> Result<Self> {
        if !(3..=5).contains(&num_functions) {
            return Err(DeltaError::InvalidFilterConfig(
                "between 3 and 5 hash functions have to be configured".to_string(),
            ));
        }
        if entropy == 0 || entropy >= 20 {
            return Err(DeltaError::InvalidFilterConfig(
                "entropy bytes has to be between 0 and 20 (non-inclusive)".to_string(),
            ));
        }
        if filter_size == 0 {
            return Err(DeltaError::InvalidFilterConfig(
                "filter size has to be non-zero".to_string(),
            ));
        }

        let mut kinds = vec![DigestKind::Sha1, DigestKind::Sha256, DigestKind::Sha512];
        if num_functions >= 4 {
            kinds.push(DigestKind::Sha224);
        }
        if num_functions == 5 {
            kinds.push(DigestKind::Sha384);
        }

        Ok(Self {
            kinds,
            filter_size,
            entropy,
        })
    }

    pub fn num_functions(&self) -> usize {
        self.kinds.len()
    }

    /// Probe positions for `key`, one per configured digest function. Every
    /// position is strictly below the filter size.
    pub fn positions(&self, key: &[u8]) -> Vec<u64> {
        self.kinds
            .iter()
            .map(|kind| to_position(&kind.digest(key), self.filter_size, self.entropy))
            .collect()
    }
}

/// Big-endian value of the first `entropy` digest bytes, mod `filter_size`.
/// Reduced byte by byte so the intermediate fits in a `u128`. The entropy
/// bound of 19 bytes keeps the slice within even the shortest digest
/// (SHA-1, 20 bytes).
fn to_position(digest: &[u8], filter_size: u64, entropy: u8) -> u64 {
    digest[..entropy as usize].iter().fold(0u64, |acc, &byte| {
        ((acc as u128 * 256 + byte as u128) % filter_size as u128) as u64
    })
}

use crate::bloom::bitset::Bitset;
use crate::bloom::hash::PositionHasher;
use crate::error::Result;

/// Probabilistic set membership over a bitset and a family of digest
/// functions. A key counts as present only when every probe position it
/// hashes to is set.
#[derive(Debug, Clone)]
pub struct Bloom {
    bitset: Bitset,
    hasher: PositionHasher,
}

impl Bloom {
    pub fn new(filter_size: u64, num_functions: u8, entropy: u8) -> Result<Self> {
        let hasher = PositionHasher::new(num_functions, filter_size, entropy)?;
        Ok(Self {
            bitset: Bitset::new(filter_size),
            hasher,
        })
    }

    pub fn add_key(&mut self, key: &[u8]) -> Result<()> {
        self.bitset.set_many(&self.hasher.positions(key))
    }

    pub fn check_key(&self, key: &[u8]) -> Result<bool> {
        self.bitset.all_set(&self.hasher.positions(key))
    }

    /// Clears the key's probe positions. Keys whose positions overlap the
    /// removed key's stop reporting as present too.
    /// TODO: back the filter with per-position counters so removals cannot
    /// evict overlapping keys.
    pub fn remove_key(&mut self, key: &[u8]) -> Result<()> {
        self.bitset.remove_many(&self.hasher.positions(key))
    }
}

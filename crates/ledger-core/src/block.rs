use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::{encoding, pow};

/// One ledger record. `hash` commits to every other field and is refreshed
/// by the constructor and by mining, the only two places fields change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub data: Value,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

/// Result of a nonce search capped at a number of attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MineOutcome {
    Found { nonce: u64, attempts: u64 },
    Exhausted { attempts: u64 },
}

impl MineOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, MineOutcome::Found { .. })
    }

    pub fn attempts(&self) -> u64 {
        match self {
            MineOutcome::Found { attempts, .. } | MineOutcome::Exhausted { attempts } => *attempts,
        }
    }
}

impl Block {
    /// Build a block with nonce 0 and its hash already computed.
    pub fn new(
        index: u64,
        timestamp: impl Into<String>,
        data: impl Into<Value>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp: timestamp.into(),
            data: data.into(),
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Hex SHA-256 of the canonical encoding of everything except `hash`.
    pub fn calculate_hash(&self) -> String {
        let encoded = encoding::block_fields(
            self.index,
            &self.timestamp,
            &self.data,
            &self.previous_hash,
            self.nonce,
        );
        encoding::sha256_hex(encoded.as_bytes())
    }

    /// Whether the stored hash still matches the block's fields.
    pub fn is_hash_fresh(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        pow::meets_difficulty(&self.hash, difficulty)
    }

    /// Increment the nonce until the hash has `difficulty` leading zero hex
    /// characters. There is no attempt cap; a difficulty above 64 never
    /// terminates. Use [`Block::mine_bounded`] when a budget is needed.
    pub fn mine(&mut self, difficulty: u32) {
        self.search(difficulty, None);
    }

    /// Same search as [`Block::mine`], giving up after `max_attempts` nonce
    /// increments. The hash is fresh on return either way.
    pub fn mine_bounded(&mut self, difficulty: u32, max_attempts: u64) -> MineOutcome {
        self.search(difficulty, Some(max_attempts))
    }

    fn search(&mut self, difficulty: u32, max_attempts: Option<u64>) -> MineOutcome {
        let hasher = NonceHasher::new(self);
        // Fields may have been edited since the last hash; never test a stale one.
        self.hash = hasher.hash(self.nonce);
        let mut attempts = 0u64;
        while !pow::meets_difficulty(&self.hash, difficulty) {
            if max_attempts.is_some_and(|max| attempts >= max) {
                debug!(
                    index = self.index,
                    attempts, difficulty, "gave up mining block"
                );
                return MineOutcome::Exhausted { attempts };
            }
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = hasher.hash(self.nonce);
            attempts = attempts.saturating_add(1);
        }
        info!(index = self.index, nonce = self.nonce, "Block mined: {}", self.hash);
        MineOutcome::Found {
            nonce: self.nonce,
            attempts,
        }
    }
}

/// SHA-256 state primed with the fields that stay fixed while mining.
struct NonceHasher {
    base: Sha256,
    suffix: String,
}

impl NonceHasher {
    fn new(block: &Block) -> Self {
        let (prefix, suffix) = encoding::block_fields_around_nonce(
            block.index,
            &block.timestamp,
            &block.data,
            &block.previous_hash,
        );
        let mut base = Sha256::new();
        base.update(prefix.as_bytes());
        Self { base, suffix }
    }

    fn hash(&self, nonce: u64) -> String {
        let mut hasher = self.base.clone();
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(self.suffix.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Wall-clock seconds since the Unix epoch with a microsecond fraction.
pub fn now_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

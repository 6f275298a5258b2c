use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::block::{now_timestamp, Block, MineOutcome};
use crate::constants::{DEFAULT_DIFFICULTY, GENESIS_DATA, GENESIS_PREVIOUS_HASH, HASH_HEX_SIZE};
use crate::error::{ChainError, ValidationError, ValidationFailure};

/// Settings fixed for a chain's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    /// Leading zero hex characters required of every non-genesis hash.
    pub difficulty: u32,
    /// Nonce attempts allowed per appended block. `None` mines until found.
    pub max_mining_attempts: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_mining_attempts: None,
        }
    }
}

impl ChainConfig {
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ChainError> {
        if self.difficulty as usize > HASH_HEX_SIZE {
            return Err(ChainError::DifficultyOutOfRange {
                difficulty: self.difficulty,
                max: HASH_HEX_SIZE,
            });
        }
        Ok(())
    }
}

/// Append-only sequence of mined blocks rooted at an unmined genesis.
///
/// Appending takes `&mut self`, so a chain has exactly one writer. Sharing
/// one across threads needs an outer lock around `add_block`.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Chain {
    blocks: Vec<Block>,
    #[serde(skip)]
    config: ChainConfig,
}

impl Chain {
    pub fn new(config: ChainConfig) -> Result<Self, ChainError> {
        config.check()?;
        let chain = Self {
            blocks: vec![create_genesis()],
            config,
        };
        info!(difficulty = config.difficulty, "chain created");
        Ok(chain)
    }

    /// Adopt blocks from elsewhere, e.g. a JSON export. Nothing is checked
    /// beyond non-emptiness; call [`Chain::verify`] before trusting them.
    pub fn from_blocks(blocks: Vec<Block>, config: ChainConfig) -> Result<Self, ChainError> {
        config.check()?;
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(Self { blocks, config })
    }

    pub fn from_json(json: &str, config: ChainConfig) -> Result<Self, ChainError> {
        let blocks: Vec<Block> = serde_json::from_str(json)?;
        Self::from_blocks(blocks, config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ChainError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> Result<&Block, ChainError> {
        self.blocks.first().ok_or(ChainError::EmptyChain)
    }

    /// The current tip.
    pub fn latest(&self) -> Result<&Block, ChainError> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    /// Mine a block carrying `data` on top of the tip and append it.
    ///
    /// On a bounded chain an exhausted search returns
    /// [`ChainError::MiningExhausted`] and the chain is left untouched.
    pub fn add_block(&mut self, data: impl Into<Value>) -> Result<&Block, ChainError> {
        let previous_hash = self.latest()?.hash.clone();
        let index = self.blocks.len() as u64;
        let mut block = Block::new(index, now_timestamp(), data, previous_hash);

        match self.config.max_mining_attempts {
            None => block.mine(self.config.difficulty),
            Some(max) => {
                if let MineOutcome::Exhausted { attempts } =
                    block.mine_bounded(self.config.difficulty, max)
                {
                    return Err(ChainError::MiningExhausted { index, attempts });
                }
            }
        }

        self.blocks.push(block);
        self.latest()
    }

    /// True when every block passes [`Chain::verify`]. Failures are logged
    /// with the offending index and check.
    pub fn validate(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(err) => {
                warn!(index = err.index, kind = ?err.kind, "{err}");
                false
            }
        }
    }

    /// Walk the chain and report the first broken block.
    ///
    /// Genesis is checked for its `"0"` sentinel and hash consistency but not
    /// for proof of work. Every later block must carry a fresh hash, point at
    /// its predecessor, sit at its own position and meet the difficulty.
    pub fn verify(&self) -> Result<(), ValidationError> {
        let Some(genesis) = self.blocks.first() else {
            return Ok(());
        };
        if genesis.previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(ValidationError::new(0, ValidationFailure::GenesisPreviousHash));
        }
        if genesis.index != 0 {
            return Err(ValidationError::new(0, ValidationFailure::IndexMismatch));
        }
        if !genesis.is_hash_fresh() {
            return Err(ValidationError::new(0, ValidationFailure::HashMismatch));
        }

        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);
            let i = i + 1;
            if !curr.is_hash_fresh() {
                return Err(ValidationError::new(i, ValidationFailure::HashMismatch));
            }
            if curr.previous_hash != prev.hash {
                return Err(ValidationError::new(i, ValidationFailure::LinkageMismatch));
            }
            if curr.index != i as u64 {
                return Err(ValidationError::new(i, ValidationFailure::IndexMismatch));
            }
            if !curr.meets_difficulty(self.config.difficulty) {
                return Err(ValidationError::new(i, ValidationFailure::InsufficientWork));
            }
        }
        Ok(())
    }
}

/// Index 0, `"0"` predecessor, fixed payload. Not mined.
pub fn create_genesis() -> Block {
    let genesis = Block::new(0, now_timestamp(), GENESIS_DATA, GENESIS_PREVIOUS_HASH);
    debug!(hash = %genesis.hash, "genesis block created");
    genesis
}

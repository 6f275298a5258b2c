//! Append-only ledger of SHA-256 chained blocks with a proof-of-work
//! admission rule.
//!
//! A [`Chain`] starts from an unmined genesis block. Every later block
//! commits to its predecessor's hash and is mined until its own hash carries
//! `difficulty` leading zero hex characters. [`Chain::validate`] recomputes
//! every hash and checks the links.

pub mod block;
pub mod chain;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod pow;

pub use block::{Block, MineOutcome};
pub use chain::{Chain, ChainConfig};
pub use error::{ChainError, ValidationError, ValidationFailure};

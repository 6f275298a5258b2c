use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ledger_core::{
    constants::DEFAULT_DIFFICULTY, Block, Chain, ChainConfig, ChainError, MineOutcome,
};
use serde_json::{json, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Build, mine and verify a proof-of-work hash chain")]
struct Cli {
    /// Leading zero hex characters required of every mined block
    #[arg(long, global = true, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add two payment blocks, print every block and the validation result
    Demo,
    /// Mine a single block on top of a fresh genesis and print it
    Mine {
        /// JSON payload for the block
        #[arg(long)]
        data: String,
        /// Give up after this many nonce attempts
        #[arg(long)]
        max_attempts: Option<u64>,
    },
    /// Build a chain of numbered payloads and write it out as JSON
    Export {
        /// Blocks to append after genesis
        #[arg(long, default_value_t = 3)]
        blocks: u64,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check an exported chain
    Verify {
        /// JSON array of blocks, as written by `export`
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ChainConfig::with_difficulty(cli.difficulty);
    match cli.cmd {
        Command::Demo => demo(config),
        Command::Mine { data, max_attempts } => mine(config, &data, max_attempts),
        Command::Export { blocks, out } => export(config, blocks, out),
        Command::Verify { file } => verify(config, &file),
    }
}

fn demo(config: ChainConfig) -> Result<()> {
    let mut chain = Chain::new(config)?;
    chain.add_block(json!({"sender": "Alice", "receiver": "Bob", "amount": 50}))?;
    chain.add_block(json!({"sender": "Bob", "receiver": "Charlie", "amount": 50}))?;

    for block in chain.blocks() {
        println!("{}", serde_json::to_string_pretty(block)?);
    }
    println!("Blockchain valid? {}", chain.validate());
    Ok(())
}

fn mine(config: ChainConfig, data: &str, max_attempts: Option<u64>) -> Result<()> {
    let data: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
    let chain = Chain::new(config)?;
    let tip = chain.latest()?;
    let mut block = Block::new(1, ledger_core::block::now_timestamp(), data, tip.hash.clone());

    match max_attempts {
        None => block.mine(config.difficulty),
        Some(max) => {
            if let MineOutcome::Exhausted { attempts } = block.mine_bounded(config.difficulty, max)
            {
                return Err(ChainError::MiningExhausted {
                    index: block.index,
                    attempts,
                }
                .into());
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

fn export(config: ChainConfig, blocks: u64, out: Option<PathBuf>) -> Result<()> {
    let mut chain = Chain::new(config)?;
    for i in 1..=blocks {
        chain.add_block(json!({ "entry": i }))?;
    }
    let json = chain.to_json_pretty()?;
    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {} blocks to {}", chain.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn verify(config: ChainConfig, file: &Path) -> Result<()> {
    let json =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let chain = Chain::from_json(&json, config)?;
    match chain.verify() {
        Ok(()) => {
            println!("valid: {} blocks", chain.len());
            Ok(())
        }
        Err(err) => bail!("invalid: {err}"),
    }
}

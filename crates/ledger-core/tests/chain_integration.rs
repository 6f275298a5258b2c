use ledger_core::{
    pow, Block, Chain, ChainConfig, ChainError, ValidationError, ValidationFailure,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;

fn payments(rng: &mut StdRng, count: usize) -> Vec<serde_json::Value> {
    let names = ["Alice", "Bob", "Charlie", "Dave"];
    (0..count)
        .map(|_| {
            json!({
                "sender": names[rng.gen_range(0..names.len())],
                "receiver": names[rng.gen_range(0..names.len())],
                "amount": rng.gen_range(1..1_000u64),
            })
        })
        .collect()
}

#[test]
fn test_chain_build_and_validate() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut chain = Chain::new(ChainConfig::with_difficulty(2))?;
    for payload in payments(&mut rng, 10) {
        let block = chain.add_block(payload)?;
        assert!(pow::meets_difficulty(&block.hash, 2));
    }
    assert_eq!(chain.len(), 11);
    assert!(chain.validate());
    assert_eq!(chain.verify(), Ok(()));
    Ok(())
}

#[test]
fn test_chain_export_import() -> anyhow::Result<()> {
    let mut chain = Chain::new(ChainConfig::with_difficulty(1))?;
    chain.add_block(json!({"sender": "Alice", "receiver": "Bob", "amount": 50}))?;
    chain.add_block(json!({"sender": "Bob", "receiver": "Charlie", "amount": 50}))?;

    let exported = chain.to_json_pretty()?;
    let parsed: serde_json::Value = serde_json::from_str(&exported)?;
    assert_eq!(parsed.as_array().map(Vec::len), Some(3));
    assert_eq!(parsed[0]["previous_hash"], "0");
    assert_eq!(parsed[2]["previous_hash"], parsed[1]["hash"]);

    let imported = Chain::from_json(&exported, ChainConfig::with_difficulty(1))?;
    assert!(imported.validate());
    Ok(())
}

#[test]
fn test_imported_tamper_reported_at_index() -> anyhow::Result<()> {
    let mut chain = Chain::new(ChainConfig::with_difficulty(1))?;
    chain.add_block(json!({"sender": "Alice", "receiver": "Bob", "amount": 50}))?;
    chain.add_block(json!({"sender": "Bob", "receiver": "Charlie", "amount": 50}))?;

    let mut blocks: Vec<Block> = chain.blocks().to_vec();
    blocks[2].data = json!({"sender": "Bob", "receiver": "Mallory", "amount": 50});
    let forged = Chain::from_blocks(blocks, *chain.config())?;

    assert!(!forged.validate());
    assert_eq!(
        forged.verify(),
        Err(ValidationError::new(2, ValidationFailure::HashMismatch))
    );
    Ok(())
}

#[test]
fn test_import_checks_against_declared_difficulty() -> anyhow::Result<()> {
    let mut easy = Chain::new(ChainConfig::with_difficulty(0))?;
    for i in 0..20 {
        easy.add_block(json!(i))?;
    }
    let strict = Chain::from_blocks(easy.blocks().to_vec(), ChainConfig::with_difficulty(8))?;
    let err = strict.verify().unwrap_err();
    assert_eq!(err.kind, ValidationFailure::InsufficientWork);
    assert_eq!(err.index, 1);
    Ok(())
}

#[test]
fn test_bounded_chain_recovers_after_exhaustion() -> anyhow::Result<()> {
    let mut chain = Chain::new(ChainConfig {
        difficulty: 1,
        max_mining_attempts: Some(0),
    })?;
    let mut appended = 0;
    let mut exhausted = 0;
    for i in 0..64 {
        match chain.add_block(json!(i)) {
            Ok(_) => appended += 1,
            Err(ChainError::MiningExhausted { attempts: 0, .. }) => exhausted += 1,
            Err(err) => return Err(err.into()),
        }
    }
    assert_eq!(appended + exhausted, 64);
    assert_eq!(chain.len(), appended + 1);
    assert!(chain.validate());
    Ok(())
}

#[test]
fn test_malformed_json_import() {
    let err = Chain::from_json("not json", ChainConfig::default()).unwrap_err();
    assert!(matches!(err, ChainError::Json(_)));

    let err = Chain::from_json("[]", ChainConfig::default()).unwrap_err();
    assert!(matches!(err, ChainError::EmptyChain));
}

//! Deterministic byte encoding of the hashed block fields.
//!
//! Output is compact JSON with object keys sorted at every level. Sorting is
//! done here rather than relying on `serde_json::Map` ordering, which changes
//! when the `preserve_order` feature is switched on anywhere in the build.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Append the canonical form of `value` to `out`.
pub fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_str(key, out);
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Canonical encoding of the fields a block hash commits to. Keys appear in
/// lexicographic order: data, index, nonce, previous_hash, timestamp.
pub fn block_fields(
    index: u64,
    timestamp: &str,
    data: &Value,
    previous_hash: &str,
    nonce: u64,
) -> String {
    let (prefix, suffix) = block_fields_around_nonce(index, timestamp, data, previous_hash);
    format!("{prefix}{nonce}{suffix}")
}

/// The canonical block encoding split around the nonce, so a miner can
/// encode the fixed fields once and only format the nonce per attempt.
pub fn block_fields_around_nonce(
    index: u64,
    timestamp: &str,
    data: &Value,
    previous_hash: &str,
) -> (String, String) {
    let mut prefix = String::with_capacity(96);
    prefix.push_str("{\"data\":");
    write_canonical(data, &mut prefix);
    prefix.push_str(",\"index\":");
    prefix.push_str(&index.to_string());
    prefix.push_str(",\"nonce\":");

    let mut suffix = String::with_capacity(128);
    suffix.push_str(",\"previous_hash\":");
    write_json_str(previous_hash, &mut suffix);
    suffix.push_str(",\"timestamp\":");
    write_json_str(timestamp, &mut suffix);
    suffix.push('}');
    (prefix, suffix)
}

/// SHA-256 of `bytes`, rendered as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn write_json_str(s: &str, out: &mut String) {
    // Display on a string Value emits it quoted and escaped.
    out.push_str(&Value::String(s.to_owned()).to_string());
}

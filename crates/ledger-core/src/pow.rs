//! Difficulty checks over hex-rendered hashes.

/// Number of leading `'0'` characters in a hex hash.
pub fn count_leading_zero_hex(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
///
/// A difficulty longer than the hash itself is never satisfied.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    if difficulty > hash.len() {
        return false;
    }
    hash.as_bytes()[..difficulty].iter().all(|b| *b == b'0')
}

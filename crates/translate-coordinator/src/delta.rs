//! Minimal-suffix diffing between successive snapshots of a stream.

/// Longest-common-prefix diff: returns the suffix of `curr` beyond the
/// common prefix it shares with `prev`. Operates on `char` (Unicode scalar
/// value), not bytes, so a multi-byte code point is never split mid-sequence.
pub fn compute_delta(prev: &str, curr: &str) -> String {
    if prev.is_empty() {
        return curr.to_string();
    }
    if curr.is_empty() {
        return String::new();
    }

    let common = prev
        .chars()
        .zip(curr.chars())
        .take_while(|(a, b)| a == b)
        .count();

    match curr.char_indices().nth(common) {
        Some((byte_offset, _)) => curr[byte_offset..].to_string(),
        None => String::new(),
    }
}

/// Tracks the last-delivered snapshot of one text stream (original or
/// translation) and produces the delta against each new snapshot.
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    prev: String,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the delta against the last snapshot and remembers `curr` as
    /// the new baseline.
    pub fn update(&mut self, curr: &str) -> String {
        let delta = compute_delta(&self.prev, curr);
        self.prev = curr.to_string();
        delta
    }

    /// Forgets the last snapshot, so the next `update` returns the whole text.
    pub fn reset(&mut self) {
        self.prev.clear();
    }
}

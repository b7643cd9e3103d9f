//! C5 — releases translated finals strictly in sequence order regardless of
//! the order C4 finishes translating them.

use std::collections::BTreeMap;

use tracing::warn;

use crate::delta::compute_delta;
use crate::error::Error;
use crate::message::{MessageKind, OutboundMessage, TextBlock, now_unix_ms};

/// One completed (or failed) translation for a final, as handed off by C4.
#[derive(Debug, Clone)]
pub struct DispatchEntry {
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub translated_text: Option<String>,
}

/// `BTreeMap` keyed by sequence number so "does `next_to_emit` exist" is a
/// cheap lookup and draining in order is a contiguous-key walk, the same
/// shape `TranscriptAccumulator` uses for its per-channel state.
pub struct OrderedDispatcher {
    next_to_emit: u64,
    pending: BTreeMap<u64, DispatchEntry>,
    cap: usize,
}

impl OrderedDispatcher {
    pub fn new(cap: usize) -> Self {
        Self {
            next_to_emit: 0,
            pending: BTreeMap::new(),
            cap,
        }
    }

    /// Inserts `entry` at `sequence` and drains every now-contiguous prefix
    /// starting at `next_to_emit`, returning the `final` messages to deliver
    /// in order. Finals are whole-sentence atomic, so every delta here is
    /// computed against an empty previous snapshot — each message's delta
    /// always equals its full text.
    pub fn submit(
        &mut self,
        sequence: u64,
        entry: DispatchEntry,
    ) -> Result<Vec<OutboundMessage>, Error> {
        if !self.pending.contains_key(&sequence) && self.pending.len() >= self.cap {
            warn!(
                pending = self.pending.len(),
                cap = self.cap,
                next_to_emit = self.next_to_emit,
                "dispatch buffer overflow"
            );
            return Err(Error::DispatchOverflow {
                pending: self.pending.len(),
                cap: self.cap,
            });
        }
        self.pending.insert(sequence, entry);

        let mut ready = Vec::new();
        while let Some(entry) = self.pending.remove(&self.next_to_emit) {
            let original = TextBlock {
                full_text: entry.source_text.clone(),
                delta: compute_delta("", &entry.source_text),
                language: entry.source_lang,
            };
            let translation = entry.translated_text.map(|text| TextBlock {
                delta: compute_delta("", &text),
                full_text: text,
                language: entry.target_lang,
            });
            ready.push(OutboundMessage {
                kind: MessageKind::Final,
                original,
                translation,
                timestamp: now_unix_ms(),
            });
            self.next_to_emit += 1;
        }
        Ok(ready)
    }
}

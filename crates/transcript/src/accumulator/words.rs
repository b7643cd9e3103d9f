use owhisper_interface::stream::Word;

use crate::id::IdGenerator;
use crate::types::{PartialWord, RawWord, SpeakerHint, TranscriptWord};

// ── Partial stability tracking ────────────────────────────────────────────────

/// A partial word together with how many consecutive partial responses have
/// confirmed it at the same start time and with the same text.
///
/// The `consecutive_seen` counter is the primary input to
/// Used by `channel::ChannelState` to track stability of partial words.
#[derive(Debug, Clone)]
pub(crate) struct PartialEntry {
    pub(crate) word: RawWord,
    pub(crate) consecutive_seen: u32,
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Assemble raw ASR tokens into merged `RawWord`s.
///
/// The transcript string is the **sole oracle** for word boundaries within a
/// single response. `spacing_from_transcript` aligns each token to the
/// transcript; a space prefix means "new word", no space means "same word."
/// Adjacent tokens without a space prefix are unconditionally merged —
/// no timing heuristics.
pub(crate) fn assemble(raw: &[Word], transcript: &str, channel: i32) -> Vec<RawWord> {
    let spaced = spacing_from_transcript(raw, transcript);
    let mut result: Vec<RawWord> = Vec::new();

    for (w, text) in raw.iter().zip(&spaced) {
        let start_ms = (w.start * 1000.0).round() as i64;
        let end_ms = (w.end * 1000.0).round() as i64;

        let should_merge = !text.starts_with(' ') && result.last().is_some();

        if should_merge {
            let last = result.last_mut().unwrap();
            last.text.push_str(text);
            last.end_ms = end_ms;
            if last.speaker.is_none() {
                last.speaker = w.speaker;
            }
        } else {
            result.push(RawWord {
                text: text.clone(),
                start_ms,
                end_ms,
                channel,
                speaker: w.speaker,
            });
        }
    }

    result
}

/// Align each token to the transcript string and recover its spacing.
///
/// The transcript is the oracle: if a token is found in the transcript, the
/// whitespace between the previous match and this one is prepended verbatim.
/// If a token cannot be found (ASR/transcript mismatch), a space is forced
/// so it becomes a separate word — "unknown = word boundary."
fn spacing_from_transcript(raw: &[Word], transcript: &str) -> Vec<String> {
    let mut result = Vec::with_capacity(raw.len());
    let mut pos = 0;

    for w in raw {
        let text = w.punctuated_word.as_deref().unwrap_or(&w.word);
        let trimmed = text.trim();

        if trimmed.is_empty() {
            result.push(text.to_string());
            continue;
        }

        match transcript[pos..].find(trimmed) {
            Some(found) => {
                let abs = pos + found;
                result.push(format!("{}{trimmed}", &transcript[pos..abs]));
                pos = abs + trimmed.len();
            }
            None => {
                let mut fallback = text.to_string();
                if !fallback.starts_with(' ') {
                    fallback.insert(0, ' ');
                }
                result.push(fallback);
            }
        }
    }

    result
}

// ── Pipeline stages ───────────────────────────────────────────────────────────

/// Drop words already covered by the watermark (deduplication).
pub(super) fn dedup(words: Vec<RawWord>, watermark: i64) -> Vec<RawWord> {
    words
        .into_iter()
        .skip_while(|w| w.end_ms <= watermark)
        .collect()
}

/// Cross-response word boundary handling — the one place where a timing
/// heuristic is unavoidable, because no transcript spans both responses.
///
/// Holds back the last word of each finalized batch so it can be merged
/// with the first word of the next batch if the provider split a word
/// across responses (common with Korean particles, contractions, etc.).
pub(super) fn stitch(
    held: Option<RawWord>,
    mut words: Vec<RawWord>,
) -> (Vec<RawWord>, Option<RawWord>) {
    if words.is_empty() {
        return (held.into_iter().collect(), None);
    }

    if let Some(h) = held {
        if should_stitch(&h, &words[0]) {
            words[0] = merge_words(h, words[0].clone());
        } else {
            words.insert(0, h);
        }
    }

    let new_held = words.pop();
    (words, new_held)
}

/// Replace the time range covered by `incoming` within `existing`.
///
/// Kept as a standalone tested function; production code uses
/// [`splice_partials`] which adds stability-counter tracking.
#[allow(dead_code)]
pub(super) fn splice(existing: &[RawWord], incoming: Vec<RawWord>) -> Vec<RawWord> {
    let first_start = incoming.first().map_or(0, |w| w.start_ms);
    let last_end = incoming.last().map_or(0, |w| w.end_ms);

    existing
        .iter()
        .filter(|w| w.end_ms <= first_start)
        .cloned()
        .chain(incoming)
        .chain(existing.iter().filter(|w| w.start_ms >= last_end).cloned())
        .collect()
}

/// Remove partials that overlap with the finalized time range.
///
/// Kept as a standalone tested function; production code uses
/// [`strip_overlap_entries`] which operates on [`PartialEntry`].
#[allow(dead_code)]
pub(super) fn strip_overlap(partials: Vec<RawWord>, final_end: i64) -> Vec<RawWord> {
    partials
        .into_iter()
        .filter(|w| w.start_ms > final_end)
        .collect()
}

/// Splice incoming words into the partial entries list, updating stability
/// counters for unchanged words and resetting them for new/changed words.
///
/// A partial is "the same" if its `start_ms` and `text` match an existing
/// entry; in that case the `consecutive_seen` counter is incremented.
/// New or changed words start at 1.
pub(super) fn splice_partials(
    existing: &[PartialEntry],
    incoming: Vec<RawWord>,
) -> Vec<PartialEntry> {
    if incoming.is_empty() {
        return existing.to_vec();
    }

    let first_start = incoming.first().map_or(0, |w| w.start_ms);
    let last_end = incoming.last().map_or(0, |w| w.end_ms);

    let before = existing
        .iter()
        .filter(|e| e.word.end_ms <= first_start)
        .cloned();
    let after = existing
        .iter()
        .filter(|e| e.word.start_ms >= last_end)
        .cloned();

    let middle = incoming.into_iter().map(|word| {
        let consecutive_seen = existing
            .iter()
            .find(|e| e.word.start_ms == word.start_ms && e.word.text == word.text)
            .map_or(1, |e| e.consecutive_seen + 1);
        PartialEntry {
            word,
            consecutive_seen,
        }
    });

    before.chain(middle).chain(after).collect()
}

/// Remove partial entries whose start time falls within the finalized range.
pub(super) fn strip_overlap_entries(
    entries: Vec<PartialEntry>,
    final_end: i64,
) -> Vec<PartialEntry> {
    entries
        .into_iter()
        .filter(|e| e.word.start_ms > final_end)
        .collect()
}

// ── Word-level transforms ─────────────────────────────────────────────────────

pub(super) fn ensure_space_prefix_raw(w: &mut RawWord) {
    if !w.text.starts_with(' ') {
        w.text.insert(0, ' ');
    }
}

pub(crate) fn ensure_space_prefix_partial(w: &mut PartialWord) {
    if !w.text.starts_with(' ') {
        w.text.insert(0, ' ');
    }
}

fn should_stitch(tail: &RawWord, head: &RawWord) -> bool {
    !head.text.starts_with(' ') && (head.start_ms - tail.end_ms) <= 300
}

fn merge_words(mut left: RawWord, right: RawWord) -> RawWord {
    left.text.push_str(&right.text);
    left.end_ms = right.end_ms;
    if left.speaker.is_none() {
        left.speaker = right.speaker;
    }
    left
}

/// Convert finalized `RawWord`s into `TranscriptWord`s and `SpeakerHint`s.
///
/// IDs are generated by `id_gen`, ensuring space prefixes, and extracting
/// speaker associations.
pub(super) fn finalize_words(
    mut words: Vec<RawWord>,
    id_gen: &mut dyn IdGenerator,
) -> (Vec<TranscriptWord>, Vec<SpeakerHint>) {
    words.iter_mut().for_each(ensure_space_prefix_raw);

    let mut final_words = Vec::with_capacity(words.len());
    let mut hints = Vec::new();

    for w in words {
        let id = id_gen.next_id();
        let (word, hint) = w.to_final(id);
        final_words.push(word);
        if let Some(h) = hint {
            hints.push(h);
        }
    }

    (final_words, hints)
}

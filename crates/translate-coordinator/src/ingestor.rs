//! C1 — classifies raw STT hypotheses into interim snapshots and finalized
//! sentences, assigning sequence numbers as finals arrive.

/// One emission from the external STT collaborator.
#[derive(Debug, Clone)]
pub struct HypothesisEvent {
    pub text: String,
    pub is_final: bool,
    pub language: Option<String>,
}

/// One finalized, sequence-numbered utterance handed to C4.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub sequence: u64,
    pub source_text: String,
    pub source_lang: String,
}

/// What the Ingestor decided to do with an event, for the caller to act on.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// `text` was empty after trimming, or the event was otherwise malformed.
    Discarded,
    /// A non-final event identical to the last seen interim text.
    DuplicateInterim,
    /// A fresh interim snapshot to forward to C3.
    Interim { source_snapshot: String },
    /// A finalized sentence to forward to C4.
    Final(Sentence),
}

pub struct EventIngestor {
    next_sequence: u64,
    last_interim_text: String,
    default_source_lang: String,
}

impl EventIngestor {
    pub fn new(default_source_lang: impl Into<String>) -> Self {
        Self {
            next_sequence: 0,
            last_interim_text: String::new(),
            default_source_lang: default_source_lang.into(),
        }
    }

    /// Classifies one event. Mutates the ingestor's dedupe buffer and
    /// sequence counter; does not talk to C3/C4 itself — the caller (the
    /// session loop) drives those off the returned outcome.
    pub fn ingest(&mut self, event: HypothesisEvent) -> IngestOutcome {
        let trimmed = event.text.trim();
        if trimmed.is_empty() {
            return IngestOutcome::Discarded;
        }

        if !event.is_final {
            if trimmed == self.last_interim_text {
                return IngestOutcome::DuplicateInterim;
            }
            self.last_interim_text = trimmed.to_string();
            return IngestOutcome::Interim {
                source_snapshot: trimmed.to_string(),
            };
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.last_interim_text.clear();

        let source_lang = event
            .language
            .unwrap_or_else(|| self.default_source_lang.clone());

        IngestOutcome::Final(Sentence {
            sequence,
            source_text: trimmed.to_string(),
            source_lang,
        })
    }
}

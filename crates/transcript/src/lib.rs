mod accumulator;
mod processor;
mod types;
mod words;

pub use processor::TranscriptProcessor;
pub use types::{FinalizedWord, PartialWord, RawWord, SpeakerHint, TranscriptDelta, WordState};

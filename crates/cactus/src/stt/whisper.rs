use std::fmt;

use super::TranscribeOptions;

enum WhisperToken<'a> {
    StartOfPrev,
    Text(&'a str),
    StartOfTranscript,
    Language(&'a str),
    Transcribe,
    NoTimestamps,
}

impl fmt::Display for WhisperToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOfPrev => write!(f, "<|startofprev|>"),
            Self::Text(s) => write!(f, "{s}"),
            Self::StartOfTranscript => write!(f, "<|startoftranscript|>"),
            Self::Language(l) => write!(f, "<|{l}|>"),
            Self::Transcribe => write!(f, "<|transcribe|>"),
            Self::NoTimestamps => write!(f, "<|notimestamps|>"),
        }
    }
}

pub(super) fn build_whisper_prompt(options: &TranscribeOptions) -> String {
    let mut tokens: Vec<WhisperToken<'_>> = Vec::new();

    if let Some(p) = &options.initial_prompt {
        tokens.push(WhisperToken::StartOfPrev);
        tokens.push(WhisperToken::Text(p));
    }

    tokens.push(WhisperToken::StartOfTranscript);

    if let Some(lang) = &options.language {
        tokens.push(WhisperToken::Language(lang.iso639_code()));
    }

    tokens.push(WhisperToken::Transcribe);
    tokens.push(WhisperToken::NoTimestamps);

    tokens.iter().map(|t| t.to_string()).collect()
}

use serde::{Deserialize, Serialize};

/// A contiguous span of text plus the minimal suffix a consumer hasn't seen yet.
///
/// `delta` is always a suffix of `full_text` — UI consumers that missed earlier
/// updates can always fall back to rendering `full_text` in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TextBlock {
    pub full_text: String,
    pub delta: String,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Interim,
    Final,
}

/// The single shape this crate ever hands to a `DeliverySink`.
///
/// `translation` is `None` for an original-only interim update (non-sync
/// display mode) or when the translation call for that snapshot failed;
/// every `Final` message carries a non-`None` `translation` unless the
/// translation call itself failed, in which case the sink still receives
/// the original text so the UI never silently drops a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub original: TextBlock,
    pub translation: Option<TextBlock>,
    pub timestamp: u64,
}

pub(crate) fn now_unix_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .min(u64::MAX as u128) as u64
}

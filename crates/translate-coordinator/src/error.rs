#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("translation request failed: {0}")]
    Translation(String),
    #[error("translation request timed out")]
    TranslationTimeout,
    #[error("dispatch buffer overflow: {pending} pending, cap is {cap}")]
    DispatchOverflow { pending: usize, cap: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

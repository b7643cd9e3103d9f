//! C3 — debounces and translates the evolving interim source text, cancelling
//! superseded work so at most one interim translation is ever in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ConfigHandle;
use crate::delta::DeltaTracker;
use crate::error::Error;
use crate::message::{MessageKind, OutboundMessage, TextBlock, now_unix_ms};
use crate::sink::DeliverySink;
use crate::translator::TranslationService;

const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);

struct Inner {
    token: Option<CancellationToken>,
    translation_tracker: DeltaTracker,
}

/// Holds the per-session interim state: the cancellation handle for the
/// currently scheduled/in-flight task and the translation stream's
/// last-delivered snapshot. Cheaply cloned (like `ModelManager`) so the
/// spawned debounce task can hold its own handle without borrowing `self`.
pub struct InterimTranslator<T: TranslationService, S: DeliverySink + Clone> {
    config: ConfigHandle,
    translator: Arc<T>,
    sink: S,
    original_tracker: Arc<Mutex<DeltaTracker>>,
    inner: Arc<Mutex<Inner>>,
}

/// Hand-written because `#[derive(Clone)]` would add a spurious `T: Clone`
/// bound — `T` is only ever held behind `Arc`, the same reason
/// `ModelManager<M>` in this codebase's `llm-cactus` crate hand-writes its
/// own `Clone` impl instead of deriving it.
impl<T: TranslationService, S: DeliverySink + Clone> Clone for InterimTranslator<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            translator: Arc::clone(&self.translator),
            sink: self.sink.clone(),
            original_tracker: Arc::clone(&self.original_tracker),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TranslationService, S: DeliverySink + Clone> InterimTranslator<T, S> {
    /// `original_tracker` is shared with the session loop, which updates it
    /// directly for the non-sync-display-mode original-only emission; in
    /// sync display mode this translator is the only writer.
    pub fn new(
        config: ConfigHandle,
        translator: Arc<T>,
        sink: S,
        original_tracker: Arc<Mutex<DeltaTracker>>,
    ) -> Self {
        Self {
            config,
            translator,
            sink,
            original_tracker,
            inner: Arc::new(Mutex::new(Inner {
                token: None,
                translation_tracker: DeltaTracker::new(),
            })),
        }
    }

    /// Cancels whatever interim task is currently scheduled or in flight,
    /// without scheduling a new one. Called when a final arrives or when
    /// session teardown begins.
    pub async fn cancel(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(token) = inner.token.take() {
            token.cancel();
            debug!("interim translation cancelled");
        }
    }

    /// Resets the translation-stream delta baseline for the next sentence
    /// cycle. Called alongside `cancel()` when a final arrives.
    pub async fn reset_for_new_sentence(&self) {
        let mut inner = self.inner.lock().await;
        inner.translation_tracker.reset();
    }

    /// Supersedes any previously scheduled task and schedules a new one for
    /// `source_snapshot`.
    pub async fn submit(&self, source_snapshot: String) {
        let cfg = self.config.snapshot().await;
        let token = CancellationToken::new();
        {
            let mut inner = self.inner.lock().await;
            if let Some(old) = inner.token.replace(token.clone()) {
                old.cancel();
                debug!("interim translation superseded by a newer snapshot");
            }
        }

        let this = self.clone();
        tokio::spawn(async move {
            this.run(source_snapshot, cfg, token).await;
        });
    }

    async fn run(
        &self,
        source_snapshot: String,
        cfg: crate::config::RuntimeConfig,
        token: CancellationToken,
    ) {
        if cfg.interim_debounce_enabled {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_millis(cfg.debounce_ms)) => {}
            }
        }

        let texts = vec![source_snapshot.clone()];
        let translated = tokio::select! {
            _ = token.cancelled() => return,
            result = tokio::time::timeout(
                DEFAULT_TRANSLATE_TIMEOUT,
                self.translator.translate(&texts, &cfg.source_lang, &cfg.target_lang),
            ) => result,
        };

        let mut translated = match translated {
            Ok(Ok(texts)) => texts,
            Ok(Err(err)) => {
                warn!(error = %err, "interim translation failed");
                return;
            }
            Err(_elapsed) => {
                warn!(error = %Error::TranslationTimeout, "interim translation timed out");
                return;
            }
        };
        let Some(translated_text) = translated.pop() else {
            return;
        };

        // Everything past this point mutates the shared delta trackers, so
        // cancellation is checked once, immediately before the critical
        // section, and nothing after it awaits a lock that a superseding
        // submit() could race past — a cancelled task must never advance a
        // tracker to a snapshot the sink never receives.
        if token.is_cancelled() {
            return;
        }

        let (original_delta, original_full_text) = if cfg.sync_display_mode {
            let mut tracker = self.original_tracker.lock().await;
            (tracker.update(&source_snapshot), source_snapshot.clone())
        } else {
            // The original was already shown by the session loop's direct
            // emission; this update only carries the translation.
            (String::new(), source_snapshot.clone())
        };

        let translation_delta = {
            let mut inner = self.inner.lock().await;
            inner.translation_tracker.update(&translated_text)
        };

        let message = OutboundMessage {
            kind: MessageKind::Interim,
            original: TextBlock {
                full_text: original_full_text,
                delta: original_delta,
                language: cfg.source_lang.clone(),
            },
            translation: Some(TextBlock {
                full_text: translated_text,
                delta: translation_delta,
                language: cfg.target_lang.clone(),
            }),
            timestamp: now_unix_ms(),
        };

        let _ = self.sink.deliver(message).await;
    }
}

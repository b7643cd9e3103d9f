//! Session-level wiring: drives C1 and routes its output into C3/C4, holds
//! the shared original-interim delta tracker, and surfaces session-fatal
//! errors (dispatch overflow) to the caller.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::Instrument;

use crate::batch::BatchTranslator;
use crate::config::{ConfigHandle, RuntimeConfig};
use crate::delta::DeltaTracker;
use crate::error::Error;
use crate::ingestor::{EventIngestor, HypothesisEvent, IngestOutcome};
use crate::interim::InterimTranslator;
use crate::message::{MessageKind, OutboundMessage, TextBlock, now_unix_ms};
use crate::sink::DeliverySink;
use crate::translator::TranslationService;

const DEFAULT_DISPATCH_CAP: usize = 256;

pub fn session_span(session_id: &str) -> tracing::Span {
    tracing::info_span!("session", session_id = %session_id)
}

/// One coordinator instance per active session, per the system overview:
/// owns C1's classifier plus handles to C3 and C4, and the config this
/// session's components read from.
pub struct Coordinator<T: TranslationService, S: DeliverySink + Clone> {
    session_id: String,
    ingestor: Mutex<EventIngestor>,
    config: ConfigHandle,
    interim: InterimTranslator<T, S>,
    batch: BatchTranslator<T, S>,
    sink: S,
    original_tracker: Arc<Mutex<DeltaTracker>>,
    fatal: UnboundedReceiver<Error>,
}

impl<T: TranslationService, S: DeliverySink + Clone> Coordinator<T, S> {
    pub fn new(session_id: impl Into<String>, config: RuntimeConfig, translator: T, sink: S) -> Self {
        Self::with_dispatch_cap(session_id, config, translator, sink, DEFAULT_DISPATCH_CAP)
    }

    pub fn with_dispatch_cap(
        session_id: impl Into<String>,
        config: RuntimeConfig,
        translator: T,
        sink: S,
        dispatch_cap: usize,
    ) -> Self {
        let session_id = session_id.into();
        let default_source_lang = config.source_lang.clone();
        let config = ConfigHandle::new(config);
        let translator = Arc::new(translator);
        let original_tracker = Arc::new(Mutex::new(DeltaTracker::new()));
        let (fatal_tx, fatal_rx) = tokio::sync::mpsc::unbounded_channel();

        Self {
            ingestor: Mutex::new(EventIngestor::new(default_source_lang)),
            interim: InterimTranslator::new(
                config.clone(),
                Arc::clone(&translator),
                sink.clone(),
                Arc::clone(&original_tracker),
            ),
            batch: BatchTranslator::new(
                config.clone(),
                translator,
                sink.clone(),
                dispatch_cap,
                fatal_tx,
            ),
            config,
            sink,
            original_tracker,
            fatal: fatal_rx,
            session_id,
        }
    }

    pub fn config_handle(&self) -> ConfigHandle {
        self.config.clone()
    }

    /// Resolves once a session-fatal condition (currently only dispatch
    /// overflow) occurs. The caller's event loop should `select!` on this
    /// alongside the STT stream and begin teardown when it resolves.
    pub async fn next_fatal_error(&mut self) -> Option<Error> {
        self.fatal.recv().await
    }

    /// Drives the session off a lazy STT event stream (spec.md §6.1), feeding
    /// every event through [`Self::handle_event`] in arrival order until the
    /// stream ends or a session-fatal error is observed on `next_fatal_error`.
    /// Callers that already own their own read loop can call
    /// [`Self::handle_event`] directly instead.
    pub async fn run(&mut self, events: impl Stream<Item = HypothesisEvent>) {
        tokio::pin!(events);
        loop {
            tokio::select! {
                event = events.next() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => break,
                    }
                }
                fatal = self.fatal.recv() => {
                    if fatal.is_some() {
                        break;
                    }
                }
            }
        }
    }

    /// Feeds one STT hypothesis event through C1 and on into C3 or C4.
    pub async fn handle_event(&self, event: HypothesisEvent) {
        let span = session_span(&self.session_id);
        async {
            let outcome = { self.ingestor.lock().await.ingest(event) };
            match outcome {
                IngestOutcome::Discarded | IngestOutcome::DuplicateInterim => {}
                IngestOutcome::Interim { source_snapshot } => {
                    self.handle_interim(source_snapshot).await;
                }
                IngestOutcome::Final(sentence) => {
                    self.handle_final(sentence).await;
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn handle_interim(&self, source_snapshot: String) {
        let cfg = self.config.snapshot().await;

        if !cfg.sync_display_mode {
            let delta = {
                let mut tracker = self.original_tracker.lock().await;
                tracker.update(&source_snapshot)
            };
            let message = OutboundMessage {
                kind: MessageKind::Interim,
                original: TextBlock {
                    full_text: source_snapshot.clone(),
                    delta,
                    language: cfg.source_lang.clone(),
                },
                translation: None,
                timestamp: now_unix_ms(),
            };
            let _ = self.sink.deliver(message).await;
        }

        self.interim.submit(source_snapshot).await;
    }

    async fn handle_final(&self, sentence: crate::ingestor::Sentence) {
        self.interim.cancel().await;
        self.interim.reset_for_new_sentence().await;
        self.original_tracker.lock().await.reset();

        self.batch.enqueue(sentence).await;
    }

    /// Cancels interim work and the batch timer. In-flight translation
    /// requests are abandoned, not awaited; the sink stops being called
    /// once its owner drops it.
    pub async fn shutdown(&self) {
        self.interim.cancel().await;
        self.batch.shutdown().await;
    }
}

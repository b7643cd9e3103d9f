//! C4 — translates finalized sentences, choosing between an immediate
//! single-item call (empty queue) and bounded batching (backlog) depending
//! on arrival rate relative to translation latency.
//!
//! `enqueue` never blocks on a translation call: it only ever updates the
//! pending-batch bookkeeping under the mutex and, if the queue state calls
//! for it, spawns the single/batch translation as its own detached task —
//! otherwise a slow translation would stall the whole session's event loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ConfigHandle;
use crate::dispatcher::{DispatchEntry, OrderedDispatcher};
use crate::error::Error;
use crate::ingestor::Sentence;
use crate::sink::DeliverySink;
use crate::translator::TranslationService;

const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);

struct Inner {
    pending: Vec<Sentence>,
    in_flight: bool,
    timer_token: Option<CancellationToken>,
}

enum Action {
    RunSingle(Sentence),
    RunBatch(Vec<Sentence>),
    ArmTimer(CancellationToken),
    Wait,
}

/// Owns the pending-batch/timer/in-flight state behind a single mutex, per
/// the concurrency design's "one mutex guards the pending batch, the timer
/// handle, and the in-flight flag"; the translation call itself runs
/// outside the lock, on its own spawned task.
pub struct BatchTranslator<T: TranslationService, S: DeliverySink + Clone> {
    config: ConfigHandle,
    translator: Arc<T>,
    sink: S,
    dispatcher: Arc<Mutex<OrderedDispatcher>>,
    inner: Arc<Mutex<Inner>>,
    fatal: UnboundedSender<Error>,
}

/// Hand-written because `#[derive(Clone)]` would add a spurious `T: Clone`
/// bound — `T` is only ever held behind `Arc`, the same reason
/// `ModelManager<M>` in this codebase's `llm-cactus` crate hand-writes its
/// own `Clone` impl instead of deriving it.
impl<T: TranslationService, S: DeliverySink + Clone> Clone for BatchTranslator<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            translator: Arc::clone(&self.translator),
            sink: self.sink.clone(),
            dispatcher: Arc::clone(&self.dispatcher),
            inner: Arc::clone(&self.inner),
            fatal: self.fatal.clone(),
        }
    }
}

impl<T: TranslationService, S: DeliverySink + Clone> BatchTranslator<T, S> {
    /// `fatal` receives a single `Error::DispatchOverflow` if the dispatch
    /// buffer ever exceeds `dispatch_cap` — a session-ending condition the
    /// caller must observe and react to (stop feeding events, tear down).
    pub fn new(
        config: ConfigHandle,
        translator: Arc<T>,
        sink: S,
        dispatch_cap: usize,
        fatal: UnboundedSender<Error>,
    ) -> Self {
        Self {
            config,
            translator,
            sink,
            dispatcher: Arc::new(Mutex::new(OrderedDispatcher::new(dispatch_cap))),
            inner: Arc::new(Mutex::new(Inner {
                pending: Vec::new(),
                in_flight: false,
                timer_token: None,
            })),
            fatal,
        }
    }

    /// Aborts any armed batch-timeout timer. In-flight translation calls are
    /// abandoned, not awaited, per the teardown rules.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(token) = inner.timer_token.take() {
            token.cancel();
        }
    }

    pub async fn enqueue(&self, sentence: Sentence) {
        let cfg = self.config.snapshot().await;
        let action = {
            let mut inner = self.inner.lock().await;
            if !inner.in_flight && inner.pending.is_empty() {
                inner.in_flight = true;
                Action::RunSingle(sentence)
            } else {
                inner.pending.push(sentence);
                if inner.pending.len() >= cfg.batch_size {
                    if let Some(token) = inner.timer_token.take() {
                        token.cancel();
                    }
                    debug!(
                        batch_size = inner.pending.len(),
                        "batch flush triggered by size threshold"
                    );
                    Action::RunBatch(std::mem::take(&mut inner.pending))
                } else if inner.timer_token.is_none() {
                    let token = CancellationToken::new();
                    inner.timer_token = Some(token.clone());
                    Action::ArmTimer(token)
                } else {
                    Action::Wait
                }
            }
        };

        match action {
            Action::RunSingle(sentence) => {
                let this = self.clone();
                tokio::spawn(async move { this.run_single(sentence).await });
            }
            Action::RunBatch(batch) => {
                let this = self.clone();
                tokio::spawn(async move { this.run_batch(batch).await });
            }
            Action::ArmTimer(token) => self.spawn_timer(token, cfg.batch_timeout_ms),
            Action::Wait => {}
        }
    }

    fn spawn_timer(&self, token: CancellationToken, timeout_ms: u64) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                    let batch = {
                        let mut inner = this.inner.lock().await;
                        inner.timer_token = None;
                        std::mem::take(&mut inner.pending)
                    };
                    if !batch.is_empty() {
                        debug!(batch_size = batch.len(), "batch flush triggered by timer");
                        this.run_batch(batch).await;
                    }
                }
            }
        });
    }

    async fn run_single(&self, sentence: Sentence) {
        let cfg = self.config.snapshot().await;
        let translated = self.translate_one(&sentence, &cfg).await;
        if self
            .dispatch_results(vec![(sentence, translated)], &cfg)
            .await
            .is_ok()
        {
            self.continue_or_idle().await;
        }
    }

    async fn run_batch(&self, batch: Vec<Sentence>) {
        let cfg = self.config.snapshot().await;
        let texts: Vec<String> = batch.iter().map(|s| s.source_text.clone()).collect();

        let result = tokio::time::timeout(
            DEFAULT_TRANSLATE_TIMEOUT,
            self.translator
                .translate(&texts, &cfg.source_lang, &cfg.target_lang),
        )
        .await;

        let translated: Vec<Option<String>> = match result {
            Ok(Ok(outputs)) if outputs.len() == batch.len() => {
                outputs.into_iter().map(Some).collect()
            }
            Ok(Ok(_)) => {
                warn!("translation service returned a mismatched batch size");
                vec![None; batch.len()]
            }
            Ok(Err(err)) => {
                warn!(error = %user_facing_error(&err.to_string()), "batch translation failed");
                vec![None; batch.len()]
            }
            Err(_elapsed) => {
                warn!("batch translation timed out");
                vec![None; batch.len()]
            }
        };

        let paired: Vec<(Sentence, Option<String>)> = batch.into_iter().zip(translated).collect();
        if self.dispatch_results(paired, &cfg).await.is_ok() {
            self.continue_or_idle().await;
        }
    }

    async fn translate_one(
        &self,
        sentence: &Sentence,
        cfg: &crate::config::RuntimeConfig,
    ) -> Option<String> {
        let texts = vec![sentence.source_text.clone()];
        let result = tokio::time::timeout(
            DEFAULT_TRANSLATE_TIMEOUT,
            self.translator
                .translate(&texts, &cfg.source_lang, &cfg.target_lang),
        )
        .await;

        match result {
            Ok(Ok(mut outputs)) if !outputs.is_empty() => Some(outputs.remove(0)),
            Ok(Ok(_)) => None,
            Ok(Err(err)) => {
                warn!(error = %user_facing_error(&err.to_string()), "single-sentence translation failed");
                None
            }
            Err(_elapsed) => {
                warn!("single-sentence translation timed out");
                None
            }
        }
    }

    /// Submits every (sentence, translation) pair to the dispatcher in
    /// sequence order and delivers whatever it releases. Returns `Err` only
    /// on dispatch overflow, which is reported once on `fatal` and means the
    /// caller must stop: further queue progress after overflow is pointless.
    async fn dispatch_results(
        &self,
        pairs: Vec<(Sentence, Option<String>)>,
        cfg: &crate::config::RuntimeConfig,
    ) -> Result<(), Error> {
        for (sentence, translated_text) in pairs {
            let ready = {
                let mut dispatcher = self.dispatcher.lock().await;
                dispatcher.submit(
                    sentence.sequence,
                    DispatchEntry {
                        source_text: sentence.source_text,
                        source_lang: sentence.source_lang,
                        target_lang: cfg.target_lang.clone(),
                        translated_text,
                    },
                )
            };
            match ready {
                Ok(messages) => {
                    for message in messages {
                        let _ = self.sink.deliver(message).await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "dispatch buffer overflow, ending session");
                    let _ = self.fatal.send(err.clone_for_report());
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// After a translation call completes, decides whether to idle, keep
    /// waiting on the armed timer, or immediately flush a backlog that
    /// reached `batch_size` while the call was in flight.
    async fn continue_or_idle(&self) {
        let cfg = self.config.snapshot().await;
        let action = {
            let mut inner = self.inner.lock().await;
            if inner.pending.is_empty() {
                inner.in_flight = false;
                Action::Wait
            } else if inner.pending.len() >= cfg.batch_size {
                if let Some(token) = inner.timer_token.take() {
                    token.cancel();
                }
                debug!(
                    batch_size = inner.pending.len(),
                    "batch flush triggered by size threshold reached while previous call was in flight"
                );
                Action::RunBatch(std::mem::take(&mut inner.pending))
            } else if inner.timer_token.is_none() {
                let token = CancellationToken::new();
                inner.timer_token = Some(token.clone());
                Action::ArmTimer(token)
            } else {
                Action::Wait
            }
        };

        match action {
            Action::RunSingle(_) => unreachable!("continue_or_idle never produces RunSingle"),
            Action::RunBatch(batch) => self.run_batch(batch).await,
            Action::ArmTimer(token) => self.spawn_timer(token, cfg.batch_timeout_ms),
            Action::Wait => {}
        }
    }
}

impl Error {
    fn clone_for_report(&self) -> Error {
        match self {
            Error::DispatchOverflow { pending, cap } => Error::DispatchOverflow {
                pending: *pending,
                cap: *cap,
            },
            other => Error::Translation(other.to_string()),
        }
    }
}

/// Normalizes a raw provider error string into an operator-facing message,
/// so a timeout or a 429 reads clearly in logs instead of a raw transport
/// error.
fn user_facing_error(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("401") || lower.contains("unauthorized") {
        "authentication failed".to_string()
    } else if lower.contains("429") || lower.contains("rate limit") {
        "rate limit exceeded".to_string()
    } else if lower.contains("timed out") || lower.contains("timeout") {
        "connection timed out".to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::test_support::CollectingSink;
    use crate::translator::test_support::FakeTranslator;

    fn sentence(sequence: u64, text: &str) -> Sentence {
        Sentence {
            sequence,
            source_text: text.to_string(),
            source_lang: "en".to_string(),
        }
    }

    fn config_handle(batch_size: usize, batch_timeout_ms: u64) -> ConfigHandle {
        ConfigHandle::new(crate::config::RuntimeConfig {
            batch_size,
            batch_timeout_ms,
            ..Default::default()
        })
    }

    fn new_batch(
        cfg: ConfigHandle,
        translator: Arc<FakeTranslator>,
        sink: CollectingSink,
        cap: usize,
    ) -> (
        BatchTranslator<FakeTranslator, CollectingSink>,
        tokio::sync::mpsc::UnboundedReceiver<Error>,
    ) {
        let (fatal_tx, fatal_rx) = tokio::sync::mpsc::unbounded_channel();
        (
            BatchTranslator::new(cfg, translator, sink, cap, fatal_tx),
            fatal_rx,
        )
    }

    #[tokio::test]
    async fn empty_queue_translates_immediately_as_single_item() {
        let translator = Arc::new(FakeTranslator::new());
        let sink = CollectingSink::new();
        let (batch, _fatal) = new_batch(config_handle(3, 500), translator.clone(), sink.clone(), 256);

        batch.enqueue(sentence(0, "Hello")).await;
        tokio::task::yield_now().await;

        assert_eq!(translator.call_count(), 1);
        assert_eq!(translator.calls().await[0], vec!["Hello".to_string()]);
        let messages = sink.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].original.full_text, "Hello");
    }

    #[tokio::test(start_paused = true)]
    async fn backlog_coalesces_into_one_batch_call() {
        let translator = Arc::new(FakeTranslator::new().with_delay(Duration::from_millis(800)));
        let sink = CollectingSink::new();
        let (batch, _fatal) =
            new_batch(config_handle(3, 2_000), translator.clone(), sink.clone(), 256);

        batch.enqueue(sentence(0, "A")).await;
        tokio::task::yield_now().await;

        batch.enqueue(sentence(1, "B")).await;
        batch.enqueue(sentence(2, "C")).await;

        tokio::time::advance(Duration::from_millis(900)).await;
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_millis(2_200)).await;
        tokio::task::yield_now().await;

        assert_eq!(
            translator.call_count(),
            2,
            "one single-item call for A, one batch call for B+C"
        );
        let calls = translator.calls().await;
        assert_eq!(calls[0], vec!["A".to_string()]);
        assert_eq!(calls[1], vec!["B".to_string(), "C".to_string()]);

        let messages = sink.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].original.full_text, "A");
        assert_eq!(messages[1].original.full_text, "B");
        assert_eq!(messages[2].original.full_text, "C");
    }

    #[tokio::test(start_paused = true)]
    async fn batch_size_threshold_flushes_before_timeout() {
        let translator = Arc::new(FakeTranslator::new().with_delay(Duration::from_millis(500)));
        let sink = CollectingSink::new();
        let (batch, _fatal) =
            new_batch(config_handle(2, 5_000), translator.clone(), sink.clone(), 256);

        batch.enqueue(sentence(0, "A")).await;
        tokio::task::yield_now().await;

        batch.enqueue(sentence(1, "B")).await;
        batch.enqueue(sentence(2, "C")).await;
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        let calls = translator.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec!["B".to_string(), "C".to_string()]);
    }

    #[tokio::test]
    async fn translation_failure_dispatches_null_translation() {
        let translator = Arc::new(FakeTranslator::new().failing());
        let sink = CollectingSink::new();
        let (batch, _fatal) = new_batch(config_handle(3, 500), translator.clone(), sink.clone(), 256);

        batch.enqueue(sentence(0, "Hello")).await;
        tokio::task::yield_now().await;

        let messages = sink.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].original.full_text, "Hello");
        assert!(messages[0].translation.is_none());
    }

    #[tokio::test]
    async fn dispatch_overflow_is_reported_on_fatal_channel() {
        let translator = Arc::new(FakeTranslator::new());
        let sink = CollectingSink::new();
        // cap 1: the fast path dispatches seq 5 and advances next_to_emit to
        // 6; seq 7 then sits in `pending` alone under cap 1, which is fine,
        // but a further distinct out-of-order sequence pushes pending over
        // the cap.
        let (batch, mut fatal) = new_batch(config_handle(1, 500), translator.clone(), sink.clone(), 1);

        batch.enqueue(sentence(5, "skips ahead")).await;
        tokio::task::yield_now().await;
        batch.enqueue(sentence(9, "also skips ahead")).await;
        tokio::task::yield_now().await;
        batch.enqueue(sentence(12, "overflow")).await;
        tokio::task::yield_now().await;

        let err = fatal.try_recv().expect("overflow should have been reported");
        assert!(matches!(err, Error::DispatchOverflow { .. }));
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use translate_coordinator::{DeliverySink, OutboundMessage, Result, TranslationService};

/// A translation collaborator that answers deterministically, after an
/// optional artificial delay, recording every call it receives so a test
/// can assert exactly how many requests the coordinator issued.
#[derive(Clone)]
pub struct FakeTranslator {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    call_count: Arc<AtomicUsize>,
    delay: Duration,
    fail: bool,
    fail_on_call: Option<usize>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            fail: false,
            fail_on_call: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Fails only the Nth call (0-indexed), succeeding on every other one —
    /// used to check that one failed final doesn't affect the next.
    pub fn failing_on_call(mut self, index: usize) -> Self {
        self.fail_on_call = Some(index);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub async fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().await.clone()
    }
}

impl TranslationService for FakeTranslator {
    async fn translate(
        &self,
        texts: &[String],
        _source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>> {
        let call_index = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().await.push(texts.to_vec());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail || self.fail_on_call == Some(call_index) {
            return Err(translate_coordinator::Error::Translation(
                "fake failure".to_string(),
            ));
        }

        Ok(texts
            .iter()
            .map(|t| format!("[{target_lang}] {t}"))
            .collect())
    }
}

/// Like [`FakeTranslator`] but the artificial delay is looked up per-call by
/// the first text in the batch, so a test can make a long sentence's
/// translation outlast a short one's even though both go through the same
/// collaborator — modeling real-world per-sentence latency variance.
#[derive(Clone)]
pub struct VariableDelayTranslator {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    delays: Arc<std::collections::HashMap<String, Duration>>,
}

impl VariableDelayTranslator {
    pub fn new(delays: std::collections::HashMap<String, Duration>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            delays: Arc::new(delays),
        }
    }

    pub async fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().await.clone()
    }
}

impl TranslationService for VariableDelayTranslator {
    async fn translate(
        &self,
        texts: &[String],
        _source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>> {
        self.calls.lock().await.push(texts.to_vec());

        let delay = texts
            .first()
            .and_then(|t| self.delays.get(t))
            .copied()
            .unwrap_or(Duration::ZERO);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(texts
            .iter()
            .map(|t| format!("[{target_lang}] {t}"))
            .collect())
    }
}

/// Collects every message the coordinator hands to the sink, in delivery
/// order, for end-to-end scenario assertions.
#[derive(Clone, Default)]
pub struct CollectingSink {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().await.clone()
    }
}

impl DeliverySink for CollectingSink {
    async fn deliver(&self, message: OutboundMessage) -> Result<()> {
        self.messages.lock().await.push(message);
        Ok(())
    }
}

use std::future::Future;

use crate::Result;

/// The external translation collaborator. Implementations own their own
/// transport, credentials and retry policy beneath this call; this crate
/// treats every call as a single request/response round trip with a
/// per-request timeout applied by the caller (C3/C4), never by the
/// implementation itself.
///
/// `texts.len() == 1` for C3's interim calls and C4's empty-queue fast
/// path; `texts.len() > 1` for a flushed batch. Implementations MUST
/// return one translated string per input, in the same order.
pub trait TranslationService: Send + Sync + 'static {
    fn translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Mutex;

    use super::*;
    use crate::error::Error;

    /// Records every call it receives and answers deterministically,
    /// optionally after an artificial delay or with a forced failure —
    /// used by the timer-driven unit tests in `interim` and `batch`.
    #[derive(Clone)]
    pub struct FakeTranslator {
        calls: Arc<Mutex<Vec<Vec<String>>>>,
        call_count: Arc<AtomicUsize>,
        delay: std::time::Duration,
        fail: bool,
    }

    impl FakeTranslator {
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                call_count: Arc::new(AtomicUsize::new(0)),
                delay: std::time::Duration::ZERO,
                fail: false,
            }
        }

        pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn failing(mut self) -> Self {
            self.fail = true;
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
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().await.push(texts.to_vec());

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if self.fail {
                return Err(Error::Translation("fake failure".to_string()));
            }

            Ok(texts
                .iter()
                .map(|t| format!("[{target_lang}] {t}"))
                .collect())
        }
    }
}

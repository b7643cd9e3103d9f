//! End-to-end scenario tests (S1-S6) driving a [`Coordinator`] with a fake
//! [`TranslationService`] and asserting the exact sequence of outbound
//! messages, mirroring `transcribe-proxy`'s fixture-driven integration tests.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use common::{CollectingSink, FakeTranslator, VariableDelayTranslator};
use translate_coordinator::{ConfigUpdate, Coordinator, HypothesisEvent, MessageKind, RuntimeConfig};

fn interim(text: &str) -> HypothesisEvent {
    HypothesisEvent {
        text: text.to_string(),
        is_final: false,
        language: None,
    }
}

fn finalize(text: &str) -> HypothesisEvent {
    HypothesisEvent {
        text: text.to_string(),
        is_final: true,
        language: None,
    }
}

fn default_config() -> RuntimeConfig {
    RuntimeConfig {
        source_lang: "en".to_string(),
        target_lang: "zh".to_string(),
        debounce_ms: 500,
        batch_size: 3,
        batch_timeout_ms: 500,
        sync_display_mode: false,
        interim_debounce_enabled: true,
    }
}

/// S1: single sentence, no revision. The debounced interim translation never
/// fires because the final arrives and cancels it first.
#[tokio::test(start_paused = true)]
async fn s1_single_sentence_no_revision() {
    let translator = FakeTranslator::new();
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("s1", default_config(), translator.clone(), sink.clone());

    coordinator.handle_event(interim("Hello")).await;
    tokio::time::advance(Duration::from_millis(100)).await;
    coordinator.handle_event(interim("Hello world")).await;
    tokio::time::advance(Duration::from_millis(300)).await;
    coordinator.handle_event(finalize("Hello world")).await;

    tokio::time::advance(Duration::from_millis(200)).await;
    tokio::task::yield_now().await;

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 3, "two bare interims, one final");

    assert_eq!(messages[0].kind, MessageKind::Interim);
    assert_eq!(messages[0].original.full_text, "Hello");
    assert_eq!(messages[0].original.delta, "Hello");
    assert!(messages[0].translation.is_none());

    assert_eq!(messages[1].kind, MessageKind::Interim);
    assert_eq!(messages[1].original.full_text, "Hello world");
    assert_eq!(messages[1].original.delta, " world");
    assert!(messages[1].translation.is_none());

    assert_eq!(messages[2].kind, MessageKind::Final);
    assert_eq!(messages[2].original.full_text, "Hello world");
    assert_eq!(messages[2].original.delta, "Hello world");
    let translation = messages[2].translation.as_ref().expect("final must translate");
    assert_eq!(translation.full_text, "[zh] Hello world");
    assert_eq!(translation.delta, "[zh] Hello world");

    // The debounce window (500ms from t=400) never elapses before the final
    // cancels it, so the interim translator never calls out.
    assert_eq!(translator.call_count(), 1, "only the final issues a translation call");
}

/// S2: a revised interim followed immediately by its final. The final's
/// delta is computed against an empty baseline (fresh sentence), even though
/// the interim stream had already shown a shorter prefix.
#[tokio::test(start_paused = true)]
async fn s2_revision() {
    let translator = FakeTranslator::new();
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("s2", default_config(), translator.clone(), sink.clone());

    coordinator.handle_event(interim("今天会意")).await;
    tokio::time::advance(Duration::from_millis(50)).await;
    coordinator.handle_event(finalize("今天会议很重要")).await;

    tokio::time::advance(Duration::from_millis(200)).await;
    tokio::task::yield_now().await;

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].kind, MessageKind::Interim);
    assert_eq!(messages[0].original.delta, "今天会意");

    assert_eq!(messages[1].kind, MessageKind::Final);
    assert_eq!(messages[1].original.full_text, "今天会议很重要");
    assert_eq!(messages[1].original.delta, "今天会议很重要");
    let translation = messages[1].translation.as_ref().unwrap();
    assert_eq!(translation.delta, translation.full_text);
}

/// S3: three finals arriving within 50ms of each other while translation
/// takes 800ms. "A" goes out on the empty-queue fast path; "B" and "C"
/// coalesce into one batch call and are released back to back.
#[tokio::test(start_paused = true)]
async fn s3_backlog_batching() {
    let translator = FakeTranslator::new().with_delay(Duration::from_millis(800));
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("s3", default_config(), translator.clone(), sink.clone());

    coordinator.handle_event(finalize("A")).await;
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_millis(20)).await;
    coordinator.handle_event(finalize("B")).await;
    tokio::time::advance(Duration::from_millis(20)).await;
    coordinator.handle_event(finalize("C")).await;

    // Let A's single call (800ms) and B/C's batch-timeout flush (500ms after
    // the backlog started) plus its own 800ms call all settle.
    tokio::time::advance(Duration::from_millis(2_000)).await;
    tokio::task::yield_now().await;

    let calls = translator.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec!["A".to_string()]);
    assert_eq!(calls[1], vec!["B".to_string(), "C".to_string()]);

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].original.full_text, "A");
    assert_eq!(messages[1].original.full_text, "B");
    assert_eq!(messages[2].original.full_text, "C");
}

/// S4: two finals translate as separate calls (the first on the fast path,
/// the second as a size-1 batch flushed by its own timer) and the second
/// finishes before the first. The dispatcher still releases them strictly
/// in sequence order, back to back, once the first arrives.
#[tokio::test(start_paused = true)]
async fn s4_out_of_order_completion() {
    let long_text = "this sentence takes a while to translate";
    let short_text = "Hi";

    let mut delays = HashMap::new();
    delays.insert(long_text.to_string(), Duration::from_millis(1_000));
    delays.insert(short_text.to_string(), Duration::from_millis(50));
    let translator = VariableDelayTranslator::new(delays);
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("s4", default_config(), translator.clone(), sink.clone());

    // seq0: long sentence, dispatched immediately on the empty-queue path.
    coordinator.handle_event(finalize(long_text)).await;
    tokio::task::yield_now().await;

    // seq1: arrives while seq0 is in flight, so it queues behind a timer
    // armed for batch_timeout_ms (500ms) -- well inside seq0's 1000ms call.
    tokio::time::advance(Duration::from_millis(10)).await;
    coordinator.handle_event(finalize(short_text)).await;

    // The backlog timer fires (~500ms after seq1 queued) and seq1's batch
    // call (50ms) completes long before seq0's 1000ms call does.
    tokio::time::advance(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;

    assert!(
        sink.messages().await.is_empty(),
        "seq1 must not be released before seq0, even though it finished translating first"
    );

    // seq0 finishes; the dispatcher now releases seq0 and the already
    // buffered seq1 together, in order.
    tokio::time::advance(Duration::from_millis(500)).await;
    tokio::task::yield_now().await;

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].original.full_text, long_text);
    assert_eq!(messages[1].original.full_text, short_text);
}

/// S5: ten interim events land within one debounce window, then a final
/// arrives. The translation service is called exactly once, for the final.
#[tokio::test(start_paused = true)]
async fn s5_interim_debounce_suppression() {
    let translator = FakeTranslator::new();
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("s5", default_config(), translator.clone(), sink.clone());

    let snapshots = [
        "He", "Hel", "Hell", "Hello", "Hello ", "Hello w", "Hello wo", "Hello wor", "Hello worl",
        "Hello wo",
    ];
    for snapshot in snapshots {
        coordinator.handle_event(interim(snapshot)).await;
        tokio::time::advance(Duration::from_millis(30)).await;
        tokio::task::yield_now().await;
    }

    coordinator.handle_event(finalize("Hello world")).await;
    tokio::time::advance(Duration::from_millis(200)).await;
    tokio::task::yield_now().await;

    assert_eq!(translator.call_count(), 1);
    assert_eq!(translator.calls().await[0], vec!["Hello world".to_string()]);

    let messages = sink.messages().await;
    assert_eq!(messages.last().unwrap().kind, MessageKind::Final);
    assert!(messages.last().unwrap().translation.is_some());
    assert_eq!(
        messages.iter().filter(|m| m.kind == MessageKind::Interim).count(),
        snapshots.len(),
        "every distinct interim snapshot gets its own bare original-only emission"
    );
}

/// S6: the translation service fails on a final. The outbound final still
/// carries the original text with `translation: null`, sequencing continues
/// normally, and the next final is unaffected.
#[tokio::test(start_paused = true)]
async fn s6_translation_failure_on_final_is_graceful() {
    let translator = FakeTranslator::new().failing_on_call(0);
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("s6", default_config(), translator.clone(), sink.clone());

    coordinator.handle_event(finalize("First sentence")).await;
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_millis(50)).await;
    tokio::task::yield_now().await;

    coordinator.handle_event(finalize("Second sentence")).await;
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_millis(50)).await;
    tokio::task::yield_now().await;

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].original.full_text, "First sentence");
    assert!(messages[0].translation.is_none());

    assert_eq!(messages[1].original.full_text, "Second sentence");
    assert!(messages[1].translation.is_some());
}

/// Property 7: a config hot-swap mid-session never rewrites a translation
/// call already submitted, but the *next* interim translation and the next
/// flushed batch use the new target language.
#[tokio::test(start_paused = true)]
async fn property7_config_hot_swap_applies_to_next_interim_and_batch() {
    let translator = FakeTranslator::new();
    let sink = CollectingSink::new();
    let coordinator = Coordinator::new("p7", default_config(), translator.clone(), sink.clone());
    let config = coordinator.config_handle();

    // First final is dispatched and fully settles under the original "zh" target.
    coordinator.handle_event(finalize("First")).await;
    tokio::task::yield_now().await;

    config
        .update_translation_config(ConfigUpdate {
            target: Some("fr".to_string()),
            ..Default::default()
        })
        .await;

    // Second final is enqueued only after the swap, so it must pick up "fr".
    coordinator.handle_event(finalize("Second")).await;
    tokio::task::yield_now().await;

    // A fresh interim submitted after the swap must also translate into "fr".
    coordinator.handle_event(interim("Third")).await;
    tokio::time::advance(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;

    let messages = sink.messages().await;
    assert_eq!(
        messages.len(),
        4,
        "two finals, one bare interim, one debounced translated interim update"
    );

    assert_eq!(messages[0].original.full_text, "First");
    assert_eq!(
        messages[0].translation.as_ref().unwrap().full_text,
        "[zh] First",
        "already-enqueued work keeps using the target in effect when it was submitted"
    );

    assert_eq!(messages[1].original.full_text, "Second");
    assert_eq!(
        messages[1].translation.as_ref().unwrap().full_text,
        "[fr] Second",
        "the next flushed batch uses the swapped target"
    );

    assert_eq!(messages[2].kind, MessageKind::Interim);
    assert!(messages[2].translation.is_none(), "bare original-only emission");

    assert_eq!(messages[3].kind, MessageKind::Interim);
    assert_eq!(
        messages[3].translation.as_ref().unwrap().full_text,
        "[fr] Third",
        "the next interim translation uses the swapped target"
    );
}

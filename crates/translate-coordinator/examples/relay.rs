//! Exercises the coordinator end to end from the command line: reads
//! newline-delimited STT hypothesis events from stdin, feeds them through a
//! stand-in `TranslationService`, and prints every outbound message as JSON
//! on stdout. Mirrors `listener-core`'s `examples/cli.rs` — a thin demo
//! binary that lives alongside the crate it exercises rather than as a
//! separate workspace member.
//!
//! Input line shape (one JSON object per line):
//!   {"text": "Hello", "is_final": false}
//!   {"text": "Hello world", "is_final": true, "language": "en"}

use std::future::Future;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use translate_coordinator::{ChannelSink, Coordinator, Error, HypothesisEvent, Result, RuntimeConfig};

/// Tags each input with its target language instead of calling out to a real
/// translation provider, so this binary has no external dependencies beyond
/// its own stdin.
struct DemoTranslator;

impl translate_coordinator::TranslationService for DemoTranslator {
    fn translate(
        &self,
        texts: &[String],
        _source_lang: &str,
        target_lang: &str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send {
        let translated = texts
            .iter()
            .map(|t| format!("[{target_lang}] {t}"))
            .collect();
        async move { Ok(translated) }
    }
}

#[derive(Debug, Deserialize)]
struct DemoEvent {
    text: String,
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    language: Option<String>,
}

async fn run() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let (sink, mut outbound) = ChannelSink::new();
    let mut coordinator = Coordinator::new("relay-demo", config, DemoTranslator, sink);

    let printer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            println!("{}", serde_json::to_string(&message)?);
        }
        Result::Ok(())
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.map_err(Error::from)? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => {
                        let event: DemoEvent = serde_json::from_str(&line).map_err(Error::from)?;
                        coordinator.handle_event(HypothesisEvent {
                            text: event.text,
                            is_final: event.is_final,
                            language: event.language,
                        }).await;
                    }
                    None => break,
                }
            }
            fatal = coordinator.next_fatal_error() => {
                if let Some(err) = fatal {
                    return Err(err);
                }
            }
        }
    }

    coordinator.shutdown().await;
    drop(coordinator);
    let _ = printer.await;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
        .expect("failed to build tokio runtime");

    let code = match runtime.block_on(run()) {
        Ok(()) => 0,
        Err(Error::DispatchOverflow { pending, cap }) => {
            eprintln!("fatal: dispatch buffer overflow ({pending} pending, cap {cap})");
            2
        }
        Err(err) => {
            eprintln!("fatal: {err}");
            1
        }
    };
    std::process::exit(code);
}

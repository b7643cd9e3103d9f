//! Real-time streaming translation coordinator.
//!
//! Sits between a streaming STT source and a UI consumer: debounces and
//! translates interim hypotheses, adaptively batches finalized sentences
//! under backpressure, and releases translations strictly in arrival order
//! regardless of per-sentence translation latency. See [`Coordinator`] for
//! the session-level entry point.

mod batch;
mod config;
mod coordinator;
mod delta;
mod dispatcher;
mod error;
mod ingestor;
mod interim;
mod message;
mod sink;
mod translator;

pub use config::{ConfigHandle, ConfigUpdate, RuntimeConfig};
pub use coordinator::{Coordinator, session_span};
pub use delta::{DeltaTracker, compute_delta};
pub use error::{Error, Result};
pub use ingestor::{HypothesisEvent, IngestOutcome, Sentence};
pub use message::{MessageKind, OutboundMessage, TextBlock};
pub use sink::{ChannelSink, DeliverySink};
pub use translator::TranslationService;

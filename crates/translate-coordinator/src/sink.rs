use std::future::Future;

use crate::Result;
use crate::message::OutboundMessage;

/// The UI transport boundary. One `deliver` call per outbound message, in
/// the order C3 and C5 produce them — the sink itself never reorders or
/// buffers more than the one message in flight.
pub trait DeliverySink: Send + Sync + 'static {
    fn deliver(&self, message: OutboundMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Forwards every message onto an unbounded channel, mirroring the
/// listener app's `TuiRuntime`, which turns each lifecycle callback into a
/// channel send so the transport can live on its own task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: tokio::sync::mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelSink {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DeliverySink for ChannelSink {
    async fn deliver(&self, message: OutboundMessage) -> Result<()> {
        // The receiver may have been dropped during teardown; a send past
        // that point is not an error the coordinator needs to act on.
        let _ = self.tx.send(message);
        Ok(())
    }
}

//! Channel-backed transport for tests and local play.

use tokio::sync::mpsc;

use crate::protocol::{Event, Request};
use crate::transport::{Incoming, Inbound, Outbound};

/// Server-side request half.
pub struct InMemoryInbound {
    rx: mpsc::UnboundedReceiver<Request>,
}

/// Server-side event half.
pub struct InMemoryOutbound {
    tx: mpsc::UnboundedSender<Event>,
}

/// The client end of an in-memory connection.
pub struct InMemoryClient {
    tx: mpsc::UnboundedSender<Request>,
    rx: mpsc::UnboundedReceiver<Event>,
}

/// Create a connected pair: the server halves and the client end.
pub fn pair() -> (InMemoryInbound, InMemoryOutbound, InMemoryClient) {
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ev_tx, ev_rx) = mpsc::unbounded_channel();
    (
        InMemoryInbound { rx: req_rx },
        InMemoryOutbound { tx: ev_tx },
        InMemoryClient {
            tx: req_tx,
            rx: ev_rx,
        },
    )
}

#[async_trait::async_trait]
impl Inbound for InMemoryInbound {
    async fn recv(&mut self) -> anyhow::Result<Incoming> {
        self.rx
            .recv()
            .await
            .map(Incoming::Request)
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}

#[async_trait::async_trait]
impl Outbound for InMemoryOutbound {
    async fn send(&mut self, event: &Event) -> anyhow::Result<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }
}

impl InMemoryClient {
    pub fn send(&self, request: Request) -> anyhow::Result<()> {
        self.tx
            .send(request)
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    /// Next event, or `None` once the server side has gone away.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// An event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

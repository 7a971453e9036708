//! Connection halves used by the server session loop.
//!
//! A connection is split into an [`Inbound`] half that yields client
//! requests and an [`Outbound`] half that delivers events, so pushes from a
//! room can be written while the session is waiting on the next request.

use crate::protocol::{Event, Request};

/// One message read from the client.
#[derive(Debug)]
pub enum Incoming {
    Request(Request),
    /// A complete message whose body is not a valid request. The session
    /// rejects it and keeps reading.
    Malformed(anyhow::Error),
}

#[async_trait::async_trait]
pub trait Inbound: Send {
    /// Next message from the client. An error means the connection itself
    /// is unusable and ends the session.
    async fn recv(&mut self) -> anyhow::Result<Incoming>;
}

#[async_trait::async_trait]
pub trait Outbound: Send {
    async fn send(&mut self, event: &Event) -> anyhow::Result<()>;
}

pub mod in_memory;
pub mod tcp;

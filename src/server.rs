#![cfg(feature = "std")]
//! Per-connection sessions and the TCP accept loop.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::common::SideId;
use crate::config::ServerConfig;
use crate::protocol::{Event, Request};
use crate::registry::RoomRegistry;
use crate::room::Outbox;
use crate::transport::tcp::{self, FrameLimits};
use crate::transport::{Incoming, Inbound, Outbound};

/// Drive one client connection until it closes.
///
/// The side gets a fresh id and a `CONNECTED` event. Every request is routed
/// to the registry and answered through the same outbox that rooms push to,
/// so replies and pushes reach the client in the order they were produced.
/// A malformed request is answered with `REJECTED`; only a failed
/// connection ends the session.
pub async fn serve_connection<I, O>(registry: Arc<RoomRegistry>, mut inbound: I, mut outbound: O)
where
    I: Inbound,
    O: Outbound + 'static,
{
    let side = registry.new_side_id();
    let (outbox, mut events) = mpsc::unbounded_channel::<Event>();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(e) = outbound.send(&event).await {
                warn!("failed to deliver {} to client: {}", event.kind(), e);
                break;
            }
        }
    });

    let _ = outbox.send(Event::Connected { side_id: side });
    info!("side {} connected", side);

    loop {
        let request = match inbound.recv().await {
            Ok(Incoming::Request(request)) => request,
            Ok(Incoming::Malformed(e)) => {
                debug!("side {}: malformed request: {:#}", side, e);
                if outbox.send(Event::rejected(e)).is_err() {
                    break;
                }
                continue;
            }
            Err(e) => {
                debug!("side {} stopped reading: {}", side, e);
                break;
            }
        };
        if let Some(reply) = handle_request(&registry, side, &outbox, request).await {
            if outbox.send(reply).is_err() {
                break;
            }
        }
    }

    registry.disconnect(side).await;
    drop(outbox);
    let _ = writer.await;
    info!("side {} disconnected", side);
}

/// Route one request. Returns the direct reply, if the request has one.
pub async fn handle_request(
    registry: &RoomRegistry,
    side: SideId,
    outbox: &Outbox,
    request: Request,
) -> Option<Event> {
    let result = match request {
        Request::UserPref { name, opponent } => registry
            .create_or_join(side, &name, opponent, outbox.clone())
            .await
            .map(|(_, data)| Some(data)),
        Request::SetupShips {
            room_id,
            ship,
            row,
            col,
            axis,
        } => registry
            .place_vessel(room_id, side, &ship.name, ship.length, row, col, axis)
            .await
            .map(|placement| {
                Some(Event::ValidPlacement {
                    accepted: placement.accepted,
                    user: placement.user,
                })
            }),
        Request::StartGame { room_id } => registry
            .mark_ready(room_id, side)
            .await
            .map(|started| (!started).then_some(Event::ConnectedAndWaiting { room_id })),
        Request::FireShot { room_id, row, col } => {
            registry.fire(room_id, side, row, col).await.map(|()| None)
        }
        Request::Reset { room_id } => registry.abandon(room_id, side).await.map(|()| None),
    };
    match result {
        Ok(reply) => reply,
        Err(e) => {
            debug!("side {}: request rejected: {:#}", side, e);
            Some(Event::rejected(e))
        }
    }
}

/// Accept TCP connections forever, one session task per connection.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    info!("listening on {}", listener.local_addr()?);
    serve(listener, Arc::new(RoomRegistry::new(config.room, config.seed))).await
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, registry: Arc<RoomRegistry>) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("accepted connection from {}", peer);
        let (inbound, outbound) = tcp::split(stream, FrameLimits::default());
        tokio::spawn(serve_connection(Arc::clone(&registry), inbound, outbound));
    }
}

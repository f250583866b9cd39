//! RTMP accept loop: for each connection, attach a fresh [`Bridge`] to a
//! [`ServerSession`] and drive it to completion.

use std::net::SocketAddr;
use std::sync::Arc;

use hylan_context::Context;
use hylan_registry::{EventBus, Session, StreamRegistry, Task};
use hylan_rtmp::ServerSession;
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::bridge::{Bridge, finalize_session};

const VHOST: &str = "localhost";

/// Binds `addr` and accepts connections until `ctx` is cancelled.
pub async fn run(
    ctx: Context,
    addr: SocketAddr,
    registry: Arc<StreamRegistry>,
    bus: Arc<EventBus>,
    task: Arc<Task>,
    packet_ring_size: u64,
    key_ring_size: u64,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "rtmp listener bound");

    loop {
        let (stream, peer_addr) = tokio::select! {
            biased;
            _ = ctx.done() => {
                tracing::debug!("rtmp listener stopping, context cancelled");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(%err, "failed to accept tcp connection");
                    continue;
                }
            },
        };

        tracing::debug!(%peer_addr, "accepted rtmp connection");

        let (session_ctx, session_handler) = ctx.new_child();
        let registry = registry.clone();
        let bus = bus.clone();
        let task = task.clone();

        tokio::spawn(
            async move {
                let on_time = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);

                let registry_session = Arc::new(Session::new(VHOST, on_time, session_ctx.clone()));
                let (outbound_tx, outbound_rx) = tokio::sync::mpsc::unbounded_channel();
                registry_session.attach_outbound(outbound_tx).await;

                let bridge = Bridge::new(
                    session_ctx.clone(),
                    registry.clone(),
                    bus.clone(),
                    task.clone(),
                    registry_session.clone(),
                    VHOST,
                    packet_ring_size,
                    key_ring_size,
                );

                let server_session = ServerSession::new(stream, bridge)
                    .with_context(session_ctx.clone())
                    .with_outbound(outbound_rx);

                if let Err(err) = server_session.run().await {
                    tracing::warn!(%err, "session ended with error");
                }

                finalize_session(&registry, &bus, &session_ctx, &registry_session).await;
                drop(session_handler);
            }
            .instrument(tracing::info_span!("session", addr = %peer_addr)),
        );
    }

    Ok(())
}

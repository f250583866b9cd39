//! Adapts `hylan_rtmp`'s [`SessionHandler`] callbacks onto the stream
//! registry: publish/play requests become `Stream`s and sinks, media
//! messages become `Packet`s pushed into the publisher's cache.

use std::sync::Arc;

use hylan_amf0::Amf0Value;
use hylan_context::Context;
use hylan_registry::{EventBus, EventKind, EventPayload, Packet, RegistryError, Session, Stream, StreamRegistry, Task, dispatch};
use hylan_rtmp::{ServerSessionError, SessionData, SessionHandler};

fn handler_error(err: RegistryError) -> ServerSessionError {
    ServerSessionError::Handler(Box::new(err))
}

/// One RTMP connection's view of the registry: the vhost it was accepted
/// under, its ring sizing, and the `Session` it drives through publish/play.
pub struct Bridge {
    ctx: Context,
    registry: Arc<StreamRegistry>,
    bus: Arc<EventBus>,
    task: Arc<Task>,
    session: Arc<Session>,
    vhost: String,
    packet_ring_size: u64,
    key_ring_size: u64,
}

impl Bridge {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: Context,
        registry: Arc<StreamRegistry>,
        bus: Arc<EventBus>,
        task: Arc<Task>,
        session: Arc<Session>,
        vhost: impl Into<String>,
        packet_ring_size: u64,
        key_ring_size: u64,
    ) -> Self {
        Self {
            ctx,
            registry,
            bus,
            task,
            session,
            vhost: vhost.into(),
            packet_ring_size,
            key_ring_size,
        }
    }
}

impl SessionHandler for Bridge {
    async fn on_publish(&mut self, stream_id: u32, app_name: &str, stream_name: &str) -> Result<(), ServerSessionError> {
        let cache = self
            .session
            .classify_source(app_name, stream_name, self.packet_ring_size, self.key_ring_size)
            .await
            .map_err(handler_error)?;

        let base = self.session.base().await;
        let stream = Arc::new(Stream::new(self.session.clone(), cache));

        if !self
            .registry
            .register_source(&self.vhost, &base.name, self.session.clone(), stream)
            .await
        {
            self.session.close().ok();
            return Err(handler_error(RegistryError::AlreadyPublishing));
        }

        tracing::info!(stream_id, vhost = %self.vhost, app = app_name, name = %base.name, "stream published");

        let _ = self.bus.push(
            EventKind::SessionCreated,
            self.ctx.clone(),
            EventPayload::SessionCreated {
                base,
                session: self.session.clone(),
            },
            3,
        );

        Ok(())
    }

    async fn on_unpublish(&mut self, stream_id: u32) -> Result<(), ServerSessionError> {
        tracing::info!(stream_id, session_id = self.session.id, "stream unpublished");
        finalize_session(&self.registry, &self.bus, &self.ctx, &self.session).await;
        Ok(())
    }

    async fn on_data(&mut self, _stream_id: u32, data: SessionData) -> Result<(), ServerSessionError> {
        let packet = match data {
            SessionData::Video { timestamp, data } => Packet::from_video(0, timestamp, data),
            SessionData::Audio { timestamp, data } => Packet::from_audio(0, timestamp, data),
            SessionData::Amf0 { timestamp, data } => Packet::from_metadata(0, timestamp, data),
        };

        // Media arriving before a publish handshake is the peer's mistake, not
        // a protocol error this session needs to die for.
        if let Err(err) = self.session.push(packet) {
            tracing::debug!(session_id = self.session.id, %err, "dropped media: wrong role");
        }

        Ok(())
    }

    async fn on_play(&mut self, stream_id: u32, values: Vec<Amf0Value<'static>>) -> Result<(), ServerSessionError> {
        let Some(stream_key) = play_stream_key(&values) else {
            return Ok(());
        };

        // `connect`'s app name never reaches `SessionHandler` (it's consumed
        // internally by `ServerSession::on_command_connect`), so a sink's
        // `StreamBase.app` is left blank. The registry never keys on `app`,
        // only `(vhost, name)`, so this doesn't affect lookup or fan-out.
        self.session.classify_sink("", &stream_key).await;
        let base = self.session.base().await;

        let Some(stream) = self.registry.register_sink(&self.vhost, &base.name, self.session.clone()).await else {
            return Err(handler_error(RegistryError::NoSuchStream));
        };

        tracing::info!(stream_id, vhost = %self.vhost, name = %base.name, "sink attached");
        dispatch::spawn_sink(&self.task, self.session.clone(), stream);

        let _ = self.bus.push(
            EventKind::SessionCreated,
            self.ctx.clone(),
            EventPayload::SessionCreated {
                base,
                session: self.session.clone(),
            },
            3,
        );

        Ok(())
    }
}

/// Pulls the stream key (name, possibly `name?a=1&b=2`) out of a `play`
/// command's positional arguments, per legacy RTMP spec 7.2.2.1: the first
/// argument is the stream name.
fn play_stream_key(values: &[Amf0Value<'static>]) -> Option<String> {
    match values.first()? {
        Amf0Value::String(s) => Some(s.to_string()),
        _ => None,
    }
}

/// Closes `session` and, only on the call that actually performs that
/// transition, removes it from `registry` and announces `SessionDeleted`.
/// Safe to call more than once for the same session (e.g. once from an
/// explicit `deleteStream` and again after the connection's read loop
/// exits) — `Session::close` is the idempotency gate.
pub async fn finalize_session(registry: &StreamRegistry, bus: &EventBus, ctx: &Context, session: &Arc<Session>) {
    if session.close().is_ok() {
        registry.delete(session.id).await;
        let _ = bus.push(
            EventKind::SessionDeleted,
            ctx.clone(),
            EventPayload::SessionDeleted { session: session.clone() },
            3,
        );
        tracing::debug!(session_id = session.id, "session finalized");
    }
}

//! One live connection, in either the source or sink role.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use bytes::{BufMut, Bytes, BytesMut};
use hylan_context::Context;
use hylan_ring::{PacketCache, ReaderState};
use hylan_rtmp::OutboundFrame;
use hylan_rtmp::messages::MessageType;
use tokio::sync::{Mutex, RwLock, mpsc};

use crate::base::{Classification, StreamBase};
use crate::error::RegistryError;
use crate::packet::Packet;
use crate::stat::{Stat, StatSnapshot};
use crate::stream::Stream;

/// Chunk stream id conventionally used for video messages. Not part of the
/// wire format's requirements, just a stable id this server always uses.
const CHUNK_STREAM_ID_VIDEO: u32 = 4;
/// Chunk stream id conventionally used for audio messages.
const CHUNK_STREAM_ID_AUDIO: u32 = 5;
/// Chunk stream id conventionally used for User Control events.
const CHUNK_STREAM_ID_USER_CONTROL: u32 = 2;

/// One live connection: its identity, role, statistics, and — depending on
/// role — its packet cache (source) or its feed into the RTMP codec's write
/// loop (sink).
pub struct Session {
    pub id: u64,
    base: RwLock<StreamBase>,
    classification: std::sync::Mutex<Classification>,
    stat: Stat,
    cache: OnceLock<Arc<PacketCache<Packet>>>,
    outbound_tx: Mutex<Option<mpsc::UnboundedSender<OutboundFrame>>>,
    frame_counter: AtomicU64,
    closed: AtomicBool,
    ctx: Context,
}

impl Session {
    pub fn new(vhost: impl Into<String>, on_time: u64, ctx: Context) -> Self {
        let base = StreamBase::new(vhost, on_time);
        Self {
            id: base.id,
            base: RwLock::new(base),
            classification: std::sync::Mutex::new(Classification::Unknown),
            stat: Stat::new(),
            cache: OnceLock::new(),
            outbound_tx: Mutex::new(None),
            frame_counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            ctx,
        }
    }

    pub fn classification(&self) -> Classification {
        *self.classification.lock().unwrap()
    }

    pub fn set_classification(&self, classification: Classification) {
        *self.classification.lock().unwrap() = classification;
    }

    pub async fn base(&self) -> StreamBase {
        self.base.read().await.clone()
    }

    /// Marks this session as the source of `app`/`stream_key`, creating its
    /// packet cache. Fails if already classified.
    pub async fn classify_source(
        &self,
        app: impl Into<String>,
        stream_key: &str,
        packet_ring_size: u64,
        key_ring_size: u64,
    ) -> Result<Arc<PacketCache<Packet>>, RegistryError> {
        {
            let mut base = self.base.write().await;
            base.populate(app, stream_key, Classification::Source);
        }
        self.set_classification(Classification::Source);
        self.stat.set_running(true);

        let cache = Arc::new(PacketCache::new(packet_ring_size, key_ring_size)?);
        // classify_source is only ever called once per session by construction
        // of the publish handshake, so this can't already be set.
        let _ = self.cache.set(cache.clone());
        Ok(cache)
    }

    /// Marks this session as a sink of `app`/`stream_key`.
    pub async fn classify_sink(&self, app: impl Into<String>, stream_key: &str) {
        let mut base = self.base.write().await;
        base.populate(app, stream_key, Classification::Sink);
        drop(base);
        self.set_classification(Classification::Sink);
        self.stat.set_running(true);
    }

    /// Attaches the sender half of the channel a [`hylan_rtmp::ServerSession`]
    /// is reading outbound frames from via `with_outbound`.
    pub async fn attach_outbound(&self, tx: mpsc::UnboundedSender<OutboundFrame>) {
        *self.outbound_tx.lock().await = Some(tx);
    }

    pub fn stat_snapshot(&self) -> StatSnapshot {
        self.stat.snapshot()
    }

    /// Pushes a packet into this session's cache. Fails with [`RegistryError::WrongRole`]
    /// unless this session is a classified source.
    pub fn push(&self, mut packet: Packet) -> Result<(), RegistryError> {
        let cache = self.cache.get().ok_or(RegistryError::WrongRole)?;
        packet.frame_index = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        self.stat.record(&packet);
        cache.push(packet);
        Ok(())
    }

    /// Pulls the next packet for this session from `stream`'s shared cache.
    /// Fails with [`RegistryError::WrongRole`] unless this session is a
    /// classified sink. Returns `Ok(None)` once the cache closes or this
    /// session's context is cancelled.
    pub async fn pull(&self, stream: &Stream, reader: &ReaderState) -> Result<Option<Packet>, RegistryError> {
        if self.classification() != Classification::Sink {
            return Err(RegistryError::WrongRole);
        }

        let packet = tokio::select! {
            biased;
            _ = self.ctx.done() => None,
            packet = stream.cache().pull(reader, &self.ctx) => packet,
        };

        Ok(packet)
    }

    /// Drives this sink's fan-out loop against `stream`'s cache until the
    /// cache closes, the context is cancelled, or a write fails. Removes
    /// itself from `stream` on exit.
    pub async fn sink(self: &Arc<Self>, stream: Arc<Stream>) {
        if self.classification() != Classification::Sink {
            tracing::warn!(session_id = self.id, "sink() called on a non-sink session");
            return;
        }

        if self.send(stream_begin_frame()).await.is_err() {
            stream.remove_sink(self.id);
            return;
        }

        let reader = ReaderState::new();

        loop {
            let packet = match self.pull(&stream, &reader).await {
                Ok(Some(packet)) => packet,
                Ok(None) | Err(_) => break,
            };

            self.stat.record(&packet);

            if self.send(packet_to_frame(&packet)).await.is_err() {
                tracing::debug!(session_id = self.id, "sink write failed, removing");
                break;
            }
        }

        stream.remove_sink(self.id);
        self.stat.set_running(false);
    }

    async fn send(&self, frame: OutboundFrame) -> Result<(), RegistryError> {
        let guard = self.outbound_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => tx.send(frame).map_err(|_| RegistryError::AlreadyClosed),
            None => Err(RegistryError::AlreadyClosed),
        }
    }

    /// Idempotent. Closes the session's cache (if a source, unblocking any
    /// sink pulling from it) and marks the session not running. Returns
    /// [`RegistryError::AlreadyClosed`] if already closed.
    pub fn close(&self) -> Result<(), RegistryError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(RegistryError::AlreadyClosed);
        }

        if let Some(cache) = self.cache.get() {
            cache.close();
        }
        self.stat.set_running(false);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Builds the `Stream Begin` User Control Message event announcing media is
/// about to start on stream id 0, matching the wire shape in
/// `user_control_messages::EventMessageStreamBegin::write`.
fn stream_begin_frame() -> OutboundFrame {
    let mut data = BytesMut::with_capacity(6);
    data.put_u16(0); // EventType::StreamBegin
    data.put_u32(0); // stream id
    OutboundFrame {
        chunk_stream_id: CHUNK_STREAM_ID_USER_CONTROL,
        msg_stream_id: 0,
        msg_type_id: MessageType::UserControlEvent,
        timestamp: 0,
        payload: data.freeze(),
    }
}

fn packet_to_frame(packet: &Packet) -> OutboundFrame {
    use crate::packet::MediaType;

    let (chunk_stream_id, msg_type_id) = match packet.media_type {
        MediaType::Video => (CHUNK_STREAM_ID_VIDEO, MessageType::Video),
        MediaType::Audio => (CHUNK_STREAM_ID_AUDIO, MessageType::Audio),
        MediaType::Metadata => (CHUNK_STREAM_ID_VIDEO, MessageType::DataAMF0),
    };

    OutboundFrame {
        chunk_stream_id,
        msg_stream_id: 0,
        msg_type_id,
        timestamp: packet.timestamp,
        payload: payload_bytes(packet),
    }
}

fn payload_bytes(packet: &Packet) -> Bytes {
    packet.data.clone()
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_requires_source_classification() {
        let (ctx, _h) = Context::new();
        let session = Session::new("localhost", 0, ctx);
        let packet = Packet::from_video(0, 0, Bytes::from_static(&[0x17]));
        assert!(matches!(session.push(packet), Err(RegistryError::WrongRole)));
    }

    #[tokio::test]
    async fn classify_source_then_push_succeeds() {
        let (ctx, _h) = Context::new();
        let session = Session::new("localhost", 0, ctx);
        session.classify_source("live", "demo", 8, 4).await.unwrap();

        let packet = Packet::from_video(0, 0, Bytes::from_static(&[0x17]));
        assert!(session.push(packet).is_ok());
        assert_eq!(session.stat_snapshot().video_pkt_num, 1);
    }

    #[test]
    fn close_is_idempotent() {
        let (ctx, _h) = Context::new();
        let session = Session::new("localhost", 0, ctx);
        assert!(session.close().is_ok());
        assert!(matches!(session.close(), Err(RegistryError::AlreadyClosed)));
    }

    #[tokio::test]
    async fn pull_requires_sink_classification() {
        let (ctx, _h) = Context::new();
        let source = Arc::new(Session::new("localhost", 0, ctx.clone()));
        source.classify_source("live", "demo", 8, 4).await.unwrap();
        let cache = source.cache.get().unwrap().clone();
        let stream = Stream::new(source, cache);

        let sink = Session::new("localhost", 0, ctx);
        let reader = ReaderState::new();
        assert!(matches!(sink.pull(&stream, &reader).await, Err(RegistryError::WrongRole)));
    }
}

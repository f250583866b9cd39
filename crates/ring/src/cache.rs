//! Key-frame-aware packet cache used to fan a source's media out to sinks
//! that may attach at any point in the stream's lifetime.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use hylan_context::Context;

use crate::ring::{INITIAL_CURSOR, Ring};

/// Anything the packet cache needs to know in order to decide whether a
/// packet is a catch-up point for a new sink.
pub trait CachedPacket: Clone + Send + Sync + 'static {
    /// True for packets a new sink can safely start decoding from.
    fn is_key_frame(&self) -> bool;
}

/// Default packet ring capacity.
pub const DEFAULT_PACKET_RING_SIZE: u64 = 1024;
/// Default key-frame ring capacity.
pub const DEFAULT_KEY_RING_SIZE: u64 = 16;

/// How long a [`PacketCache::pull`] backs off before retrying an empty
/// non-blocking read.
const EMPTY_BACKOFF: Duration = Duration::from_millis(100);

/// Per-sink state tracking progress through a [`PacketCache`].
///
/// Every sink owns one of these; the cache itself (and its two rings) is
/// shared read-only, since each `ReaderState` carries its own cursor into
/// the shared slots rather than contending over one on the ring.
pub struct ReaderState {
    packet_cursor: AtomicU64,
    key_cursor: AtomicU64,
    key_sent: AtomicBool,
}

impl ReaderState {
    pub fn new() -> Self {
        Self {
            packet_cursor: AtomicU64::new(INITIAL_CURSOR),
            key_cursor: AtomicU64::new(INITIAL_CURSOR),
            key_sent: AtomicBool::new(false),
        }
    }
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a large linear packet ring and a small key-frame ring, so a newly
/// attached sink can jump straight to the most recent key frame instead of
/// replaying (or missing) everything since the source started.
pub struct PacketCache<T> {
    packet_ring: Ring<T>,
    key_ring: Ring<u64>,
}

impl<T: CachedPacket> PacketCache<T> {
    /// Creates a cache with the given packet and key-frame ring capacities.
    pub fn new(packet_ring_size: u64, key_ring_size: u64) -> Result<Self, crate::error::RingError> {
        Ok(Self {
            packet_ring: Ring::new(packet_ring_size)?,
            key_ring: Ring::new(key_ring_size)?,
        })
    }

    /// Pushes a packet into the cache, additionally recording its cache
    /// index in the key ring if it is a key frame. Returns the assigned
    /// cache index.
    pub fn push(&self, packet: T) -> u64 {
        let is_key = packet.is_key_frame();
        let index = self.packet_ring.push(packet);
        if is_key {
            self.key_ring.push(index);
        }
        index
    }

    /// Closes both rings, unblocking any sink currently pulling.
    pub fn close(&self) {
        self.packet_ring.close();
        self.key_ring.close();
    }

    /// Pulls the next packet for a sink, catching it up to the most recent
    /// key frame on its first call. Backs off and retries on an empty read,
    /// observing `ctx` for cancellation between attempts.
    ///
    /// Returns `None` once the cache is closed and drained, or if `ctx` is
    /// cancelled while waiting.
    pub async fn pull(&self, reader: &ReaderState, ctx: &Context) -> Option<T> {
        loop {
            if !reader.key_sent.load(Ordering::Acquire) {
                tokio::select! {
                    biased;
                    _ = ctx.done() => return None,
                    key_index = self.key_ring.pull(&reader.key_cursor, true) => {
                        let Some(key_index) = key_index else { return None };
                        reader.packet_cursor.store(key_index, Ordering::Release);
                        reader.key_sent.store(true, Ordering::Release);
                    }
                }
            }

            match self.packet_ring.try_pull(&reader.packet_cursor) {
                Some(packet) => return Some(packet),
                None => {
                    if self.packet_ring.is_closed() {
                        return None;
                    }

                    tokio::select! {
                        biased;
                        _ = ctx.done() => return None,
                        _ = tokio::time::sleep(EMPTY_BACKOFF) => {}
                    }
                }
            }
        }
    }
}

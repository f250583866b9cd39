//! Per-session running statistics, exposed read-only through the HTTP
//! inspection surface.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

use serde::Serialize;

use crate::packet::{MediaType, Packet};

/// A point-in-time copy of a [`Stat`], safe to serialize.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatSnapshot {
    pub init: bool,
    pub video_pkt_num: u64,
    pub audio_pkt_num: u64,
    pub video_codec: u8,
    pub audio_codec: u8,
    pub is_running: bool,
}

/// Running counters for one session.
#[derive(Default)]
pub struct Stat {
    init: AtomicBool,
    video_pkt_num: AtomicU64,
    audio_pkt_num: AtomicU64,
    video_codec: AtomicU8,
    audio_codec: AtomicU8,
    is_running: AtomicBool,
}

impl Stat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, running: bool) {
        self.is_running.store(running, Ordering::Release);
    }

    /// Updates the relevant counters and codec id for a packet this session
    /// just sent or received.
    pub fn record(&self, packet: &Packet) {
        self.init.store(true, Ordering::Release);
        match packet.media_type {
            MediaType::Video => {
                self.video_pkt_num.fetch_add(1, Ordering::Relaxed);
                if let crate::packet::PacketHeader::Video { codec, .. } = &packet.header {
                    self.video_codec.store(*codec, Ordering::Relaxed);
                }
            }
            MediaType::Audio => {
                self.audio_pkt_num.fetch_add(1, Ordering::Relaxed);
                if let crate::packet::PacketHeader::Audio { codec, .. } = &packet.header {
                    self.audio_codec.store(*codec, Ordering::Relaxed);
                }
            }
            MediaType::Metadata => {}
        }
    }

    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            init: self.init.load(Ordering::Acquire),
            video_pkt_num: self.video_pkt_num.load(Ordering::Relaxed),
            audio_pkt_num: self.audio_pkt_num.load(Ordering::Relaxed),
            video_codec: self.video_codec.load(Ordering::Relaxed),
            audio_codec: self.audio_codec.load(Ordering::Relaxed),
            is_running: self.is_running.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn record_updates_counts_and_marks_init() {
        let stat = Stat::new();
        let pkt = Packet::from_video(0, 0, Bytes::from_static(&[0x17]));
        stat.record(&pkt);

        let snap = stat.snapshot();
        assert!(snap.init);
        assert_eq!(snap.video_pkt_num, 1);
        assert_eq!(snap.audio_pkt_num, 0);
    }
}

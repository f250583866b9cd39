//! One media unit moving through a source's cache.

use bytes::Bytes;
use hylan_ring::CachedPacket;

/// Which kind of payload a [`Packet`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
    Metadata,
}

/// Video frame type, taken from the top nibble of the FLV `VIDEODATA` tag's
/// first byte. `I` frames are the only safe catch-up points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    I,
    P,
    B,
}

/// Per-media-type header info split out of the raw payload.
#[derive(Debug, Clone)]
pub enum PacketHeader {
    Video { frame_type: FrameType, codec: u8, tag: u8 },
    Audio { codec: u8, tag: u8 },
    Metadata,
}

/// One media unit, as stored in a source's [`hylan_ring::PacketCache`].
#[derive(Debug, Clone)]
pub struct Packet {
    /// Monotonic within the publishing session.
    pub frame_index: u64,
    /// Assigned by the ring on push; `0` until it has been.
    pub cache_index: u64,
    pub media_type: MediaType,
    pub timestamp: u32,
    pub data: Bytes,
    pub header: PacketHeader,
}

impl Packet {
    /// Builds a packet from a raw FLV-tag-shaped payload, inferring the
    /// header from the first byte the way `AUDIODATA`/`VIDEODATA` tags do.
    pub fn from_video(frame_index: u64, timestamp: u32, data: Bytes) -> Self {
        let first = data.first().copied().unwrap_or(0);
        let frame_type = match first >> 4 {
            1 | 4 => FrameType::I,
            2 => FrameType::P,
            _ => FrameType::B,
        };
        Self {
            frame_index,
            cache_index: 0,
            media_type: MediaType::Video,
            timestamp,
            header: PacketHeader::Video { frame_type, codec: first & 0x0F, tag: first },
            data,
        }
    }

    pub fn from_audio(frame_index: u64, timestamp: u32, data: Bytes) -> Self {
        let first = data.first().copied().unwrap_or(0);
        Self {
            frame_index,
            cache_index: 0,
            media_type: MediaType::Audio,
            timestamp,
            header: PacketHeader::Audio { codec: first >> 4, tag: first },
            data,
        }
    }

    pub fn from_metadata(frame_index: u64, timestamp: u32, data: Bytes) -> Self {
        Self {
            frame_index,
            cache_index: 0,
            media_type: MediaType::Metadata,
            timestamp,
            header: PacketHeader::Metadata,
            data,
        }
    }

    pub fn is_key_frame(&self) -> bool {
        matches!(self.header, PacketHeader::Video { frame_type: FrameType::I, .. })
    }
}

impl CachedPacket for Packet {
    fn is_key_frame(&self) -> bool {
        Packet::is_key_frame(self)
    }
}

//! The RTMP chunk stream.
//!
//! Defined by:
//! - Legacy RTMP spec, section 5.3

use bytes::Bytes;

use crate::messages::MessageType;

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{ChunkReadError, ChunkWriteError};
pub use reader::ChunkReader;
pub use writer::ChunkWriter;

/// The chunk size both sides start out assuming before either side sends
/// `Set Chunk Size`.
pub const INIT_CHUNK_SIZE: usize = 128;

/// Chunk stream ID reserved for protocol control messages and commands sent
/// on the connection itself (stream ID 0).
pub const CHUNK_STREAM_ID_COMMAND: u32 = 3;

/// The format of a chunk's basic + message header, as carried by the first
/// two bits of the basic header.
///
/// Defined by:
/// - Legacy RTMP spec, 5.3.1.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChunkType {
    /// Full message header (11 bytes).
    Type0 = 0,
    /// Same stream ID as previous chunk on this csid (7 bytes).
    Type1 = 1,
    /// Same stream ID and message length as previous chunk (3 bytes).
    Type2 = 2,
    /// No message header; reuses the previous chunk's header entirely.
    Type3 = 3,
}

impl TryFrom<u8> for ChunkType {
    type Error = error::ChunkReadError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Type0),
            1 => Ok(Self::Type1),
            2 => Ok(Self::Type2),
            3 => Ok(Self::Type3),
            other => Err(error::ChunkReadError::InvalidChunkType(other)),
        }
    }
}

/// Basic header: chunk type and chunk stream ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBasicHeader {
    pub chunk_stream_id: u32,
}

/// Message header fields carried (fully or partially) by a chunk, merged
/// with whatever was cached from a previous chunk on the same csid.
///
/// Defined by:
/// - Legacy RTMP spec, 5.3.1.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMessageHeader {
    pub timestamp: u32,
    pub msg_length: u32,
    pub msg_type_id: MessageType,
    pub msg_stream_id: u32,
}

impl ChunkMessageHeader {
    /// The 3-byte timestamp field is a sentinel once it reaches `0xFFFFFF`;
    /// the real value is then carried in a following 4-byte extended
    /// timestamp field.
    pub fn is_extended_timestamp(&self) -> bool {
        self.timestamp >= 0xFFFFFF
    }
}

/// A complete, reassembled RTMP message delivered as one chunk stream unit.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub basic_header: ChunkBasicHeader,
    pub message_header: ChunkMessageHeader,
    pub payload: Bytes,
}

impl Chunk {
    pub fn new(chunk_stream_id: u32, timestamp: u32, msg_type_id: MessageType, msg_stream_id: u32, payload: Bytes) -> Self {
        Self {
            basic_header: ChunkBasicHeader { chunk_stream_id },
            message_header: ChunkMessageHeader {
                timestamp,
                msg_length: payload.len() as u32,
                msg_type_id,
                msg_stream_id,
            },
            payload,
        }
    }
}

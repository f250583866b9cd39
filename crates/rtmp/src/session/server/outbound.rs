//! Media frames pushed into a running [`super::ServerSession`] from outside
//! its own read/reply loop, so a session playing back someone else's stream
//! can write without owning a second handle to the connection.

use bytes::Bytes;

use crate::messages::MessageType;

/// One outbound media message, queued for the next time the session's
/// drive loop is free to write.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    /// Chunk stream id to send on.
    pub chunk_stream_id: u32,
    /// RTMP message stream id the frame belongs to.
    pub msg_stream_id: u32,
    /// Message type (audio/video/data).
    pub msg_type_id: MessageType,
    /// Presentation timestamp, in milliseconds.
    pub timestamp: u32,
    /// Encoded message payload.
    pub payload: Bytes,
}

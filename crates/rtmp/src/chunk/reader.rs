//! Reassembling chunks back into [`Chunk`]s.

use std::collections::HashMap;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{Buf, BytesMut};

use super::error::ChunkReadError;
use super::{Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType, INIT_CHUNK_SIZE};
use crate::messages::MessageType;

/// Upper bound on distinct chunk stream IDs tracked at once. A well-behaved
/// client uses a handful; this just keeps a hostile one from growing the
/// header cache without bound.
const MAX_CHUNK_STREAMS: usize = 256;

/// Upper bound on messages being assembled concurrently across all chunk
/// streams.
const MAX_PARTIAL_CHUNKS: usize = 64;

/// Upper bound on a single message's payload size.
const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
struct StreamHeader {
    header: ChunkMessageHeader,
    extended_timestamp: bool,
    timestamp_delta: u32,
}

struct PartialMessage {
    header: ChunkMessageHeader,
    extended_timestamp: bool,
    payload: BytesMut,
}

/// Reassembles the chunk stream back into whole [`Chunk`]s.
///
/// One [`ChunkReader`] is used per connection; it tracks the previous chunk
/// header and any in-progress message per chunk stream ID, per
/// Legacy RTMP spec, 5.3.2.
pub struct ChunkReader {
    max_chunk_size: usize,
    previous_headers: HashMap<u32, StreamHeader>,
    partials: HashMap<u32, PartialMessage>,
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self {
            max_chunk_size: INIT_CHUNK_SIZE,
            previous_headers: HashMap::new(),
            partials: HashMap::new(),
        }
    }
}

impl ChunkReader {
    /// Updates the maximum chunk size as negotiated by a `Set Chunk Size`
    /// protocol control message. Returns `false` if the new size is invalid.
    pub fn update_max_chunk_size(&mut self, chunk_size: usize) -> bool {
        if chunk_size == 0 {
            return false;
        }

        self.max_chunk_size = chunk_size;
        true
    }

    /// Reads as many chunks as needed from `buf` to assemble and return the
    /// next complete [`Chunk`], leaving any unconsumed bytes in `buf` for the
    /// next call. Returns `Ok(None)` when `buf` doesn't yet hold a full
    /// chunk; the caller should read more data and call again.
    pub fn read_chunk(&mut self, buf: &mut BytesMut) -> Result<Option<Chunk>, ChunkReadError> {
        loop {
            let Some((csid, fmt, consumed)) = self.peek_basic_header(buf)? else {
                return Ok(None);
            };

            let header_len = self.message_header_len(fmt, csid)?;
            let Some(extended) = self.peek_is_extended(buf, consumed, fmt, csid)? else {
                return Ok(None);
            };
            let ext_len = if extended { 4 } else { 0 };

            let Some(remaining_in_message) = self.remaining_in_message(buf, consumed, fmt, csid)? else {
                return Ok(None);
            };
            let payload_len = remaining_in_message.min(self.max_chunk_size);

            let total_len = consumed + header_len + ext_len + payload_len;
            if buf.len() < total_len {
                return Ok(None);
            }

            let mut cursor = std::io::Cursor::new(&buf[..total_len]);
            cursor.set_position(consumed as u64);

            let header = self.read_message_header(&mut cursor, fmt, csid, extended)?;
            let payload_start = consumed + header_len + ext_len;
            let payload = buf[payload_start..total_len].to_vec();

            buf.advance(total_len);

            let message = self.accumulate(csid, header, extended, payload)?;

            if let Some(chunk) = message {
                return Ok(Some(chunk));
            }
        }
    }

    /// Reads the basic header (1-3 bytes) without consuming `buf`. Returns
    /// `(csid, fmt, bytes_consumed)`.
    fn peek_basic_header(&self, buf: &[u8]) -> Result<Option<(u32, ChunkType, usize)>, ChunkReadError> {
        let Some(&first) = buf.first() else { return Ok(None) };

        let fmt = ChunkType::try_from(first >> 6)?;
        let basic_csid = first & 0b0011_1111;

        match basic_csid {
            0 => {
                if buf.len() < 2 {
                    return Ok(None);
                }
                Ok(Some((buf[1] as u32 + 64, fmt, 2)))
            }
            1 => {
                if buf.len() < 3 {
                    return Ok(None);
                }
                let csid = buf[1] as u32 + buf[2] as u32 * 256 + 64;
                Ok(Some((csid, fmt, 3)))
            }
            csid => Ok(Some((csid as u32, fmt, 1))),
        }
    }

    fn message_header_len(&self, fmt: ChunkType, csid: u32) -> Result<usize, ChunkReadError> {
        match fmt {
            ChunkType::Type0 => Ok(11),
            ChunkType::Type1 => Ok(7),
            ChunkType::Type2 => Ok(3),
            ChunkType::Type3 => {
                if !self.previous_headers.contains_key(&csid) {
                    return Err(ChunkReadError::MissingPreviousChunkHeader(csid));
                }
                Ok(0)
            }
        }
    }

    /// Peeks whether this chunk carries an extended timestamp field, without
    /// consuming `buf`. Returns `None` if not enough data is buffered yet to
    /// know.
    fn peek_is_extended(
        &self,
        buf: &[u8],
        basic_len: usize,
        fmt: ChunkType,
        csid: u32,
    ) -> Result<Option<bool>, ChunkReadError> {
        match fmt {
            ChunkType::Type0 | ChunkType::Type1 | ChunkType::Type2 => {
                let ts_offset = basic_len;
                if buf.len() < ts_offset + 3 {
                    return Ok(None);
                }
                let ts = u32::from_be_bytes([0, buf[ts_offset], buf[ts_offset + 1], buf[ts_offset + 2]]);
                Ok(Some(ts >= 0xFFFFFF))
            }
            ChunkType::Type3 => {
                let extended = self
                    .previous_headers
                    .get(&csid)
                    .ok_or(ChunkReadError::MissingPreviousChunkHeader(csid))?
                    .extended_timestamp;
                Ok(Some(extended))
            }
        }
    }

    /// Returns how many payload bytes remain in the message this chunk belongs
    /// to, without consuming `buf`. Returns `None` if not enough data is
    /// buffered yet to know (only possible for a new Type0/Type1 chunk, whose
    /// `msg_length` field hasn't arrived yet).
    fn remaining_in_message(&self, buf: &[u8], basic_len: usize, fmt: ChunkType, csid: u32) -> Result<Option<usize>, ChunkReadError> {
        if let Some(partial) = self.partials.get(&csid) {
            return Ok(Some(partial.header.msg_length as usize - partial.payload.len()));
        }

        // Starting a new message. Type2/Type3 never carry an explicit
        // msg_length field of their own; they repeat the previous chunk's.
        if matches!(fmt, ChunkType::Type2 | ChunkType::Type3) {
            let prev = self
                .previous_headers
                .get(&csid)
                .ok_or(ChunkReadError::MissingPreviousChunkHeader(csid))?;
            return Ok(Some(prev.header.msg_length as usize));
        }

        // Type0/Type1: msg_length is the 3-byte big-endian field directly after
        // the (possibly truncated-to-0xFFFFFF) timestamp field, in both layouts.
        let msg_length_offset = basic_len + 3;
        if buf.len() < msg_length_offset + 3 {
            return Ok(None);
        }

        let msg_length = u32::from_be_bytes([0, buf[msg_length_offset], buf[msg_length_offset + 1], buf[msg_length_offset + 2]]);
        Ok(Some(msg_length as usize))
    }

    #[allow(clippy::too_many_arguments)]
    fn read_message_header(
        &mut self,
        cursor: &mut std::io::Cursor<&[u8]>,
        fmt: ChunkType,
        csid: u32,
        extended: bool,
    ) -> Result<ChunkMessageHeader, ChunkReadError> {
        let prev = self.previous_headers.get(&csid).map(|s| s.header);

        let header = match fmt {
            ChunkType::Type0 => {
                let mut timestamp = cursor.read_u24::<BigEndian>()?;
                let msg_length = cursor.read_u24::<BigEndian>()?;
                let msg_type_id = MessageType(cursor.read_u8()?);
                let msg_stream_id = cursor.read_u32::<byteorder::LittleEndian>()?;
                if extended {
                    timestamp = cursor.read_u32::<BigEndian>()?;
                }
                ChunkMessageHeader {
                    timestamp,
                    msg_length,
                    msg_type_id,
                    msg_stream_id,
                }
            }
            ChunkType::Type1 => {
                let mut delta = cursor.read_u24::<BigEndian>()?;
                let msg_length = cursor.read_u24::<BigEndian>()?;
                let msg_type_id = MessageType(cursor.read_u8()?);
                if extended {
                    delta = cursor.read_u32::<BigEndian>()?;
                }
                let prev = prev.ok_or(ChunkReadError::MissingPreviousChunkHeader(csid))?;
                ChunkMessageHeader {
                    timestamp: prev.timestamp.checked_add(delta).ok_or(ChunkReadError::TimestampOverflow)?,
                    msg_length,
                    msg_type_id,
                    msg_stream_id: prev.msg_stream_id,
                }
            }
            ChunkType::Type2 => {
                let mut delta = cursor.read_u24::<BigEndian>()?;
                if extended {
                    delta = cursor.read_u32::<BigEndian>()?;
                }
                let prev = prev.ok_or(ChunkReadError::MissingPreviousChunkHeader(csid))?;
                ChunkMessageHeader {
                    timestamp: prev.timestamp.checked_add(delta).ok_or(ChunkReadError::TimestampOverflow)?,
                    msg_length: prev.msg_length,
                    msg_type_id: prev.msg_type_id,
                    msg_stream_id: prev.msg_stream_id,
                }
            }
            ChunkType::Type3 => {
                if extended {
                    // Continuation chunks repeat the extended timestamp field but it is
                    // discarded; the timestamp was already fixed by the initiating chunk.
                    cursor.read_u32::<BigEndian>()?;
                }
                prev.ok_or(ChunkReadError::MissingPreviousChunkHeader(csid))?
            }
        };

        if header.msg_length > MAX_MESSAGE_SIZE {
            return Err(ChunkReadError::PartialChunkTooLarge);
        }

        if self.previous_headers.len() >= MAX_CHUNK_STREAMS && !self.previous_headers.contains_key(&csid) {
            return Err(ChunkReadError::TooManyPreviousChunkHeaders);
        }

        self.previous_headers.insert(
            csid,
            StreamHeader {
                header,
                extended_timestamp: extended,
                timestamp_delta: 0,
            },
        );

        Ok(header)
    }

    fn accumulate(
        &mut self,
        csid: u32,
        header: ChunkMessageHeader,
        extended: bool,
        payload: Vec<u8>,
    ) -> Result<Option<Chunk>, ChunkReadError> {
        let partial = match self.partials.get_mut(&csid) {
            Some(partial) => partial,
            None => {
                if self.partials.len() >= MAX_PARTIAL_CHUNKS {
                    return Err(ChunkReadError::TooManyPartialChunks);
                }
                self.partials.insert(
                    csid,
                    PartialMessage {
                        header,
                        extended_timestamp: extended,
                        payload: BytesMut::with_capacity(header.msg_length as usize),
                    },
                );
                self.partials.get_mut(&csid).expect("just inserted")
            }
        };

        partial.payload.extend_from_slice(&payload);

        if partial.payload.len() as u32 >= partial.header.msg_length {
            let PartialMessage { header, payload, .. } = self.partials.remove(&csid).expect("present");
            Ok(Some(Chunk {
                basic_header: ChunkBasicHeader { chunk_stream_id: csid },
                message_header: header,
                payload: payload.freeze(),
            }))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::chunk::writer::ChunkWriter;

    #[test]
    fn round_trips_small_chunk() {
        let writer = ChunkWriter::default();
        let mut buf = Vec::new();
        writer
            .write_chunk(
                &mut buf,
                Chunk::new(3, 0, MessageType::CommandAMF0, 0, Bytes::from_static(b"hello")),
            )
            .unwrap();

        let mut reader = ChunkReader::default();
        let mut read_buf = BytesMut::from(&buf[..]);
        let chunk = reader.read_chunk(&mut read_buf).unwrap().expect("chunk");

        assert_eq!(chunk.basic_header.chunk_stream_id, 3);
        assert_eq!(chunk.message_header.msg_type_id, MessageType::CommandAMF0);
        assert_eq!(&chunk.payload[..], b"hello");
        assert!(read_buf.is_empty());
    }

    #[test]
    fn round_trips_multi_chunk_message() {
        let mut writer = ChunkWriter::default();
        writer.set_chunk_size(16);

        let payload: Vec<u8> = (0..100u32).map(|i| i as u8).collect();
        let mut buf = Vec::new();
        writer
            .write_chunk(&mut buf, Chunk::new(5, 0, MessageType::Video, 1, Bytes::from(payload.clone())))
            .unwrap();

        let mut reader = ChunkReader::default();
        reader.update_max_chunk_size(16);
        let mut read_buf = BytesMut::from(&buf[..]);
        let chunk = reader.read_chunk(&mut read_buf).unwrap().expect("chunk");

        assert_eq!(chunk.payload.len(), 100);
        assert_eq!(&chunk.payload[..], &payload[..]);
    }

    #[test]
    fn returns_none_on_incomplete_buffer() {
        let mut reader = ChunkReader::default();
        let mut buf = BytesMut::from(&[0x03u8][..]);
        assert!(reader.read_chunk(&mut buf).unwrap().is_none());
    }

    #[test]
    fn type3_without_prior_header_is_an_error() {
        let mut reader = ChunkReader::default();
        let mut buf = BytesMut::from(&[0b1100_0011u8][..]);
        assert!(matches!(
            reader.read_chunk(&mut buf),
            Err(ChunkReadError::MissingPreviousChunkHeader(3))
        ));
    }
}

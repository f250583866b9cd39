//! The RTMP handshake.
//!
//! Only the simple handshake is implemented.
//!
//! Defined by:
//! - Legacy RTMP spec, section 5.2

use bytes::{Buf, BytesMut};
use rand::RngCore;

mod error;

pub use error::HandshakeError;

/// Size of C1/S1/C2/S2, not counting the leading version byte sent with C0/S0.
pub const RTMP_HANDSHAKE_SIZE: usize = 1536;

const RTMP_VERSION: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    /// Waiting to receive C0 and C1.
    WaitingForC0C1,
    /// S0/S1/S2 have been sent, waiting to receive C2.
    WaitingForC2,
    Done,
}

/// Drives the server side of the simple RTMP handshake.
///
/// The caller is responsible for buffering input: call [`HandshakeServer::needed`]
/// to find out how many bytes are required for the next step, and once that
/// many bytes are available in `buf`, call [`HandshakeServer::handshake`].
pub struct HandshakeServer {
    state: HandshakeState,
}

impl Default for HandshakeServer {
    fn default() -> Self {
        Self {
            state: HandshakeState::WaitingForC0C1,
        }
    }
}

impl HandshakeServer {
    /// The number of bytes that must be buffered before calling [`HandshakeServer::handshake`] again.
    pub fn needed(&self) -> usize {
        match self.state {
            HandshakeState::WaitingForC0C1 => 1 + RTMP_HANDSHAKE_SIZE,
            HandshakeState::WaitingForC2 => RTMP_HANDSHAKE_SIZE,
            HandshakeState::Done => 0,
        }
    }

    /// Whether the handshake has completed.
    pub fn is_finished(&self) -> bool {
        self.state == HandshakeState::Done
    }

    /// Consumes exactly [`HandshakeServer::needed`] bytes from the front of `buf`
    /// and appends any response to `write_buf`.
    pub fn handshake(&mut self, buf: &mut BytesMut, write_buf: &mut Vec<u8>) -> Result<(), HandshakeError> {
        match self.state {
            HandshakeState::WaitingForC0C1 => {
                let version = buf[0];
                if version != RTMP_VERSION {
                    return Err(HandshakeError::UnsupportedVersion(version));
                }

                let c1 = buf[1..1 + RTMP_HANDSHAKE_SIZE].to_vec();
                buf.advance(1 + RTMP_HANDSHAKE_SIZE);

                write_buf.push(RTMP_VERSION); // S0

                // S1: our own epoch (zeroed, we don't track one) + random payload.
                let mut s1 = vec![0u8; RTMP_HANDSHAKE_SIZE];
                rand::rng().fill_bytes(&mut s1[8..]);
                write_buf.extend_from_slice(&s1);

                // S2 echoes C1 back verbatim, as the simple handshake requires.
                write_buf.extend_from_slice(&c1);

                self.state = HandshakeState::WaitingForC2;
                Ok(())
            }
            HandshakeState::WaitingForC2 => {
                // C2 is expected to echo S1, but nothing downstream depends on that, so we
                // don't bother validating it.
                buf.advance(RTMP_HANDSHAKE_SIZE);
                self.state = HandshakeState::Done;
                Ok(())
            }
            HandshakeState::Done => Ok(()),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn full_handshake() {
        let mut server = HandshakeServer::default();
        let mut write_buf = Vec::new();

        assert_eq!(server.needed(), 1537);
        let mut c0c1 = BytesMut::zeroed(1537);
        c0c1[0] = RTMP_VERSION;
        server.handshake(&mut c0c1, &mut write_buf).unwrap();
        assert!(c0c1.is_empty());
        assert!(!server.is_finished());

        // S0 + S1 + S2
        assert_eq!(write_buf.len(), 1 + RTMP_HANDSHAKE_SIZE + RTMP_HANDSHAKE_SIZE);
        assert_eq!(write_buf[0], RTMP_VERSION);

        assert_eq!(server.needed(), RTMP_HANDSHAKE_SIZE);
        let mut c2 = BytesMut::zeroed(RTMP_HANDSHAKE_SIZE);
        server.handshake(&mut c2, &mut write_buf).unwrap();
        assert!(server.is_finished());
        assert_eq!(server.needed(), 0);
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut server = HandshakeServer::default();
        let mut write_buf = Vec::new();
        let mut c0c1 = BytesMut::zeroed(1537);
        c0c1[0] = 6;

        assert!(matches!(
            server.handshake(&mut c0c1, &mut write_buf),
            Err(HandshakeError::UnsupportedVersion(6))
        ));
    }
}

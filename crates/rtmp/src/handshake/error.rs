//! Handshake errors.

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("unsupported rtmp version: {0}, only version 3 is supported")]
    UnsupportedVersion(u8),
}

//! Registry-level error kinds.

/// Errors surfaced by [`crate::session::Session`] and [`crate::store::StreamRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// `push`/`pull` called against a session not classified for that role.
    #[error("wrong role for this operation")]
    WrongRole,
    /// `play` of a `(vhost, name)` with no live source.
    #[error("no stream registered for this name")]
    NoSuchStream,
    /// `publish` attempted on a `(vhost, name)` that already has a source.
    #[error("stream already has a source")]
    AlreadyPublishing,
    /// The session was already closed.
    #[error("session already closed")]
    AlreadyClosed,
    /// An RTMP protocol/IO error propagated from the codec layer.
    #[error("rtmp error: {0}")]
    Rtmp(#[from] hylan_rtmp::error::RtmpError),
    /// A ring/cache size failed its power-of-two validation.
    #[error("ring error: {0}")]
    Ring(#[from] hylan_ring::RingError),
    /// Event bus push exhausted its retry budget against a full queue.
    #[error("event bus queue full")]
    QueueFull,
}

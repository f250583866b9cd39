//! Ring and packet cache errors.

#[derive(Debug, thiserror::Error)]
pub enum RingError {
    #[error("ring capacity must be a power of two, got {0}")]
    CapacityNotPowerOfTwo(u64),
}

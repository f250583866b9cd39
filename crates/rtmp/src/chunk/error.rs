//! Chunk stream errors.

#[derive(Debug, thiserror::Error)]
pub enum ChunkReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid chunk type: {0}")]
    InvalidChunkType(u8),
    #[error("received chunk for csid {0} with no previous chunk header")]
    MissingPreviousChunkHeader(u32),
    #[error("too many partial chunks in flight")]
    TooManyPartialChunks,
    #[error("too many previous chunk headers cached")]
    TooManyPreviousChunkHeaders,
    #[error("partial chunk payload exceeds the maximum message size")]
    PartialChunkTooLarge,
    #[error("timestamp overflow")]
    TimestampOverflow,
}

#[derive(Debug, thiserror::Error)]
pub enum ChunkWriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ChunkReadError::MissingPreviousChunkHeader(3).to_string(),
            "received chunk for csid 3 with no previous chunk header"
        );
        assert_eq!(ChunkReadError::TooManyPartialChunks.to_string(), "too many partial chunks in flight");
    }
}

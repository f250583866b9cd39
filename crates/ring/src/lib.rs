//! Fixed-capacity ring buffer and key-frame packet cache used to fan a
//! single media source out to many concurrent sinks without the producer
//! ever blocking on a slow consumer.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

pub mod cache;
pub mod error;
mod ring;

pub use cache::{CachedPacket, PacketCache, ReaderState};
pub use error::RingError;
pub use ring::Ring;

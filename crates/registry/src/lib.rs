//! Live stream registry: session bookkeeping, key-frame-aware fan-out, and
//! the event bus coupling session lifecycle to registry mutation.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

pub mod base;
pub mod bus;
pub mod dispatch;
pub mod error;
pub mod packet;
pub mod session;
pub mod stat;
pub mod store;
pub mod stream;
pub mod task;

pub use base::{Classification, StreamBase};
pub use bus::{EventBus, EventKind, EventPayload};
pub use error::RegistryError;
pub use packet::{FrameType, MediaType, Packet, PacketHeader};
pub use session::Session;
pub use stat::{Stat, StatSnapshot};
pub use store::{RegistrySnapshot, StreamRegistry};
pub use stream::Stream;
pub use task::Task;

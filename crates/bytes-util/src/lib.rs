//! Byte and string copy-on-write types, plus zero-copy reader adapters,
//! used by the AMF0 and RTMP chunk codecs.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

mod cow;
mod zero_copy;

pub use cow::{BytesCow, StringCow};
pub use zero_copy::{BytesBuf, IoRead, ZeroCopyReader};

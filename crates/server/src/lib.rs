//! Library half of the `hylan-server` binary, split out so integration
//! tests can drive [`bridge::Bridge`] against `hylan_registry` directly
//! without a TCP connection or RTMP codec in the loop.

pub mod bridge;
pub mod http_api;
pub mod rtmp_listener;

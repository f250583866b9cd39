//! RTMP sessions.

pub mod server;

pub use server::{OutboundFrame, ServerSession, ServerSessionError, SessionData, SessionHandler};

//! Defines types for handling session events.

use bytes::Bytes;
use hylan_amf0::{Amf0Object, Amf0Value};

use super::error::ServerSessionError;
use crate::command_messages::UnknownCommand;
use crate::messages::UnknownMessage;

/// Data received from a session.
#[derive(Debug, Clone)]
pub enum SessionData {
    /// Video data.
    Video {
        /// Timestamp of the data.
        timestamp: u32,
        /// Data.
        data: Bytes,
    },
    /// Audio data.
    Audio {
        /// Timestamp of the data.
        timestamp: u32,
        /// Data.
        data: Bytes,
    },
    /// Metadata.
    Amf0 {
        /// Timestamp of the data.
        timestamp: u32,
        /// Data.
        data: Bytes,
    },
}

/// Handler for session events.
///
/// Every method besides [`SessionHandler::on_publish`], [`SessionHandler::on_unpublish`]
/// and [`SessionHandler::on_data`] has a no-op default, so a handler that only cares
/// about publishing doesn't need to implement the rest.
pub trait SessionHandler {
    /// Called when a stream is published.
    fn on_publish(
        &mut self,
        stream_id: u32,
        app_name: &str,
        stream_name: &str,
    ) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send;

    /// Called when a stream is unpublished.
    fn on_unpublish(&mut self, stream_id: u32) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send;

    /// Called when data is received.
    fn on_data(
        &mut self,
        stream_id: u32,
        data: SessionData,
    ) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send;

    /// Called when a client requests to play a stream via `play`.
    ///
    /// `values` are the raw positional AMF0 arguments to the command (stream
    /// name, start, duration, reset), in the order defined by the legacy RTMP
    /// spec, 7.2.2.1.
    fn on_play(
        &mut self,
        stream_id: u32,
        values: Vec<Amf0Value<'static>>,
    ) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send {
        async move {
            let _ = (stream_id, values);
            Ok(())
        }
    }

    /// Called when a client requests to play a stream via `play2`.
    fn on_play2(
        &mut self,
        stream_id: u32,
        parameters: Amf0Object<'static>,
    ) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send {
        async move {
            let _ = (stream_id, parameters);
            Ok(())
        }
    }

    /// Called when a message is received with a type this server doesn't act on.
    fn on_unknown_message(
        &mut self,
        stream_id: u32,
        message: UnknownMessage,
    ) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send {
        async move {
            let _ = (stream_id, message);
            Ok(())
        }
    }

    /// Called when a command is received with a name this server doesn't act on.
    fn on_unknown_command(
        &mut self,
        stream_id: u32,
        command: UnknownCommand<'_>,
    ) -> impl std::future::Future<Output = Result<(), ServerSessionError>> + Send {
        async move {
            let _ = (stream_id, command);
            Ok(())
        }
    }
}

//! Error types.
use std::fmt::Debug;

use crate::service::{HttpService, HttpServiceFactory};

/// An error that can occur when creating or running an HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum HttpError<F>
where
    F: HttpServiceFactory,
    F::Error: std::error::Error,
    <F::Service as HttpService>::Error: std::error::Error,
    <<F::Service as HttpService>::ResBody as http_body::Body>::Error: std::error::Error,
{
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// An error that occurred while handling a hyper connection.
    #[error("hyper connection: {0}")]
    HyperConnection(Box<dyn std::error::Error + Send + Sync>),
    /// An error that occurred while calling [`HttpServiceFactory::new_service`].
    #[error("make service error: {0}")]
    ServiceFactoryError(F::Error),
    /// An error that occurred while calling [`HttpService::call`].
    #[error("service error: {0}")]
    ServiceError(<F::Service as HttpService>::Error),
    /// An error that occurred while sending a response body.
    #[error("response body error: {0}")]
    ResBodyError(<<F::Service as HttpService>::ResBody as http_body::Body>::Error),
}

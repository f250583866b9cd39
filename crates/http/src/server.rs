use std::net::SocketAddr;

use crate::error::HttpError;
use crate::service::{HttpService, HttpServiceFactory};

/// The HTTP server.
///
/// This struct is the main entry point for creating and running an HTTP server.
///
/// Start creating a new server by calling [`HttpServer::builder`].
#[derive(Debug, Clone, bon::Builder)]
#[builder(state_mod(vis = "pub(crate)"))]
#[allow(dead_code)]
pub struct HttpServer<F> {
    /// The [`hylan_context::Context`] this server will live by.
    #[builder(default = hylan_context::Context::global())]
    ctx: hylan_context::Context,
    /// The number of worker tasks to spawn for each server backend.
    #[builder(default = 1)]
    worker_tasks: usize,
    /// The service factory that will be used to create new services.
    service_factory: F,
    /// The address to bind to.
    ///
    /// Use `[::]` for a dual-stack listener.
    /// For example, use `[::]:80` to bind to port 80 on both IPv4 and IPv6.
    bind: SocketAddr,
    /// Enable HTTP/1.1.
    #[builder(default = true)]
    #[cfg(feature = "http1")]
    #[cfg_attr(docsrs, doc(cfg(feature = "http1")))]
    enable_http1: bool,
    /// Enable HTTP/2.
    #[builder(default = true)]
    #[cfg(feature = "http2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "http2")))]
    enable_http2: bool,
}

impl<F> HttpServer<F>
where
    F: HttpServiceFactory + Clone + Send + 'static,
    F::Error: std::error::Error + Send,
    F::Service: Clone + Send + 'static,
    <F::Service as HttpService>::Error: std::error::Error + Send + Sync,
    <F::Service as HttpService>::ResBody: Send,
    <<F::Service as HttpService>::ResBody as http_body::Body>::Data: Send,
    <<F::Service as HttpService>::ResBody as http_body::Body>::Error: std::error::Error + Send + Sync,
{
    /// Run the server.
    ///
    /// This will:
    ///
    /// - Start listening on the configured interface for incoming connections.
    /// - Accept all incoming connections.
    /// - Handle incoming requests by passing them to the configured service factory.
    pub async fn run(self) -> Result<(), HttpError<F>> {
        #[cfg(all(feature = "http1", not(feature = "http2")))]
        let start_tcp_backend = self.enable_http1;
        #[cfg(all(not(feature = "http1"), feature = "http2"))]
        let start_tcp_backend = self.enable_http2;
        #[cfg(all(feature = "http1", feature = "http2"))]
        let start_tcp_backend = self.enable_http1 || self.enable_http2;
        #[cfg(not(any(feature = "http1", feature = "http2")))]
        let start_tcp_backend = false;

        #[cfg(any(feature = "http1", feature = "http2"))]
        if start_tcp_backend {
            let builder = crate::backend::hyper::HyperBackend::builder()
                .ctx(self.ctx)
                .worker_tasks(self.worker_tasks)
                .service_factory(self.service_factory)
                .bind(self.bind);

            #[cfg(feature = "http1")]
            let builder = builder.http1_enabled(self.enable_http1);

            #[cfg(feature = "http2")]
            let builder = builder.http2_enabled(self.enable_http2);

            return builder.build().run().await;
        }

        #[allow(unreachable_code)]
        Ok(())
    }
}

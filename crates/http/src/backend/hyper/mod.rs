//! Hyper backend.
use std::net::SocketAddr;

use hylan_context::ContextFutExt;
#[cfg(feature = "tracing")]
use tracing::Instrument;

use crate::error::HttpError;
use crate::service::{HttpService, HttpServiceFactory};

mod handler;
mod utils;

/// A backend that handles incoming HTTP connections over plain TCP using hyper.
///
/// This is used internally by the [`HttpServer`](crate::server::HttpServer) but can be used directly if preferred.
///
/// Call [`run`](HyperBackend::run) to start the server.
#[derive(Debug, Clone, bon::Builder)]
pub struct HyperBackend<F> {
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
    bind: SocketAddr,
    /// Enable HTTP/1.1.
    #[cfg(feature = "http1")]
    #[cfg_attr(docsrs, doc(cfg(feature = "http1")))]
    #[builder(default = true)]
    http1_enabled: bool,
    /// Enable HTTP/2.
    #[cfg(feature = "http2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "http2")))]
    #[builder(default = true)]
    http2_enabled: bool,
}

impl<F> HyperBackend<F>
where
    F: HttpServiceFactory + Clone + Send + 'static,
    F::Error: std::error::Error + Send,
    F::Service: Clone + Send + 'static,
    <F::Service as HttpService>::Error: std::error::Error + Send + Sync,
    <F::Service as HttpService>::ResBody: Send,
    <<F::Service as HttpService>::ResBody as http_body::Body>::Data: Send,
    <<F::Service as HttpService>::ResBody as http_body::Body>::Error: std::error::Error + Send + Sync,
{
    /// Run the HTTP server
    ///
    /// This function will bind to the address specified in `bind`, listen for incoming connections and handle requests.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(bind = %self.bind)))]
    pub async fn run(self) -> Result<(), HttpError<F>> {
        #[cfg(feature = "tracing")]
        tracing::debug!("starting server");

        // We have to create an std listener first because the tokio listener isn't clonable
        let listener = tokio::net::TcpListener::bind(self.bind).await?.into_std()?;

        // Create a child context for the workers so we can shut them down if one of them fails without shutting down the main context
        let (worker_ctx, worker_handler) = self.ctx.new_child();

        let workers = (0..self.worker_tasks)
            .map(|_n| {
                let service_factory = self.service_factory.clone();
                let ctx = worker_ctx.clone();
                let std_listener = listener.try_clone()?;
                let listener = tokio::net::TcpListener::from_std(std_listener)?;

                let worker_fut = async move {
                    loop {
                        #[cfg(feature = "tracing")]
                        tracing::trace!("waiting for connections");

                        let (tcp_stream, addr) = match listener.accept().with_context(ctx.clone()).await {
                            Some(Ok(pair)) => pair,
                            Some(Err(e)) if utils::is_fatal_tcp_error(&e) => {
                                #[cfg(feature = "tracing")]
                                tracing::error!(err = %e, "failed to accept tcp connection");
                                return Err(HttpError::<F>::from(e));
                            }
                            Some(Err(_)) => continue,
                            None => {
                                #[cfg(feature = "tracing")]
                                tracing::trace!("context done, stopping listener");
                                break;
                            }
                        };

                        #[cfg(feature = "tracing")]
                        tracing::trace!(addr = %addr, "accepted tcp connection");

                        let ctx = ctx.clone();
                        let mut service_factory = service_factory.clone();

                        let connection_fut = async move {
                            let http_service = match service_factory.new_service(addr).await {
                                Ok(service) => service,
                                Err(_e) => {
                                    #[cfg(feature = "tracing")]
                                    tracing::warn!(err = %_e, "failed to create service");
                                    return;
                                }
                            };

                            #[cfg(feature = "tracing")]
                            tracing::trace!("handling connection");

                            #[cfg(feature = "http1")]
                            let http1 = self.http1_enabled;
                            #[cfg(not(feature = "http1"))]
                            let http1 = false;

                            #[cfg(feature = "http2")]
                            let http2 = self.http2_enabled;
                            #[cfg(not(feature = "http2"))]
                            let http2 = false;

                            let _res = handler::handle_connection::<F, _, _>(ctx, http_service, tcp_stream, http1, http2).await;

                            #[cfg(feature = "tracing")]
                            if let Err(e) = _res {
                                tracing::warn!(err = %e, "error handling connection");
                            }

                            #[cfg(feature = "tracing")]
                            tracing::trace!("connection closed");
                        };

                        #[cfg(feature = "tracing")]
                        let connection_fut = connection_fut.instrument(tracing::trace_span!("connection", addr = %addr));

                        tokio::spawn(connection_fut);
                    }

                    #[cfg(feature = "tracing")]
                    tracing::trace!("listener closed");

                    Ok(())
                };

                #[cfg(feature = "tracing")]
                let worker_fut = worker_fut.instrument(tracing::trace_span!("worker", n = _n));

                Ok(tokio::spawn(worker_fut))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        match futures::future::try_join_all(workers).await {
            Ok(res) => {
                for r in res {
                    if let Err(e) = r {
                        drop(worker_ctx);
                        worker_handler.shutdown().await;
                        return Err(e);
                    }
                }
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(err = %_e, "error running workers");
            }
        }

        drop(worker_ctx);
        worker_handler.shutdown().await;

        #[cfg(feature = "tracing")]
        tracing::debug!("all workers finished");

        Ok(())
    }
}

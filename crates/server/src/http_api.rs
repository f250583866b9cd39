//! The inspection surface: one route returning a JSON snapshot of every
//! live stream, served over `hylan-http`'s plain HTTP/1.1+2 backend.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::routing::get;
use hylan_context::Context;
use hylan_registry::StreamRegistry;
use serde_json::{Value, json};

/// Failures bringing up the inspection surface.
#[derive(Debug, thiserror::Error)]
pub enum HttpApiError {
    /// The underlying `hylan-http` server failed to bind or serve.
    #[error("http server error: {0}")]
    Server(String),
}

async fn stream_list(State(registry): State<Arc<StreamRegistry>>) -> Json<Value> {
    Json(json!({
        "message": "success",
        "data": registry.snapshot().await.data,
    }))
}

fn router(registry: Arc<StreamRegistry>) -> axum::Router {
    axum::Router::new()
        .route("/v1/stream/list", get(stream_list))
        .with_state(registry)
}

/// Binds `addr` and serves the inspection routes until `ctx` is cancelled.
pub async fn run(ctx: Context, addr: SocketAddr, registry: Arc<StreamRegistry>) -> Result<(), HttpApiError> {
    let make_service = router(registry).into_make_service_with_connect_info::<SocketAddr>();
    let service_factory = hylan_http::service::tower_make_service_with_addr_factory(make_service);

    tracing::info!(%addr, "http inspection surface bound");

    hylan_http::HttpServer::builder()
        .ctx(ctx)
        .service_factory(service_factory)
        .bind(addr)
        .build()
        .run()
        .await
        .map_err(|err| HttpApiError::Server(err.to_string()))
}

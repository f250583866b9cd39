//! A simple HTTP echo server.
//!
//! This example demonstrates how to create a simple HTTP server that echoes the request body back to the client.
//!
//! Try with:
//!
//! ```
//! curl -X POST -d 'test' http://localhost:8000/
//! ```

#[tokio::main]
async fn main() {
    let service = hylan_http::service::fn_http_service(|req| async move {
        http::Response::builder().status(http::StatusCode::OK).body(req.into_body())
    });
    // The simplest option here is a clone factory that clones the given service for each connection.
    let service_factory = hylan_http::service::service_clone_factory(service);

    // Create a server that listens on all interfaces on port 8000.
    hylan_http::HttpServer::builder()
        .service_factory(service_factory)
        .bind("[::]:8000".parse().unwrap())
        .build()
        .run()
        .await
        .expect("server failed");
}

//! RTMP live-streaming server: a TCP listener speaking the RTMP wire
//! protocol, a process-wide stream registry coupling publishers to their
//! sinks, and an HTTP inspection surface over the same registry.

use std::sync::Arc;

use hylan_context::Context;
use hylan_registry::{EventBus, StreamRegistry, Task};
use hylan_server::{http_api, rtmp_listener};
use hylan_signal::{SignalHandler, SignalKind};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1);

    let settings = match hylan_settings::Settings::load(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_new(&settings.log.level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (ctx, handler) = Context::new();

    let registry = Arc::new(StreamRegistry::new());
    let bus = Arc::new(EventBus::new(1024));
    let task = Arc::new(Task::new());

    let bus_task = tokio::spawn({
        let bus = bus.clone();
        let ctx = ctx.clone();
        async move { bus.run(ctx).await }
    });

    let rtmp_task = tokio::spawn(rtmp_listener::run(
        ctx.clone(),
        settings.rtmp.listen_addr,
        registry.clone(),
        bus.clone(),
        task.clone(),
        settings.cache.packet_ring_size,
        settings.cache.key_ring_size,
    ));

    let http_task = tokio::spawn(http_api::run(ctx.clone(), settings.http.listen_addr, registry.clone()));

    let mut signals = SignalHandler::new().with_signal(SignalKind::Interrupt).with_signal(SignalKind::Terminate);

    let exit_code = tokio::select! {
        biased;
        signal = signals.recv() => {
            tracing::info!(?signal, "received shutdown signal");
            0
        }
        res = rtmp_task => {
            tracing::error!(?res, "rtmp listener exited unexpectedly");
            1
        }
        res = http_task => {
            tracing::error!(?res, "http inspection surface exited unexpectedly");
            1
        }
    };

    handler.shutdown().await;
    bus_task.abort();

    tracing::info!("shutdown complete");
    std::process::exit(exit_code);
}

//! Single-reader event queue coupling session creation/deletion to registry
//! mutation, so the registry only ever mutates on one task.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use hylan_context::Context;
use tokio::sync::mpsc;

use crate::error::RegistryError;
use crate::session::Session;

/// The two event kinds the bus carries. Named after the sessions they
/// describe, not generic pub/sub topics — this bus exists for exactly one
/// purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SessionCreated,
    SessionDeleted,
}

/// Payload carried by one event.
#[derive(Clone)]
pub enum EventPayload {
    SessionCreated { base: crate::base::StreamBase, session: Arc<Session> },
    SessionDeleted { session: Arc<Session> },
}

type Handler = Arc<dyn Fn(Context, EventPayload) -> BoxFuture<'static, ()> + Send + Sync>;

struct Envelope {
    kind: EventKind,
    ctx: Context,
    payload: EventPayload,
}

/// Registers handlers and accepts pushes; [`EventBus::run`] is the single
/// reader that drains them in FIFO order.
pub struct EventBus {
    tx: mpsc::Sender<Envelope>,
    rx: tokio::sync::Mutex<Option<mpsc::Receiver<Envelope>>>,
    handlers: std::sync::Mutex<HashMap<EventKind, Vec<Handler>>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: tokio::sync::Mutex::new(Some(rx)),
            handlers: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Attaches `handler` to `kind`. Handlers for a kind run in registration
    /// order when an event of that kind is read.
    pub fn register(&self, kind: EventKind, handler: Handler) {
        self.handlers.lock().unwrap().entry(kind).or_default().push(handler);
    }

    /// Pushes an event. Never blocks waiting for queue space: on a full
    /// queue it retries up to `retries` times (`0` = no retry, negative =
    /// unbounded), re-attempting immediately each time, and otherwise fails
    /// with [`RegistryError::QueueFull`].
    pub fn push(&self, kind: EventKind, ctx: Context, payload: EventPayload, mut retries: i64) -> Result<(), RegistryError> {
        let mut envelope = Envelope { kind, ctx, payload };

        loop {
            match self.tx.try_send(envelope) {
                Ok(()) => return Ok(()),
                Err(mpsc::error::TrySendError::Closed(_)) => return Err(RegistryError::QueueFull),
                Err(mpsc::error::TrySendError::Full(env)) => {
                    if retries == 0 {
                        return Err(RegistryError::QueueFull);
                    }
                    if retries > 0 {
                        retries -= 1;
                    }
                    envelope = env;
                }
            }
        }
    }

    /// Runs the single reader loop until the channel closes or `ctx` is
    /// cancelled. Must be called exactly once; takes the receiver on first
    /// call and does nothing on subsequent calls.
    pub async fn run(&self, ctx: Context) {
        let mut rx = match self.rx.lock().await.take() {
            Some(rx) => rx,
            None => return,
        };

        loop {
            let envelope = tokio::select! {
                biased;
                _ = ctx.done() => return,
                envelope = rx.recv() => envelope,
            };

            let Some(envelope) = envelope else { return };

            let handlers = {
                let guard = self.handlers.lock().unwrap();
                guard.get(&envelope.kind).cloned().unwrap_or_default()
            };

            for handler in handlers {
                handler(envelope.ctx.clone(), envelope.payload.clone()).await;
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use hylan_future_ext::FutureExt;

    use super::*;

    fn session() -> Arc<Session> {
        let (ctx, _h) = Context::new();
        Arc::new(Session::new("localhost", 0, ctx))
    }

    #[tokio::test]
    async fn registered_handler_observes_pushed_event() {
        let bus = Arc::new(EventBus::new(8));
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        bus.register(
            EventKind::SessionCreated,
            Arc::new(move |_ctx, _payload| {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
            }),
        );

        let (ctx, handler) = Context::new();
        let reader = tokio::spawn({
            let bus = bus.clone();
            let ctx = ctx.clone();
            async move { bus.run(ctx).await }
        });

        let (event_ctx, _eh) = Context::new();
        bus.push(
            EventKind::SessionCreated,
            event_ctx,
            EventPayload::SessionCreated {
                base: session().base().await,
                session: session(),
            },
            0,
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::Relaxed), 1);

        handler.cancel();
        reader.with_timeout(Duration::from_millis(200)).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn push_fails_when_queue_full_and_no_retries() {
        let bus = EventBus::new(1);
        let (ctx, _h) = Context::new();

        let fill = || EventPayload::SessionDeleted { session: session() };

        bus.push(EventKind::SessionDeleted, ctx.clone(), fill(), 0).unwrap();
        assert!(matches!(
            bus.push(EventKind::SessionDeleted, ctx, fill(), 0),
            Err(RegistryError::QueueFull)
        ));
    }
}

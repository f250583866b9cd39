//! Fans a source's packets out to its sinks: one independent unit of work
//! per sink, so a slow or disconnected sink never stalls the others.

use std::sync::Arc;

use crate::session::Session;
use crate::stream::Stream;
use crate::task::Task;

/// Submits `sink`'s fan-out loop against `stream` onto `task`. The unit
/// removes `sink` from `stream` on its own exit (cache closed, context
/// cancelled, or a write failure), so the caller doesn't need to track it.
pub fn spawn_sink(task: &Task, sink: Arc<Session>, stream: Arc<Stream>) {
    let session_id = sink.id;
    task.submit("dispatch-sink", async move {
        sink.sink(stream).await;
        tracing::debug!(session_id, "sink dispatch unit exited");
    });
}

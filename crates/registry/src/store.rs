//! Process-wide index of live streams and sessions.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::session::Session;
use crate::stream::Stream;

/// `vhost -> name -> Stream`, plus a flat `session_id -> Session` index.
///
/// Invariant: every `Stream` reachable through the name index has its
/// source session present in the session index.
#[derive(Default)]
pub struct StreamRegistry {
    streams: RwLock<HashMap<String, HashMap<String, Arc<Stream>>>>,
    sessions: RwLock<HashMap<u64, Arc<Session>>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` as the source of `(vhost, name)`. Returns `false`
    /// without mutating anything if that name already has a live source.
    pub async fn register_source(&self, vhost: &str, name: &str, session: Arc<Session>, stream: Arc<Stream>) -> bool {
        let mut streams = self.streams.write().await;
        let by_name = streams.entry(vhost.to_string()).or_default();

        if by_name.contains_key(name) {
            return false;
        }

        by_name.insert(name.to_string(), stream);
        self.sessions.write().await.insert(session.id, session);
        true
    }

    /// Looks up `(vhost, name)`'s stream and registers `session` as one of
    /// its sinks. Returns `None` if no such stream exists.
    pub async fn register_sink(&self, vhost: &str, name: &str, session: Arc<Session>) -> Option<Arc<Stream>> {
        let stream = self.lookup(vhost, name).await?;
        stream.add_sink(session.clone());
        self.sessions.write().await.insert(session.id, session);
        Some(stream)
    }

    /// Removes `session_id` from the session index and, if it was a source,
    /// removes its `Stream` from the name index too.
    pub async fn delete(&self, session_id: u64) {
        let Some(session) = self.sessions.write().await.remove(&session_id) else {
            return;
        };

        let base = session.base().await;
        if base.classification == crate::base::Classification::Source {
            if let Some(by_name) = self.streams.write().await.get_mut(&base.vhost) {
                by_name.remove(&base.name);
            }
        }
    }

    pub async fn lookup(&self, vhost: &str, name: &str) -> Option<Arc<Stream>> {
        self.streams.read().await.get(vhost).and_then(|by_name| by_name.get(name)).cloned()
    }

    /// A read-only snapshot of the registry, suitable for the HTTP
    /// inspection surface. Clones the top-level maps but not the session
    /// references themselves.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let streams = self.streams.read().await;
        let mut data = HashMap::new();

        for (vhost, by_name) in streams.iter() {
            let mut names = HashMap::new();
            for (name, stream) in by_name.iter() {
                let source_base = stream.source().base().await;
                let source_stat = stream.source().stat_snapshot();

                let mut sinks = Vec::new();
                stream.range_sinks(|id, session| sinks.push((id, session.clone())));

                let mut sink_entries = HashMap::new();
                for (id, session) in sinks {
                    sink_entries.insert(
                        id.to_string(),
                        SessionSnapshot {
                            stat: session.stat_snapshot(),
                            base: session.base().await,
                        },
                    );
                }

                names.insert(
                    name.clone(),
                    StreamSnapshot {
                        stream_source: SessionSnapshot {
                            stat: source_stat,
                            base: source_base,
                        },
                        stream_sinks: sink_entries,
                    },
                );
            }
            data.insert(vhost.clone(), names);
        }

        RegistrySnapshot { data }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub stat: crate::stat::StatSnapshot,
    pub base: crate::base::StreamBase,
}

#[derive(Debug, Serialize)]
pub struct StreamSnapshot {
    pub stream_source: SessionSnapshot,
    pub stream_sinks: HashMap<String, SessionSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct RegistrySnapshot {
    pub data: HashMap<String, HashMap<String, StreamSnapshot>>,
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use hylan_context::Context;
    use hylan_ring::PacketCache;

    use super::*;

    fn new_session() -> Arc<Session> {
        let (ctx, _h) = Context::new();
        Arc::new(Session::new("localhost", 0, ctx))
    }

    #[tokio::test]
    async fn register_source_rejects_duplicate_name() {
        let registry = StreamRegistry::new();
        let source1 = new_session();
        source1.classify_source("live", "demo", 8, 4).await.unwrap();
        let cache = Arc::new(PacketCache::new(8, 4).unwrap());
        let stream1 = Arc::new(Stream::new(source1.clone(), cache.clone()));

        assert!(registry.register_source("localhost", "demo", source1, stream1).await);

        let source2 = new_session();
        source2.classify_source("live", "demo", 8, 4).await.unwrap();
        let stream2 = Arc::new(Stream::new(source2.clone(), cache));

        assert!(!registry.register_source("localhost", "demo", source2, stream2).await);
    }

    #[tokio::test]
    async fn delete_removes_source_stream() {
        let registry = StreamRegistry::new();
        let source = new_session();
        source.classify_source("live", "demo", 8, 4).await.unwrap();
        let cache = Arc::new(PacketCache::new(8, 4).unwrap());
        let stream = Arc::new(Stream::new(source.clone(), cache));
        let id = source.id;

        registry.register_source("localhost", "demo", source, stream).await;
        assert!(registry.lookup("localhost", "demo").await.is_some());

        registry.delete(id).await;
        assert!(registry.lookup("localhost", "demo").await.is_none());
    }

    #[tokio::test]
    async fn register_sink_against_missing_stream_fails() {
        let registry = StreamRegistry::new();
        let sink = new_session();
        assert!(registry.register_sink("localhost", "demo", sink).await.is_none());
    }
}

//! The registry entry for one live source and its attached sinks.

use std::sync::Arc;

use dashmap::DashMap;
use hylan_ring::PacketCache;

use crate::packet::Packet;
use crate::session::Session;

/// One live `(vhost, name)` stream: its source session and the sinks
/// currently pulling from it.
pub struct Stream {
    source: Arc<Session>,
    cache: Arc<PacketCache<Packet>>,
    sinks: DashMap<u64, Arc<Session>>,
}

impl Stream {
    pub fn new(source: Arc<Session>, cache: Arc<PacketCache<Packet>>) -> Self {
        Self {
            source,
            cache,
            sinks: DashMap::new(),
        }
    }

    pub fn source(&self) -> &Arc<Session> {
        &self.source
    }

    pub fn cache(&self) -> &Arc<PacketCache<Packet>> {
        &self.cache
    }

    /// Inserts a sink. Must be called before the sink begins pulling.
    pub fn add_sink(&self, session: Arc<Session>) {
        self.sinks.insert(session.id, session);
    }

    /// Removes a sink, if present. Safe to call concurrently with a
    /// dispatcher iteration over the same map.
    pub fn remove_sink(&self, id: u64) -> Option<Arc<Session>> {
        self.sinks.remove(&id).map(|(_, s)| s)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Invokes `f` for every sink currently attached. A sink added or
    /// removed mid-iteration may or may not be observed, per dashmap's
    /// shard-locked iteration contract.
    pub fn range_sinks(&self, mut f: impl FnMut(u64, &Arc<Session>)) {
        for entry in self.sinks.iter() {
            f(*entry.key(), entry.value());
        }
    }

    pub fn sink_ids(&self) -> Vec<u64> {
        self.sinks.iter().map(|e| *e.key()).collect()
    }
}

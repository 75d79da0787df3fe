//! Heartbeat-based "who is online" counter.
//!
//! Clients post a heartbeat every few seconds; an id counts as online
//! while its last heartbeat is within the active window.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Last-seen timestamps keyed by client id.
#[derive(Debug)]
pub struct HeartbeatTracker {
    window: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl HeartbeatTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a heartbeat for `id` now.
    pub async fn record(&self, id: impl Into<String>) {
        self.record_at(id, Instant::now()).await;
    }

    /// Records a heartbeat for `id` at `at`. Ids already expired by then
    /// are evicted.
    pub async fn record_at(&self, id: impl Into<String>, at: Instant) {
        let id = id.into();
        debug!(id = %id, "Heartbeat");
        let mut last_seen = self.last_seen.lock().await;
        self.evict_expired(&mut last_seen, at);
        last_seen.insert(id, at);
    }

    /// Evicts expired ids, then returns how many remain.
    pub async fn online_count(&self) -> usize {
        self.online_count_at(Instant::now()).await
    }

    pub async fn online_count_at(&self, now: Instant) -> usize {
        let mut last_seen = self.last_seen.lock().await;
        self.evict_expired(&mut last_seen, now);
        last_seen.len()
    }

    fn evict_expired(&self, last_seen: &mut HashMap<String, Instant>, now: Instant) {
        let before = last_seen.len();
        last_seen.retain(|_, seen| now.saturating_duration_since(*seen) <= self.window);

        let evicted = before - last_seen.len();
        if evicted > 0 {
            debug!(evicted, remaining = last_seen.len(), "Expired heartbeats evicted");
        }
    }
}

/// Picks the id a heartbeat is recorded under.
///
/// An explicit non-empty id wins; otherwise the first `X-Forwarded-For`
/// entry; otherwise the peer address.
pub fn heartbeat_id(explicit: Option<&str>, forwarded_for: Option<&str>, peer: &str) -> String {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return id.to_string();
    }

    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(peer)
        .to_string()
}

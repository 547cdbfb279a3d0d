//! Process-wide counters of the server. One instance is created at start and shared by all the
//! connection handlers via the `Context`.
use serde_derive::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct ServerStats {
    started_at: Instant,
    /// Completed GET (open and peek flavoured) commands, items found or not.
    cmd_get: AtomicU64,
    curr_connections: AtomicU64,
    total_connections: AtomicU64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub uptime: u64,
    pub cmd_get: u64,
    pub curr_connections: u64,
    pub total_connections: u64,
}

impl Default for ServerStats {
    fn default() -> Self {
        ServerStats {
            started_at: Instant::now(),
            cmd_get: AtomicU64::new(0),
            curr_connections: AtomicU64::new(0),
            total_connections: AtomicU64::new(0),
        }
    }
}

impl ServerStats {
    pub fn incr_cmd_get(&self) {
        self.cmd_get.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cmd_get(&self) -> u64 {
        self.cmd_get.load(Ordering::Relaxed)
    }

    pub fn connection_opened(&self) {
        self.curr_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.curr_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started_at.elapsed().as_secs(),
            cmd_get: self.cmd_get(),
            curr_connections: self.curr_connections.load(Ordering::Relaxed),
            total_connections: self.total_connections.load(Ordering::Relaxed),
        }
    }
}

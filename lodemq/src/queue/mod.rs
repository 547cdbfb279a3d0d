pub mod manager;
pub mod memory;

use crate::Result;
use bytes::Bytes;
use serde_derive::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub use memory::Queue;

/// Shared handle of a consumer, a plain queue or a consumer group of a queue.
pub type ConsumerRef = Arc<dyn Consumer>;

/// The capability a connection needs from the queue store to consume items. All the operations
/// are atomic and return immediately, nothing waits for items to arrive.
pub trait Consumer: Send + Sync + std::fmt::Debug {
    /// Name of the underlying queue.
    fn queue_name(&self) -> &str;

    /// Removes the next deliverable item.
    fn get_next(&self) -> Option<Bytes>;

    /// Reads the next deliverable item without removing it.
    fn peek(&self) -> Option<Bytes>;

    /// Gives back an item got by `get_next`, it will be the next one to be delivered.
    fn put_back(&self, item: Bytes) -> Result<()>;

    fn stats(&self) -> &QueueStats;

    /// Returns the named consumer group view of the queue, it is created on the first use.
    fn consumer_group(&self, name: &str) -> Result<ConsumerRef>;
}

/// Counters of a queue or a consumer group.
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Items delivered to connections but not yet closed or aborted.
    open_reads: AtomicI64,
}

impl QueueStats {
    pub fn update_open_reads(&self, delta: i64) {
        self.open_reads.fetch_add(delta, Ordering::AcqRel);
    }

    pub fn open_reads(&self) -> i64 {
        self.open_reads.load(Ordering::Acquire)
    }
}

/// Queue information for the admin API and for the stats command.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueueInfo {
    pub name: String,
    /// Number of items waiting for delivery to the plain consumers.
    pub items: usize,
    pub open_reads: i64,
    pub consumer_groups: Vec<ConsumerGroupInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsumerGroupInfo {
    pub name: String,
    pub items: usize,
    pub open_reads: i64,
}

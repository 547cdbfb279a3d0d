use crate::client::command::GetCommand;
use crate::queue::manager::QueueManagerSink;
use crate::queue::ConsumerRef;
use crate::stats::ServerStats;
use crate::{Context, Result};
use bytes::Bytes;
use lodemq_codec::frame::Frame;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

pub mod get;
pub mod server;


pub type MaybeFrame = Result<Option<Frame>>;

/// The item a connection holds. A connection can have at most one unacknowledged item, no
/// matter how many queues it reads.
#[derive(Debug, Default)]
pub enum Held {
    #[default]
    Idle,
    Open {
        item: Bytes,
        /// The command which opened the item, the queue and the consumer group it came from.
        command: GetCommand,
        /// The consumer the item was got from, its open reads counter is released on close.
        consumer: ConsumerRef,
    },
}

impl Held {
    pub fn is_open(&self) -> bool {
        matches!(self, Held::Open { .. })
    }
}

/// All the transient data of a connection are stored here.
pub struct Connection {
    /// Unique ID of the connection.
    id: String,
    qm: QueueManagerSink,
    stats: Arc<ServerStats>,
    held: Held,
}

impl Connection {
    pub fn new(context: Context) -> Self {
        let conn_id = Uuid::new_v4().as_hyphenated().to_string();

        info!("Client connected id = {conn_id}");

        Connection {
            id: conn_id,
            qm: context.queue_manager,
            stats: context.stats,
            held: Held::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn held(&self) -> &Held {
        &self.held
    }
}

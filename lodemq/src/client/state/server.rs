use super::Connection;
use crate::queue::manager as qm;
use lodemq_codec::frame::{self, Frame, Reply};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

impl Connection {
    /// Server and queue counters as `STAT` lines.
    pub async fn stats(&self) -> Frame {
        let snapshot = self.stats.snapshot();

        let mut replies = vec![
            frame::stat("uptime", snapshot.uptime),
            frame::stat("version", VERSION),
            frame::stat("curr_connections", snapshot.curr_connections),
            frame::stat("total_connections", snapshot.total_connections),
            frame::stat("cmd_get", snapshot.cmd_get),
        ];

        for queue in qm::get_queues(&self.qm).await {
            replies.push(frame::stat(&format!("queue_{}_items", queue.name), queue.items));
            replies.push(frame::stat(
                &format!("queue_{}_open_transactions", queue.name),
                queue.open_reads,
            ));

            for group in queue.consumer_groups {
                let prefix = format!("queue_{}:{}", queue.name, group.name);

                replies.push(frame::stat(&format!("{prefix}_items"), group.items));
                replies.push(frame::stat(&format!("{prefix}_open_transactions"), group.open_reads));
            }
        }

        replies.push(Reply::End);

        Frame::Frames(replies)
    }

    pub fn version(&self) -> Frame {
        Frame::Frame(Reply::Version(VERSION.to_owned()))
    }
}

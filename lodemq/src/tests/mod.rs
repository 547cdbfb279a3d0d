
use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use lodemq_codec::{
    codec::ClientCodec,
    frame::{Reply, Request},
};
use tokio::{io::DuplexStream, task::JoinHandle};
use tokio_util::codec::Framed;

use crate::{
    client::conn::handle_client,
    queue::{
        manager::{self as qm, QueueManagerSink},
        Queue,
    },
    stats::ServerStats,
    Context, Result,
};

/// TestCase for System Under Test which spawns a queue manager and serves clients through
/// in-memory streams, the same way as the TCP listener does.
struct TestCase {
    qm: QueueManagerSink,
    stats: Arc<ServerStats>,
}

/// A client speaking the text protocol and the server task serving it.
struct TestClient {
    framed: Framed<DuplexStream, ClientCodec>,
    server: JoinHandle<Result<()>>,
}

impl TestCase {
    fn new() -> Self {
        TestCase {
            qm: qm::start(),
            stats: Arc::new(ServerStats::default()),
        }
    }

    fn context(&self) -> Context {
        Context {
            queue_manager: self.qm.clone(),
            stats: self.stats.clone(),
        }
    }

    async fn queue_with(&self, name: &str, items: &[&str]) -> Queue {
        let queue = qm::declare_queue(&self.qm, name).await.unwrap();

        for item in items {
            queue.enqueue(Bytes::copy_from_slice(item.as_bytes())).unwrap();
        }

        queue
    }

    /// Returns the raw stream of a new client.
    fn connect_raw(&self) -> (DuplexStream, JoinHandle<Result<()>>) {
        let (client, server) = tokio::io::duplex(1024);
        let ctx = self.context();

        let handle = tokio::spawn(async move { handle_client(server, ctx).await });

        (client, handle)
    }

    fn connect(&self) -> TestClient {
        let (client, server) = self.connect_raw();

        TestClient {
            framed: Framed::new(client, ClientCodec::default()),
            server,
        }
    }
}

impl TestClient {
    async fn send(&mut self, line: &str) {
        self.framed
            .send(Request::from_iter(line.split_whitespace()))
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> Reply {
        recv_with_timeout(&mut self.framed)
            .await
            .expect("No reply is received")
    }

    /// Sends a command and collects the replies until `END` or an error line.
    async fn command(&mut self, line: &str) -> Vec<Reply> {
        self.send(line).await;

        let mut replies = vec![];

        loop {
            let reply = self.recv().await;
            let last = matches!(reply, Reply::End | Reply::Error(..));

            replies.push(reply);

            if last {
                return replies;
            }
        }
    }

    /// Closes the client side and waits for the server to finish the connection.
    async fn disconnect(self) -> Result<()> {
        drop(self.framed);

        self.server.await.unwrap()
    }
}

/// Receiving with timeout
async fn recv_with_timeout(framed: &mut Framed<DuplexStream, ClientCodec>) -> Option<Reply> {
    let sleep = tokio::time::sleep(tokio::time::Duration::from_millis(500));
    tokio::pin!(sleep);

    tokio::select! {
        reply = framed.next() => {
            reply.map(|r| r.unwrap())
        }
        _ = &mut sleep => {
            None
        }
    }
}

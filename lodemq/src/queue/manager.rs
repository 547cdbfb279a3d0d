use crate::error::StoreError;
use crate::queue::{ConsumerRef, Queue, QueueInfo};
use crate::{logerr, send, Result};
use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

// QueueManager task
//   handles:
//     - declare queue (create it if it doesn't exist)
//     - look up a queue as a consumer for the connections
//     - list queues for the stats and the admin API
//     - delete queue
//
// The queues themselves are shared handles, consuming from them doesn't go through this task,
// only the name -> queue mapping does.

#[derive(Debug)]
pub enum QueueManagerCommand {
    Declare(String, oneshot::Sender<Queue>),
    GetQueue(String, oneshot::Sender<Result<ConsumerRef>>),
    GetQueues(oneshot::Sender<Vec<QueueInfo>>),
    Delete(String, oneshot::Sender<Result<()>>),
}

pub type QueueManagerSink = mpsc::Sender<QueueManagerCommand>;

pub fn start() -> QueueManagerSink {
    let (sink, stream) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut manager = QueueManagerState {
            command_stream: stream,
            queues: HashMap::new(),
        };

        if let Err(e) = manager.command_loop().await {
            error!("Queue manager exited {:?}", e);
        }
    });

    sink
}

/// Declares a queue. Declaring an existing queue gives back the existing one.
pub async fn declare_queue(mgr: &QueueManagerSink, name: &str) -> Result<Queue> {
    let (tx, rx) = oneshot::channel();

    send!(mgr, QueueManagerCommand::Declare(name.to_owned(), tx))?;

    Ok(rx.await?)
}

/// Looks up a queue by name, it fails with `StoreError::NotFound` if there is no such queue.
pub async fn get_queue(mgr: &QueueManagerSink, name: &str) -> Result<ConsumerRef> {
    let (tx, rx) = oneshot::channel();

    send!(mgr, QueueManagerCommand::GetQueue(name.to_owned(), tx))?;

    rx.await?
}

pub async fn get_queues(mgr: &QueueManagerSink) -> Vec<QueueInfo> {
    let (tx, rx) = oneshot::channel();

    logerr!(mgr.send(QueueManagerCommand::GetQueues(tx)).await);

    match rx.await {
        Ok(queues) => queues,
        Err(_) => vec![],
    }
}

pub async fn delete_queue(mgr: &QueueManagerSink, name: &str) -> Result<()> {
    let (tx, rx) = oneshot::channel();

    send!(mgr, QueueManagerCommand::Delete(name.to_owned(), tx))?;

    rx.await?
}

struct QueueManagerState {
    command_stream: mpsc::Receiver<QueueManagerCommand>,
    queues: HashMap<String, Queue>,
}

impl QueueManagerState {
    async fn command_loop(&mut self) -> Result<()> {
        use QueueManagerCommand::*;

        while let Some(command) = self.command_stream.recv().await {
            match command {
                Declare(name, tx) => {
                    logerr!(tx.send(self.handle_declare(name)));
                }
                GetQueue(name, tx) => {
                    logerr!(tx.send(self.handle_get_queue(&name)));
                }
                GetQueues(tx) => {
                    logerr!(tx.send(self.handle_get_queues()));
                }
                Delete(name, tx) => {
                    logerr!(tx.send(self.handle_delete(&name)));
                }
            }
        }

        Ok(())
    }

    fn handle_declare(&mut self, name: String) -> Queue {
        self.queues
            .entry(name)
            .or_insert_with_key(|name| {
                info!("Queue {} is declared", name);

                Queue::new(name)
            })
            .clone()
    }

    fn handle_get_queue(&self, name: &str) -> Result<ConsumerRef> {
        match self.queues.get(name) {
            Some(queue) => Ok(Arc::new(queue.clone())),
            None => StoreError::NotFound(name.to_owned()).into(),
        }
    }

    fn handle_get_queues(&self) -> Vec<QueueInfo> {
        let mut queues = self.queues.values().map(Queue::info).collect::<Vec<_>>();

        queues.sort_by(|a, b| a.name.cmp(&b.name));

        queues
    }

    fn handle_delete(&mut self, name: &str) -> Result<()> {
        match self.queues.remove(name) {
            Some(queue) => {
                info!("Queue {} is deleted", name);

                queue.close();

                Ok(())
            }
            None => StoreError::NotFound(name.to_owned()).into(),
        }
    }
}

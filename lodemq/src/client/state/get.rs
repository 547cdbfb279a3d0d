//! Transactional consumption with the `GET` command.
//!
//! `open` hands out the next item and the connection holds it until it sends `close`, which
//! acknowledges the item, or `abort`, which gives the item back to the queue for redelivery.
//! While an item is held, another `open` is refused.
use super::{Connection, Held};
use crate::client::command::{self, GetCommand, SubCommand};
use crate::error::{client_error, protocol_error, server_error};
use crate::queue::{manager as qm, ConsumerRef};
use crate::Result;
use lodemq_codec::frame::{self, Frame, Reply};
use log::{error, trace};

impl Connection {
    /// Handles a `GET` line. On success the reply is terminated by `END`, on failure only the
    /// error line is sent.
    pub async fn get(&mut self, input: &[String]) -> Result<Frame> {
        let cmd = command::parse_get(input)?;
        let mut replies = vec![];

        match &cmd.sub_command {
            SubCommand::Open => replies.extend(self.open(&cmd).await?),
            SubCommand::Close => self.close(&cmd).await?,
            SubCommand::CloseOpen => {
                self.close(&cmd).await?;
                replies.extend(self.open(&cmd).await?);
            }
            SubCommand::Abort => self.abort().await?,
            SubCommand::Peek => replies.extend(self.peek(&cmd).await?),
            SubCommand::Invalid(sub) => {
                trace!("Invalid subcommand {sub} on {}", self.id);

                return protocol_error("Invalid command");
            }
        }

        replies.push(Reply::End);

        Ok(Frame::Frames(replies))
    }

    /// Gives back the held item when the connection goes away, as if the client aborted it.
    pub async fn release(&mut self) {
        if !self.held.is_open() {
            return;
        }

        if let Err(e) = self.abort().await {
            error!("Held item of connection {} cannot be put back {:?}", self.id, e);

            // The connection doesn't hold the item any more, even if it is lost.
            self.release_open_read();
        }
    }

    /// Finds the queue or the consumer group of the queue the command refers to.
    async fn consumer(&self, cmd: &GetCommand) -> Result<ConsumerRef> {
        let result = match qm::get_queue(&self.qm, &cmd.queue_name).await {
            Ok(queue) => match &cmd.consumer_group {
                None => Ok(queue),
                Some(group) => queue.consumer_group(group),
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(consumer) => Ok(consumer),
            Err(e) => {
                error!("Can't get consumer {cmd}: {e}");

                server_error(&e.to_string())
            }
        }
    }

    async fn open(&mut self, cmd: &GetCommand) -> Result<Option<Reply>> {
        if self.held.is_open() {
            return client_error("Close current item first");
        }

        let consumer = self.consumer(cmd).await?;
        let next = consumer.get_next();

        self.stats.incr_cmd_get();

        match next {
            Some(item) => {
                trace!("Connection {} opened an item of {}", self.id, consumer.queue_name());

                consumer.stats().update_open_reads(1);

                let reply = frame::value(&cmd.queue_name, item.clone());

                self.held = Held::Open {
                    item,
                    command: cmd.clone(),
                    consumer,
                };

                Ok(Some(reply))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self, cmd: &GetCommand) -> Result<()> {
        self.consumer(cmd).await?;
        self.release_open_read();

        Ok(())
    }

    /// Gives the held item back to the queue or consumer group it was opened from. The queue
    /// named in the abort line is not used, so the open reads are released on the consumer
    /// which counted them.
    async fn abort(&mut self) -> Result<()> {
        let (item, origin) = match &self.held {
            Held::Idle => return Ok(()),
            Held::Open { item, command, .. } => (item.clone(), command.clone()),
        };

        let consumer = self.consumer(&origin).await?;

        if let Err(e) = consumer.put_back(item) {
            error!("Can't put back item to {origin}: {e}");

            return server_error(&e.to_string());
        }

        self.release_open_read();

        Ok(())
    }

    async fn peek(&mut self, cmd: &GetCommand) -> Result<Option<Reply>> {
        let consumer = self.consumer(cmd).await?;
        let next = consumer.peek();

        self.stats.incr_cmd_get();

        Ok(next.map(|item| frame::value(&cmd.queue_name, item)))
    }

    /// Drops the held item, if any, and decrements the open reads of the consumer it came from.
    fn release_open_read(&mut self) {
        if let Held::Open { consumer, .. } = std::mem::take(&mut self.held) {
            consumer.stats().update_open_reads(-1);
        }
    }
}

//! In-memory queue store.
//!
//! Items are kept in a log with a base offset. The plain consumers of the queue and every
//! consumer group have their own cursor into the log, so each group sees the whole stream
//! independently. Items are dropped from the front of the log when all the cursors passed them.
use super::{Consumer, ConsumerGroupInfo, ConsumerRef, QueueInfo, QueueStats};
use crate::error::StoreError;
use crate::Result;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The plain view of a queue. Cloning gives another handle to the same queue.
#[derive(Clone, Debug)]
pub struct Queue {
    inner: Arc<QueueInner>,
}

/// A named consumer group view over a queue.
#[derive(Debug)]
pub struct ConsumerGroup {
    name: String,
    queue: Arc<QueueInner>,
    stats: Arc<QueueStats>,
}

#[derive(Debug)]
struct QueueInner {
    name: String,
    stats: QueueStats,
    log: Mutex<Log>,
}

#[derive(Debug, Default)]
struct Log {
    /// A closed queue is deleted from the repository, it doesn't deliver anything.
    closed: bool,
    items: VecDeque<Bytes>,
    /// Offset of the first item in `items`.
    first_offset: u64,
    head: Cursor,
    groups: HashMap<String, Group>,
}

#[derive(Debug, Default)]
struct Cursor {
    /// Offset of the next item to be delivered from the log.
    offset: u64,
    /// Items put back by consumers, the last one is delivered first.
    returned: Vec<Bytes>,
}

#[derive(Debug)]
struct Group {
    cursor: Cursor,
    stats: Arc<QueueStats>,
}

impl Queue {
    pub fn new(name: &str) -> Self {
        Queue {
            inner: Arc::new(QueueInner {
                name: name.to_owned(),
                stats: QueueStats::default(),
                log: Mutex::new(Log::default()),
            }),
        }
    }

    /// Appends an item to the end of the queue.
    pub fn enqueue(&self, item: Bytes) -> Result<()> {
        let mut log = self.inner.lock();

        if log.closed {
            return StoreError::Closed(self.inner.name.clone()).into();
        }

        log.items.push_back(item);

        Ok(())
    }

    /// Number of items waiting for the plain consumers.
    pub fn len(&self) -> usize {
        let log = self.inner.lock();

        log.pending(&log.head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes the queue, outstanding handles won't get any item from that on.
    pub fn close(&self) {
        let mut log = self.inner.lock();

        log.closed = true;
        log.items.clear();
        log.head.returned.clear();
        log.groups.clear();
    }

    pub fn info(&self) -> QueueInfo {
        let log = self.inner.lock();

        let mut consumer_groups = log
            .groups
            .iter()
            .map(|(name, group)| ConsumerGroupInfo {
                name: name.clone(),
                items: log.pending(&group.cursor),
                open_reads: group.stats.open_reads(),
            })
            .collect::<Vec<_>>();
        consumer_groups.sort_by(|a, b| a.name.cmp(&b.name));

        QueueInfo {
            name: self.inner.name.clone(),
            items: log.pending(&log.head),
            open_reads: self.inner.stats.open_reads(),
            consumer_groups,
        }
    }
}

impl QueueInner {
    fn lock(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_next(&self, group: Option<&str>) -> Option<Bytes> {
        self.lock().next(group)
    }

    fn peek(&self, group: Option<&str>) -> Option<Bytes> {
        self.lock().peek(group)
    }

    fn put_back(&self, group: Option<&str>, item: Bytes) -> Result<()> {
        let mut log = self.lock();

        if log.closed {
            return StoreError::Closed(self.name.clone()).into();
        }

        let cursor = match group {
            None => &mut log.head,
            Some(name) => &mut log.group(name).cursor,
        };

        cursor.returned.push(item);

        Ok(())
    }

    fn consumer_group(self: &Arc<Self>, name: &str) -> Result<ConsumerRef> {
        let mut log = self.lock();

        if log.closed {
            return StoreError::Closed(self.name.clone()).into();
        }

        let stats = log.group(name).stats.clone();

        Ok(Arc::new(ConsumerGroup {
            name: name.to_owned(),
            queue: self.clone(),
            stats,
        }))
    }
}

impl Log {
    fn next(&mut self, group: Option<&str>) -> Option<Bytes> {
        if self.closed {
            return None;
        }

        let Log {
            items,
            first_offset,
            head,
            groups,
            ..
        } = &mut *self;

        let cursor = match group {
            None => head,
            Some(name) => &mut groups.get_mut(name)?.cursor,
        };

        let item = match cursor.returned.pop() {
            Some(item) => item,
            None => {
                let item = items.get((cursor.offset - *first_offset) as usize)?.clone();
                cursor.offset += 1;
                item
            }
        };

        self.trim();

        Some(item)
    }

    fn peek(&self, group: Option<&str>) -> Option<Bytes> {
        if self.closed {
            return None;
        }

        let cursor = match group {
            None => &self.head,
            Some(name) => &self.groups.get(name)?.cursor,
        };

        match cursor.returned.last() {
            Some(item) => Some(item.clone()),
            None => self.items.get((cursor.offset - self.first_offset) as usize).cloned(),
        }
    }

    /// Gets or creates a group. A new group starts from the oldest item kept in the log.
    fn group(&mut self, name: &str) -> &mut Group {
        let first_offset = self.first_offset;

        self.groups.entry(name.to_owned()).or_insert_with(|| Group {
            cursor: Cursor {
                offset: first_offset,
                returned: vec![],
            },
            stats: Arc::new(QueueStats::default()),
        })
    }

    fn pending(&self, cursor: &Cursor) -> usize {
        let end = self.first_offset + self.items.len() as u64;

        cursor.returned.len() + (end - cursor.offset) as usize
    }

    /// Drops the items which were passed by all the cursors.
    fn trim(&mut self) {
        let min_offset = self
            .groups
            .values()
            .map(|g| g.cursor.offset)
            .fold(self.head.offset, u64::min);

        while self.first_offset < min_offset && self.items.pop_front().is_some() {
            self.first_offset += 1;
        }
    }
}

impl Consumer for Queue {
    fn queue_name(&self) -> &str {
        &self.inner.name
    }

    fn get_next(&self) -> Option<Bytes> {
        self.inner.get_next(None)
    }

    fn peek(&self) -> Option<Bytes> {
        self.inner.peek(None)
    }

    fn put_back(&self, item: Bytes) -> Result<()> {
        self.inner.put_back(None, item)
    }

    fn stats(&self) -> &QueueStats {
        &self.inner.stats
    }

    fn consumer_group(&self, name: &str) -> Result<ConsumerRef> {
        self.inner.consumer_group(name)
    }
}

impl Consumer for ConsumerGroup {
    fn queue_name(&self) -> &str {
        &self.queue.name
    }

    fn get_next(&self) -> Option<Bytes> {
        self.queue.get_next(Some(&self.name))
    }

    fn peek(&self) -> Option<Bytes> {
        self.queue.peek(Some(&self.name))
    }

    fn put_back(&self, item: Bytes) -> Result<()> {
        self.queue.put_back(Some(&self.name), item)
    }

    fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Sibling group of the same queue.
    fn consumer_group(&self, name: &str) -> Result<ConsumerRef> {
        self.queue.consumer_group(name)
    }
}

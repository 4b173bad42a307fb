//! Range scan - a pull-based iterator over a background producer.
//!
//! The producer thread hands pairs over a zero-capacity channel, so it
//! suspends until the consumer asks for the next pair. Closing (or dropping)
//! the scan disconnects the channel, which wakes a suspended producer, and
//! then joins it: an abandoned scan never leaves a thread behind.

use std::iter::FusedIterator;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{trace, warn};

use crate::common::Result;
use crate::index::KeyValuePair;

/// Ascending stream of key-value pairs.
///
/// # Example
/// ```
/// use btree_store::index::{IndexStore, MapIndex};
///
/// let index = MapIndex::new();
/// index.insert(2, 20).unwrap();
/// index.insert(1, 10).unwrap();
///
/// let keys: Vec<u64> = index.scan(0, 10).unwrap().map(|kv| kv.key).collect();
/// assert_eq!(keys, vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct RangeScan {
    rx: Option<Receiver<KeyValuePair>>,
    producer: Option<JoinHandle<()>>,
}

impl RangeScan {
    /// A scan that yields nothing and owns no producer.
    pub fn empty() -> Self {
        Self {
            rx: None,
            producer: None,
        }
    }

    /// Stream `pairs` in the given order from a producer thread.
    ///
    /// The caller is responsible for ordering; index stores pass pairs that
    /// are already sorted and filtered to the requested range.
    ///
    /// # Errors
    /// Returns `Error::Io` if the producer thread cannot be spawned.
    pub fn from_sorted(pairs: Vec<KeyValuePair>) -> Result<Self> {
        if pairs.is_empty() {
            return Ok(Self::empty());
        }

        let (tx, rx) = mpsc::sync_channel(0);
        let producer = thread::Builder::new()
            .name("range-scan".into())
            .spawn(move || {
                for pair in pairs {
                    if tx.send(pair).is_err() {
                        trace!("range scan abandoned by consumer");
                        break;
                    }
                }
            })?;

        Ok(Self {
            rx: Some(rx),
            producer: Some(producer),
        })
    }

    /// Stop the scan and release its producer.
    ///
    /// Idempotent. After `close`, `next` returns `None`.
    pub fn close(&mut self) {
        // Dropping the receiver first unblocks a producer parked in send().
        self.rx.take();

        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                warn!("range scan producer panicked");
            }
        }
    }

    /// Check if the scan has finished or been closed.
    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }
}

impl Iterator for RangeScan {
    type Item = KeyValuePair;

    fn next(&mut self) -> Option<KeyValuePair> {
        let next = self.rx.as_ref()?.recv().ok();
        if next.is_none() {
            self.close();
        }
        next
    }
}

impl FusedIterator for RangeScan {}

impl Drop for RangeScan {
    fn drop(&mut self) {
        self.close();
    }
}

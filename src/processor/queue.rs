//! FIFO holding area for transactions awaiting an operator decision.
//!
//! The intake handler only appends at the tail; the decision loop only peeks
//! at and removes the head. The lock is held for O(1) work and never across
//! the operator prompt.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::handle::CompletionHandle;
use crate::errors::ResolveError;
use crate::models::decision::ProcessorOutcome;

/// A queued transaction together with the handle of its waiting caller.
#[derive(Debug)]
pub struct PendingEntry {
    /// Process-local arrival number. Caller ids are not unique, this is.
    pub seq: u64,
    pub id: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    handle: CompletionHandle,
}

impl PendingEntry {
    pub fn waited(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.enqueued_at
    }
}

/// Read-only copy of the head entry, handed to the decision source.
#[derive(Debug, Clone)]
pub struct HeadSnapshot {
    pub seq: u64,
    pub id: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    /// The waiting caller had already dropped its request when peeked.
    pub caller_gone: bool,
}

impl HeadSnapshot {
    /// Whole seconds since arrival.
    pub fn waited_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.enqueued_at).num_seconds().max(0)
    }
}

/// Result of appending to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enqueued {
    pub seq: u64,
    /// Queue length including the new entry.
    pub queue_len: usize,
}

/// What happened when the head entry was resolved and removed.
#[derive(Debug)]
pub struct Resolution {
    pub seq: u64,
    pub id: String,
    pub waited: chrono::Duration,
    pub delivery: Result<(), ResolveError>,
}

#[derive(Default)]
struct QueueInner {
    entries: VecDeque<PendingEntry>,
    next_seq: u64,
}

/// Shared, cheaply-cloneable pending queue.
#[derive(Clone, Default)]
pub struct PendingQueue(Arc<Mutex<QueueInner>>);

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry at the tail. The handle is owned by the entry from
    /// here on.
    pub async fn push(
        &self,
        id: String,
        payload: serde_json::Value,
        handle: CompletionHandle,
    ) -> Enqueued {
        let mut inner = self.0.lock().await;
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.entries.push_back(PendingEntry {
            seq,
            id,
            payload,
            enqueued_at: Utc::now(),
            handle,
        });
        Enqueued {
            seq,
            queue_len: inner.entries.len(),
        }
    }

    /// Non-destructive look at the head.
    pub async fn peek_head(&self) -> Option<HeadSnapshot> {
        let inner = self.0.lock().await;
        inner.entries.front().map(|e| HeadSnapshot {
            seq: e.seq,
            id: e.id.clone(),
            payload: e.payload.clone(),
            enqueued_at: e.enqueued_at,
            caller_gone: e.handle.is_caller_gone(),
        })
    }

    /// Resolve the head's handle, then remove the head, in one critical
    /// section. Returns `None` if the queue is empty or the head is no longer
    /// the entry `seq` that was displayed.
    ///
    /// The entry is removed whether or not delivery succeeded.
    pub async fn resolve_head(&self, seq: u64, outcome: ProcessorOutcome) -> Option<Resolution> {
        let mut inner = self.0.lock().await;
        let head = inner.entries.front_mut()?;
        if head.seq != seq {
            tracing::error!(
                expected = seq,
                found = head.seq,
                "queue head changed while awaiting decision"
            );
            return None;
        }

        let delivery = head.handle.resolve(outcome);
        let entry = inner.entries.pop_front()?;
        Some(Resolution {
            seq: entry.seq,
            id: entry.id.clone(),
            waited: entry.waited(Utc::now()),
            delivery,
        })
    }

    /// Drop every pending entry without a decision. Each waiting caller sees
    /// its handle vanish and answers 503. Only for when the decision loop is
    /// gone for good.
    pub async fn abandon_all(&self) -> usize {
        let mut inner = self.0.lock().await;
        let dropped = inner.entries.len();
        inner.entries.clear();
        dropped
    }

    pub async fn len(&self) -> usize {
        self.0.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.lock().await.entries.is_empty()
    }

    /// Ids in arrival order (for diagnostics).
    pub async fn snapshot(&self) -> Vec<String> {
        self.0
            .lock()
            .await
            .entries
            .iter()
            .map(|e| e.id.clone())
            .collect()
    }
}

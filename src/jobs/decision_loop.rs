//! Background job: present the queue head to the operator, one entry per tick.
//!
//! Two states. Idle: the queue is empty and a tick does nothing. Awaiting
//! decision: the head is shown, the loop waits (unbounded) for one answer,
//! resolves the head's completion handle and removes it. A decision source
//! that fails counts as a rejection; nothing is retried. Appends keep
//! landing at the tail meanwhile; they are seen on later ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::errors::ResolveError;
use crate::models::decision::Decision;
use crate::processor::{DecisionSource, PendingQueue};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Queue was empty. No prompt, no side effects.
    Idle,
    /// The head was decided, resolved and removed.
    Resolved {
        seq: u64,
        id: String,
        decision: Decision,
        /// False when the caller had already gone away.
        delivered: bool,
    },
    /// The head changed under the loop; nothing was resolved.
    Deferred,
}

pub struct DecisionLoop {
    queue: PendingQueue,
    source: Arc<dyn DecisionSource>,
    tick: Duration,
}

impl DecisionLoop {
    pub fn new(queue: PendingQueue, source: Arc<dyn DecisionSource>, tick: Duration) -> Self {
        Self {
            queue,
            source,
            tick,
        }
    }

    /// Spawn the loop. Call this once per queue.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval(self.tick);
            // an operator answer can take minutes; don't burst afterwards
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.run_once().await;
            }
        })
    }

    /// One tick: process exactly the current head, if any.
    pub async fn run_once(&self) -> TickOutcome {
        let Some(head) = self.queue.peek_head().await else {
            return TickOutcome::Idle;
        };

        if head.caller_gone {
            tracing::warn!(
                id = %head.id,
                seq = head.seq,
                "caller already disconnected, asking anyway to keep arrival order"
            );
        }

        // No retries: an operator that cannot answer rejects.
        let decision = match self.source.decide(&head).await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(
                    id = %head.id,
                    seq = head.seq,
                    "no operator answer, rejecting transaction: {}",
                    e
                );
                Decision::Reject
            }
        };

        let Some(resolution) = self.queue.resolve_head(head.seq, decision.outcome()).await else {
            return TickOutcome::Deferred;
        };

        let waited_secs = resolution.waited.num_seconds();
        match decision {
            Decision::Approve => tracing::info!(
                id = %resolution.id,
                seq = resolution.seq,
                waited_secs,
                "✅ Transacción {} APROBADA",
                resolution.id
            ),
            Decision::Reject => tracing::info!(
                id = %resolution.id,
                seq = resolution.seq,
                waited_secs,
                "❌ Transacción {} RECHAZADA",
                resolution.id
            ),
        }

        let delivered = match resolution.delivery {
            Ok(()) => {
                tracing::debug!(id = %resolution.id, "caller notified");
                true
            }
            Err(ResolveError::CallerGone) => {
                tracing::warn!(
                    id = %resolution.id,
                    seq = resolution.seq,
                    "caller disconnected before the decision, response dropped"
                );
                false
            }
            Err(ResolveError::AlreadyResolved) => {
                tracing::error!(
                    id = %resolution.id,
                    seq = resolution.seq,
                    "completion handle was already resolved, entry discarded"
                );
                false
            }
        };

        let remaining = self.queue.len().await;
        if remaining == 0 {
            tracing::info!("Esperando nuevas transacciones...");
        } else {
            tracing::info!(remaining, "transactions still pending");
        }

        TickOutcome::Resolved {
            seq: resolution.seq,
            id: resolution.id,
            decision,
            delivered,
        }
    }
}

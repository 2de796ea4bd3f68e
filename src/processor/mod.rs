//! Pending-transaction queue with externally gated resolution.
//!
//! 1. The intake handler wraps the caller in a [`CompletionHandle`] and
//!    appends a [`PendingEntry`] to the [`PendingQueue`].
//! 2. The decision loop ([`crate::jobs::decision_loop`]) peeks at the head,
//!    asks a [`DecisionSource`] and resolves the handle.
//! 3. The head is removed in the same critical section as its resolution.

pub mod handle;
pub mod operator;
pub mod queue;

pub use handle::{CompletionHandle, OutcomeReceiver};
pub use operator::{ConsoleOperator, DecisionSource, ScriptedOperator};
pub use queue::{Enqueued, HeadSnapshot, PendingEntry, PendingQueue, Resolution};

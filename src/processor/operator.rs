//! Decision sources: where approve/reject verdicts come from.
//!
//! The decision loop only sees the [`DecisionSource`] trait. The terminal
//! prompt is one implementation; [`ScriptedOperator`] feeds answers from a
//! channel and is used wherever no human is at the keyboard.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};

use super::queue::HeadSnapshot;
use crate::errors::OperatorError;
use crate::models::decision::Decision;
use crate::models::transaction::TransactionView;

#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// Present `head` to the operator and wait for exactly one answer.
    async fn decide(&self, head: &HeadSnapshot) -> Result<Decision, OperatorError>;
}

/// Operator at this process's terminal. Reads one line of stdin per prompt.
#[derive(Debug, Default, Clone)]
pub struct ConsoleOperator;

impl ConsoleOperator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecisionSource for ConsoleOperator {
    async fn decide(&self, head: &HeadSnapshot) -> Result<Decision, OperatorError> {
        let prompt = render_prompt(head, Utc::now());

        // stdin is blocking; keep it off the runtime's worker threads
        let line = tokio::task::spawn_blocking(move || -> Result<String, OperatorError> {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
            drop(stdout);

            let mut line = String::new();
            // EOF reads as an empty answer, which rejects
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| OperatorError::Io(std::io::Error::other(e)))??;

        Ok(Decision::from_operator_input(&line))
    }
}

/// The block shown to the operator for the current head.
pub fn render_prompt(head: &HeadSnapshot, now: DateTime<Utc>) -> String {
    let view = TransactionView::from_payload(&head.payload);
    format!(
        "\n=== TRANSACCIÓN PENDIENTE DE APROBACIÓN ===\n\
         ID: {}\n\
         Monto: {} {}\n\
         Tarjeta: {}\n\
         Tiempo en espera: {} segundos\n\
         \n¿Aprobar transacción? (s/n): ",
        head.id,
        view.amount,
        view.currency,
        view.masked_card,
        head.waited_secs(now)
    )
}

/// Test double and headless operator: answers come from a channel, one line
/// per prompt, parsed with the same strict rule as the terminal.
///
/// Once the sender side is dropped and every queued answer has been used,
/// `decide` fails with [`OperatorError::InputClosed`].
pub struct ScriptedOperator {
    answers: Mutex<mpsc::UnboundedReceiver<String>>,
    prompted: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    /// An operator that blocks until an answer is sent.
    pub fn new() -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let op = Self {
            answers: Mutex::new(rx),
            prompted: Mutex::new(Vec::new()),
        };
        (op, tx)
    }

    /// An operator with a fixed list of answers.
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (op, tx) = Self::new();
        for answer in answers {
            // receiver is alive in `op`
            let _ = tx.send(answer.into());
        }
        op
    }

    /// Ids of every entry that was presented, in order.
    pub async fn prompted(&self) -> Vec<String> {
        self.prompted.lock().await.clone()
    }
}

#[async_trait]
impl DecisionSource for ScriptedOperator {
    async fn decide(&self, head: &HeadSnapshot) -> Result<Decision, OperatorError> {
        self.prompted.lock().await.push(head.id.clone());
        let answer = self
            .answers
            .lock()
            .await
            .recv()
            .await
            .ok_or(OperatorError::InputClosed)?;
        Ok(Decision::from_operator_input(&answer))
    }
}

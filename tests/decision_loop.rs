//! Decision loop behaviour against the pending queue, with a scripted
//! operator standing in for the terminal.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use procesador::jobs::decision_loop::{DecisionLoop, TickOutcome};
use procesador::models::decision::Decision;
use procesador::processor::{CompletionHandle, OutcomeReceiver, PendingQueue, ScriptedOperator};
use serde_json::json;
use tokio::sync::oneshot::error::TryRecvError;

async fn enqueue(queue: &PendingQueue, id: &str) -> OutcomeReceiver {
    let (handle, rx) = CompletionHandle::new();
    queue
        .push(
            id.to_string(),
            json!({
                "codigoUnicoTransaccion": id,
                "monto": 10,
                "moneda": "USD",
                "numeroTarjeta": "4111111111111111"
            }),
            handle,
        )
        .await;
    rx
}

fn decision_loop(queue: &PendingQueue, op: Arc<ScriptedOperator>) -> DecisionLoop {
    DecisionLoop::new(queue.clone(), op, Duration::from_millis(5))
}

async fn wait_until_prompted(op: &ScriptedOperator, n: usize) {
    for _ in 0..400 {
        if op.prompted().await.len() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("operator was never prompted {} times", n);
}

#[tokio::test]
async fn test_responses_delivered_in_arrival_order() {
    let queue = PendingQueue::new();
    let ids = ["T1", "T2", "T3", "T4", "T5"];
    let mut receivers = Vec::new();
    for id in ids {
        receivers.push(enqueue(&queue, id).await);
    }

    let answers = ["s", "n", "si", "", "SI"];
    let op = Arc::new(ScriptedOperator::with_answers(answers));
    let lp = decision_loop(&queue, op.clone());

    for (i, id) in ids.iter().enumerate() {
        match lp.run_once().await {
            TickOutcome::Resolved { id: got, delivered, .. } => {
                assert_eq!(&got, id);
                assert!(delivered);
            }
            other => panic!("tick {} did not resolve: {:?}", i, other),
        }
        assert_eq!(queue.len().await, ids.len() - i - 1);
    }

    let expected = [
        Decision::Approve,
        Decision::Reject,
        Decision::Approve,
        Decision::Reject,
        Decision::Approve,
    ];
    for (rx, decision) in receivers.into_iter().zip(expected) {
        assert_eq!(rx.await.unwrap(), decision.outcome());
    }
    assert_eq!(op.prompted().await, ids.to_vec());
    assert_eq!(lp.run_once().await, TickOutcome::Idle);
}

#[tokio::test]
async fn test_approval_and_rejection_outcomes() {
    let queue = PendingQueue::new();
    let approved = enqueue(&queue, "OK-1").await;
    let rejected = enqueue(&queue, "NO-1").await;

    let op = Arc::new(ScriptedOperator::with_answers(["Si", "yes"]));
    let lp = decision_loop(&queue, op);
    lp.run_once().await;
    lp.run_once().await;

    let ok = approved.await.unwrap();
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body.estado, "APROBADA");
    assert_eq!(ok.body.codigo, "00");

    let no = rejected.await.unwrap();
    assert_eq!(no.status, StatusCode::BAD_REQUEST);
    assert_eq!(no.body.estado, "RECHAZADA");
    assert_eq!(no.body.codigo, "01");
}

#[tokio::test]
async fn test_resolved_entry_is_never_presented_again() {
    let queue = PendingQueue::new();
    let _rx = enqueue(&queue, "ONCE").await;

    let op = Arc::new(ScriptedOperator::with_answers(["s", "s", "s"]));
    let lp = decision_loop(&queue, op.clone());
    assert!(matches!(lp.run_once().await, TickOutcome::Resolved { .. }));
    assert_eq!(lp.run_once().await, TickOutcome::Idle);
    assert_eq!(lp.run_once().await, TickOutcome::Idle);
    assert_eq!(op.prompted().await, vec!["ONCE"]);
}

#[tokio::test]
async fn test_disconnected_caller_is_logged_and_dequeued() {
    let queue = PendingQueue::new();
    let rx = enqueue(&queue, "GONE").await;
    let keep = enqueue(&queue, "STAYS").await;
    drop(rx);

    let op = Arc::new(ScriptedOperator::with_answers(["s", "n"]));
    let lp = decision_loop(&queue, op);

    match lp.run_once().await {
        TickOutcome::Resolved { id, delivered, .. } => {
            assert_eq!(id, "GONE");
            assert!(!delivered);
        }
        other => panic!("unexpected tick outcome: {:?}", other),
    }
    assert_eq!(queue.snapshot().await, vec!["STAYS"]);

    lp.run_once().await;
    assert_eq!(keep.await.unwrap().body.estado, "RECHAZADA");
}

#[tokio::test]
async fn test_arrivals_while_blocked_wait_their_turn() {
    let queue = PendingQueue::new();
    let first = enqueue(&queue, "HEAD").await;

    let (op, answers) = ScriptedOperator::new();
    let op = Arc::new(op);
    let lp = Arc::new(decision_loop(&queue, op.clone()));

    let tick = tokio::spawn({
        let lp = lp.clone();
        async move { lp.run_once().await }
    });
    wait_until_prompted(&op, 1).await;

    // Two arrivals while the operator is looking at HEAD.
    let (mut second, mut third) = tokio::join!(
        enqueue(&queue, "SECOND"),
        async {
            tokio::task::yield_now().await;
            enqueue(&queue, "THIRD").await
        }
    );
    assert_eq!(queue.snapshot().await, vec!["HEAD", "SECOND", "THIRD"]);
    assert_eq!(second.try_recv().unwrap_err(), TryRecvError::Empty);
    assert_eq!(third.try_recv().unwrap_err(), TryRecvError::Empty);

    answers.send("s".into()).unwrap();
    assert!(matches!(tick.await.unwrap(), TickOutcome::Resolved { .. }));
    assert_eq!(first.await.unwrap().body.estado, "APROBADA");
    assert_eq!(second.try_recv().unwrap_err(), TryRecvError::Empty);

    answers.send("n".into()).unwrap();
    answers.send("si".into()).unwrap();
    lp.run_once().await;
    lp.run_once().await;

    assert_eq!(second.await.unwrap().body.estado, "RECHAZADA");
    assert_eq!(third.await.unwrap().body.estado, "APROBADA");
    assert_eq!(op.prompted().await, vec!["HEAD", "SECOND", "THIRD"]);
}

#[tokio::test]
async fn test_spawned_loop_drains_queue_on_ticks() {
    let queue = PendingQueue::new();
    let a = enqueue(&queue, "A").await;
    let b = enqueue(&queue, "B").await;

    let op = Arc::new(ScriptedOperator::with_answers(["s", "n"]));
    let job = decision_loop(&queue, op).spawn();

    let a = tokio::time::timeout(Duration::from_secs(2), a).await.unwrap().unwrap();
    let b = tokio::time::timeout(Duration::from_secs(2), b).await.unwrap().unwrap();
    assert_eq!(a.body.estado, "APROBADA");
    assert_eq!(b.body.estado, "RECHAZADA");
    assert!(queue.is_empty().await);
    job.abort();
}

#[tokio::test]
async fn test_closed_operator_rejects_once_and_moves_on() {
    let queue = PendingQueue::new();
    let rx = enqueue(&queue, "NO-INPUT").await;

    let op = Arc::new(ScriptedOperator::with_answers(Vec::<String>::new()));
    let job = decision_loop(&queue, op.clone()).spawn();

    let outcome = tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("caller must get an answer when the operator input is closed")
        .unwrap();
    assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
    assert_eq!(outcome.body.estado, "RECHAZADA");
    assert!(queue.is_empty().await);

    // further ticks find nothing to ask about
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(op.prompted().await, vec!["NO-INPUT"]);
    job.abort();
}

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::ProcessorState;
use crate::errors::AppError;
use crate::models::decision::ProcessorOutcome;
use crate::models::transaction::TransactionView;
use crate::processor::CompletionHandle;

/// Intake handler. Enqueues the transaction and holds the response open
/// until the decision loop resolves its completion handle.
///
/// Nothing in the body is validated.
pub async fn procesar_pago(
    State(state): State<Arc<ProcessorState>>,
    Json(payload): Json<Value>,
) -> Result<ProcessorOutcome, AppError> {
    let view = TransactionView::from_payload(&payload);

    tracing::info!(
        id = %view.id,
        pos = %view.pos,
        comercio = %view.merchant,
        tipo = %view.kind,
        marca = %view.brand,
        modalidad = %view.modality,
        monto = %view.amount,
        moneda = %view.currency,
        tarjeta = %view.masked_card,
        titular = %view.holder,
        "=== NUEVA TRANSACCIÓN RECIBIDA ==="
    );
    tracing::debug!(
        "JSON completo recibido:\n{}",
        serde_json::to_string_pretty(&payload).unwrap_or_default()
    );

    let (handle, rx) = CompletionHandle::new();
    let enqueued = state.queue.push(view.id.clone(), payload, handle).await;

    let estimated_secs = enqueued.queue_len as u64 * state.wait_per_item_secs;
    tracing::info!(
        id = %view.id,
        seq = enqueued.seq,
        queue_len = enqueued.queue_len,
        estimated_secs,
        "Esperando decisión para transacción ID: {} (tiempo estimado de respuesta: {} segundos)",
        view.id,
        estimated_secs
    );

    // Dropped sender without a send: the decision loop is gone.
    rx.await.map_err(|_| AppError::DecisionUnavailable)
}

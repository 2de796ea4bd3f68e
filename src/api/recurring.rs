use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RecurringState;

#[derive(Debug, Serialize, Deserialize)]
pub struct RecurringAck {
    pub estado: String,
    pub mensaje: String,
    #[serde(rename = "idRecurrencia")]
    pub id_recurrencia: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub estado: String,
    pub mensaje: String,
}

/// Always acknowledges. No queueing, no operator.
pub async fn recibir_recurrente(
    State(state): State<Arc<RecurringState>>,
    Json(payload): Json<Value>,
) -> Json<RecurringAck> {
    let n = state.received.fetch_add(1, Ordering::Relaxed) + 1;
    let now = chrono::Utc::now();

    tracing::info!(
        numero = n,
        recibida = %now.to_rfc3339(),
        "=== NUEVA TRANSACCIÓN RECURRENTE RECIBIDA ==="
    );
    tracing::debug!(
        "Datos recibidos completos:\n{}",
        serde_json::to_string_pretty(&payload).unwrap_or_default()
    );

    Json(RecurringAck {
        estado: "RECIBIDA".to_string(),
        mensaje: "Transacción recurrente registrada correctamente".to_string(),
        id_recurrencia: recurrence_id(now),
    })
}

pub async fn ping() -> Json<PingResponse> {
    tracing::info!("Ping recibido - Servicio funcionando correctamente");
    Json(PingResponse {
        estado: "OK".to_string(),
        mensaje: "Servicio de transacciones recurrentes activo".to_string(),
    })
}

fn recurrence_id(at: chrono::DateTime<chrono::Utc>) -> String {
    format!("REC-{}", at.timestamp_millis())
}

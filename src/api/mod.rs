use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::processor::PendingQueue;

pub mod payments;
pub mod recurring;

/// State of the payment processor service. Owns the pending queue; the
/// decision loop gets a clone of the same queue handle.
pub struct ProcessorState {
    pub queue: PendingQueue,
    /// Seconds per queued item in the informational wait estimate.
    pub wait_per_item_secs: u64,
}

impl ProcessorState {
    pub fn new(queue: PendingQueue, wait_per_item_secs: u64) -> Self {
        Self {
            queue,
            wait_per_item_secs,
        }
    }
}

/// State of the recurring-transaction service. Shares nothing with
/// [`ProcessorState`].
#[derive(Default)]
pub struct RecurringState {
    /// Notifications received since startup.
    pub received: AtomicU64,
}

/// `POST /procesar-pago`, answered only once the operator decides.
pub fn processor_router(state: Arc<ProcessorState>, body_limit: usize) -> Router {
    Router::new()
        .route("/procesar-pago", post(payments::procesar_pago))
        .fallback(fallback_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
}

/// Accept-and-acknowledge recurring notifications plus a ping.
pub fn recurring_router(state: Arc<RecurringState>, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/v1/transacciones-recurrentes",
            post(recurring::recibir_recurrente),
        )
        .route("/v1/transacciones-recurrentes/ping", get(recurring::ping))
        .fallback(fallback_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

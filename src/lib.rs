//! Procesador de pagos de prueba — library crate.
//!
//! A manual-approval payment simulator: `POST /procesar-pago` stays open
//! until an operator approves or rejects it, while a separate service
//! acknowledges recurring-transaction notifications immediately.
//! Re-exports every module so integration tests in `tests/` can drive it.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod processor;

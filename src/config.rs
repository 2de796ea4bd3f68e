use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port of the payment processor (`POST /procesar-pago`).
    pub processor_port: u16,
    /// Port of the recurring-transaction service.
    pub recurring_port: u16,
    /// Decision Loop tick in milliseconds.
    /// Set via PROCESADOR_TICK_MS env var. Default: 1000.
    pub tick_ms: u64,
    /// Seconds added to the wait estimate for each queued transaction.
    /// Purely informational. Default: 10.
    pub wait_per_item_secs: u64,
    /// Maximum accepted request body in bytes.
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processor_port: 3000,
            recurring_port: 3001,
            tick_ms: 1000,
            wait_per_item_secs: 10,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = Config::default();

    Ok(Config {
        processor_port: env_or("PROCESADOR_PORT", defaults.processor_port),
        recurring_port: env_or("RECURRENTES_PORT", defaults.recurring_port),
        tick_ms: env_or("PROCESADOR_TICK_MS", defaults.tick_ms),
        wait_per_item_secs: env_or(
            "PROCESADOR_ESPERA_POR_TRANSACCION_SECS",
            defaults.wait_per_item_secs,
        ),
        body_limit_bytes: env_or("PROCESADOR_BODY_LIMIT_BYTES", defaults.body_limit_bytes),
    })
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use procesador::api::{self, ProcessorState, RecurringState};
use procesador::cli;
use procesador::config::{self, Config};
use procesador::jobs::decision_loop::DecisionLoop;
use procesador::processor::{ConsoleOperator, PendingQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "procesador=debug,procesador_sim=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve {
            processor_port,
            recurring_port,
        }) => {
            let p = processor_port.unwrap_or(cfg.processor_port);
            let r = recurring_port.unwrap_or(cfg.recurring_port);
            serve_both(&cfg, p, r).await
        }
        Some(cli::Commands::Processor { port }) => {
            run_processor(&cfg, port.unwrap_or(cfg.processor_port)).await
        }
        Some(cli::Commands::Recurring { port }) => {
            run_recurring(&cfg, port.unwrap_or(cfg.recurring_port)).await
        }
        None => serve_both(&cfg, cfg.processor_port, cfg.recurring_port).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn serve_both(cfg: &Config, processor_port: u16, recurring_port: u16) -> anyhow::Result<()> {
    tokio::try_join!(
        run_processor(cfg, processor_port),
        run_recurring(cfg, recurring_port),
    )?;
    Ok(())
}

async fn run_processor(cfg: &Config, port: u16) -> anyhow::Result<()> {
    let queue = PendingQueue::new();
    let state = Arc::new(ProcessorState::new(queue.clone(), cfg.wait_per_item_secs));

    let decision_job =
        DecisionLoop::new(queue.clone(), Arc::new(ConsoleOperator::new()), cfg.tick()).spawn();
    tracing::info!(tick_ms = cfg.tick_ms, "Decision loop started");

    let app = api::processor_router(state, cfg.body_limit_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("===================================================");
    println!("=== PROCESADOR DE PAGOS DE PRUEBA (SIMULACIÓN) ===");
    println!("===================================================");
    println!("Servidor iniciado en http://localhost:{}", port);
    println!("Ruta de procesamiento: http://localhost:{}/procesar-pago", port);
    println!("\nLas transacciones recibidas permanecerán en espera hasta");
    println!("que usted decida aprobarlas o rechazarlas desde esta terminal.");
    println!("\nEsperando transacciones...");

    tracing::info!("payment processor listening on {}", addr);

    // Without the loop nobody would ever answer the queued callers.
    tokio::select! {
        served = axum::serve(listener, app).into_future() => served?,
        ended = decision_job => {
            let dropped = queue.abandon_all().await;
            tracing::error!(dropped, "decision loop stopped, pending callers answered 503");
            ended?;
            anyhow::bail!("decision loop stopped unexpectedly");
        }
    }
    Ok(())
}

async fn run_recurring(cfg: &Config, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(RecurringState::default());
    let app = api::recurring_router(state, cfg.body_limit_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("========================================================");
    println!("=== SERVICIO DE TRANSACCIONES RECURRENTES DE PRUEBA ===");
    println!("========================================================");
    println!("Servidor iniciado en http://localhost:{}", port);
    println!(
        "Ruta de recepción: http://localhost:{}/v1/transacciones-recurrentes",
        port
    );
    println!(
        "Ping de verificación: http://localhost:{}/v1/transacciones-recurrentes/ping",
        port
    );

    tracing::info!("recurring-transaction service listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

use clap::{Parser, Subcommand};

/// Procesador de pagos de prueba — manual approval payment simulator
#[derive(Parser)]
#[command(name = "procesador-sim", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run both services, each on its own port
    Serve {
        /// Payment processor port
        #[arg(long, env = "PROCESADOR_PORT")]
        processor_port: Option<u16>,
        /// Recurring-transaction service port
        #[arg(long, env = "RECURRENTES_PORT")]
        recurring_port: Option<u16>,
    },

    /// Run only the payment processor (operator prompt on this terminal)
    Processor {
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run only the recurring-transaction service
    Recurring {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

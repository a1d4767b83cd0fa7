//! Ticket Gate operator console.
//!
//! One check-in station on the terminal. Codes come from the reader at
//! `GATE_SCANNER_DEVICE` (via the `scan` command) or are typed on stdin.
//!
//! # Usage
//!
//! ```bash
//! GATE_SEED_DEMO=true cargo run --bin console
//! ```

use ticket_gate::{Config, Console, ResourceManager};
use tokio::io::{BufReader, stdin, stdout};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they do not interleave with the console output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,ticket_gate=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let resources = ResourceManager::from_config(&config).await?;

    let scanner = resources.scanner();
    if scanner.is_none() {
        tracing::info!("No GATE_SCANNER_DEVICE set, manual input only");
    }

    let mut console = Console::new(resources.station(), scanner, stdout());
    console.run(BufReader::new(stdin())).await?;

    Ok(())
}

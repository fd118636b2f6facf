#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front-end for the crime advice application.
//!
//! ```text
//! crime_advice [--server-url http://127.0.0.1:8080] [--delay-ms 1500]
//! crime_advice --local
//! crime_advice serve [--no-prompt]
//! ```
//!
//! With no subcommand, runs the city/business conversation against a
//! server (or in-process with `--local`) and reports where the map view
//! moved after each answer.
//!
//! Uses `indicatif-log-bridge` (via [`crime_advice_cli_utils::init_logger`])
//! so log lines and the loading spinner never fight for the terminal.

mod chat;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crime_advice_advisor::{Advisor, AdvisorConfig, http_client};
use crime_advice_conversation::{AdviceClient, HttpAdviceClient, LocalAdviceClient};
use crime_advice_map::PoliceAreas;

/// Environment variable overriding the pause before advice is shown.
const DELAY_ENV: &str = "ADVICE_DELAY_MS";

#[derive(Parser)]
#[command(
    name = "crime_advice",
    about = "Security advice for a business, tailored to local crime rates"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of a running crime advice server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,

    /// Run the advice chain in this process instead of calling a server
    #[arg(long)]
    local: bool,

    /// Milliseconds to wait before showing advice [default: $ADVICE_DELAY_MS or 1500]
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Skip the bind address / port / provider prompts
        #[arg(long)]
        no_prompt: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_advice_cli_utils::init_logger();
    let cli = Cli::parse();

    if let Some(Commands::Serve { no_prompt }) = cli.command {
        // The server uses actix-web's runtime, so we need to run it
        // in a blocking task to avoid nesting tokio runtimes.
        tokio::task::spawn_blocking(move || {
            actix_web::rt::System::new().block_on(async move {
                if no_prompt {
                    crime_advice_server::run_server().await
                } else {
                    crime_advice_server::interactive::run().await
                }
            })
        })
        .await??;
        return Ok(());
    }

    let delay = Duration::from_millis(delay_ms(cli.delay_ms)?);

    let client: Arc<dyn AdviceClient> = if cli.local {
        log::info!("Running advice chain in-process");
        Arc::new(LocalAdviceClient::new(Advisor::from_env().await?))
    } else {
        let config = AdvisorConfig::from_env()?;
        let client = HttpAdviceClient::new(http_client(config.http_timeout)?, &cli.server_url);
        log::info!("Sending advice requests to {}", client.endpoint());
        Arc::new(client)
    };

    let areas = match PoliceAreas::from_env() {
        Ok(areas) => Some(areas),
        Err(e) => {
            log::warn!("Police area boundaries unavailable, regions will not be shown: {e}");
            None
        }
    };

    chat::run(&multi, client, delay, areas.as_ref()).await
}

/// Resolves the advice delay: flag, then `ADVICE_DELAY_MS`, then the
/// widget default.
fn delay_ms(flag: Option<u64>) -> Result<u64, Box<dyn std::error::Error>> {
    if let Some(ms) = flag {
        return Ok(ms);
    }
    match std::env::var(DELAY_ENV) {
        Ok(ms) => ms
            .parse()
            .map_err(|_| format!("Invalid {DELAY_ENV} '{ms}'").into()),
        Err(_) => Ok(u64::try_from(crime_advice_conversation::DEFAULT_DELAY.as_millis())
            .unwrap_or(1500)),
    }
}

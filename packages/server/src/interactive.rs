//! Interactive mode for the server.
//!
//! Prompts for the bind address, port and LLM provider before starting
//! the server.

use dialoguer::{Confirm, Input, Select};

/// Provider choices offered at startup. The first entry leaves
/// `AI_PROVIDER` untouched so the provider is auto-detected.
const PROVIDERS: &[&str] = &["auto-detect", "openai", "anthropic", "bedrock"];

/// Runs the server in interactive mode, prompting for configuration.
///
/// Sets `BIND_ADDR`, `PORT` and (unless auto-detect is chosen)
/// `AI_PROVIDER`, then delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Crime Advice Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(8080)
        .interact_text()
        .unwrap_or(8080);

    let current = std::env::var("AI_PROVIDER").ok();
    let default_idx = current
        .as_deref()
        .and_then(|p| PROVIDERS.iter().position(|c| *c == p))
        .unwrap_or(0);
    let provider_idx = Select::new()
        .with_prompt("LLM provider")
        .items(PROVIDERS)
        .default(default_idx)
        .interact()
        .unwrap_or(default_idx);

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", port.to_string());
        if provider_idx > 0 {
            std::env::set_var("AI_PROVIDER", PROVIDERS[provider_idx]);
        }
    }

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {bind_addr}:{port} ({})?",
            PROVIDERS[provider_idx]
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}

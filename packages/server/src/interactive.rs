//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, and any missing places API key
//! before starting the server.

use dialoguer::{Confirm, Input, Password};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Sets `BIND_ADDR`, `PORT`, and optionally `PLACES_API_KEY` from the
/// answers, then delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Homescope Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .validate_with(|p: &String| p.parse::<u16>().map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    let places_key = if std::env::var("PLACES_API_KEY").is_ok() {
        None
    } else {
        Password::new()
            .with_prompt("Places API key (leave empty to disable location search)")
            .allow_empty_password(true)
            .interact()
            .ok()
            .filter(|k| !k.is_empty())
    };

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        if let Some(key) = &places_key {
            std::env::set_var("PLACES_API_KEY", key);
        }
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}

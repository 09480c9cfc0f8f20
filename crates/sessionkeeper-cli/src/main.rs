//! Sessionkeeper - command-line shell around the session core.
//!
//! Runs the same start-up sequence a browser tab would: open the auth
//! channel, validate the current session, then act on the command given.
//!
//! Usage:
//!   sessionkeeper                       check the session, print user and role
//!   sessionkeeper --logout              log out (server, local state, other tabs)
//!   sessionkeeper --google-login        print the Google authorization URL
//!   sessionkeeper --oauth-error <code>  explain an OAuth callback error code or URL

use std::io;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sessionkeeper_core::auth::{check_oauth_error, oauth_error_message};
use sessionkeeper_core::config::DASHBOARD_PATH;
use sessionkeeper_core::{
    AuthBus, Config, MemoryNavigator, Navigation, Navigator, SessionContext, Url,
};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--oauth-error" {
        let Some(input) = args.get(2) else {
            bail!("--oauth-error needs an error code or callback URL");
        };
        return explain_oauth_error(input);
    }

    let config = Config::from_env()?;
    info!(api = %config.api_base_url, channel = %config.channel_name, "Sessionkeeper starting");

    let navigator = Arc::new(MemoryNavigator::new(DASHBOARD_PATH));
    let bus = AuthBus::new(&config.channel_name);
    let (context, _client) = SessionContext::connect(&config, navigator.clone(), &bus)?;

    match args.get(1).map(String::as_str) {
        None => {
            let authenticated = context.start().await;
            print_status(&context, authenticated);
        }
        Some("--logout") => {
            context.start().await;
            context.logout().await;
            println!("Logged out");
        }
        Some("--google-login") => {
            if let Err(e) = context.initiate_google_oauth().await {
                bail!("{}", e);
            }
            if let Some(Navigation::Redirect(url)) = navigator.history().last() {
                println!("Open this URL to sign in with Google:\n{}", url);
            }
        }
        Some(other) => bail!("Unknown argument: {}", other),
    }

    println!("Location: {}", navigator.current_path());
    Ok(())
}

fn print_status(context: &SessionContext, authenticated: bool) {
    println!("Recheck interval: {}s", context.validator().ttl().as_secs());
    if !authenticated {
        println!("Not signed in");
        return;
    }
    match context.store().user() {
        Some(user) => {
            println!("Signed in as {} <{}>", user.full_name(), user.email);
            println!("Role: {}", context.store().role().as_deref().unwrap_or("none"));
        }
        None => println!("Not signed in"),
    }
}

fn explain_oauth_error(input: &str) -> Result<()> {
    let message = match Url::parse(input) {
        Ok(url) => match check_oauth_error(&url) {
            Some(message) => message,
            None => {
                println!("No OAuth error in URL");
                return Ok(());
            }
        },
        Err(_) => oauth_error_message(input),
    };
    println!("{}", message);
    Ok(())
}

use anyhow::Result;
use std::sync::Arc;
use termnav_common::config::load_daemon_config;
use termnav_daemon::registry::TerminalRegistry;
use termnav_daemon::server::{serve, AppState};
use termnav_proc::CwdResolver;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_daemon_config()?;

    // Environment variable takes precedence over config file
    let listen_addr =
        std::env::var("TERMNAV_ADDR").unwrap_or_else(|_| config.listen_addr.clone());

    let state = AppState {
        registry: Arc::new(TerminalRegistry::new()),
        resolver: Arc::new(CwdResolver::new()),
    };

    tracing::info!("starting termnavd {} at {}", termnav_common::VERSION, listen_addr);
    serve(state, &listen_addr).await
}

use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod handshake;

use config::ProbeConfig;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let cfg = ProbeConfig::from_env().apply_args(std::env::args().skip(1));
    info!(host = %cfg.host, port = cfg.port, junk_bytes = cfg.junk_bytes, "starting handshake probe");

    match handshake::probe(&cfg).await {
        Ok(response) if response.is_empty() => {
            // accepted then closed without answering; distinct from a refusal
            println!("Server closed the connection without sending a response (0 bytes)");
        }
        Ok(response) => {
            println!("--- response ({} bytes) ---", response.len());
            println!("{}", String::from_utf8_lossy(&response));
        }
        Err(e) => {
            error!(error = %e, "probe failed");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

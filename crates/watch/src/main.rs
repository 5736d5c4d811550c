use dotenvy::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod client;
mod config;

use client::WatchError;
use config::WatchConfig;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let cfg = WatchConfig::from_env().apply_args(std::env::args().skip(1));

    if let Err(e) = client::run(&cfg).await {
        error!(error = %e, "telemetry watch failed");
        let code = match e {
            WatchError::Connect { .. } => 2,
            WatchError::Transport(_) => 3,
            WatchError::RecvTimeout(_) => 4,
        };
        std::process::exit(code);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tungstenite=warn"))
        .unwrap();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

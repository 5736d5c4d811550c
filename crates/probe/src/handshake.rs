use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::ProbeConfig;

pub const JUNK_HEADER_NAME: &str = "X-Junk";
pub const JUNK_FILLER: &str = "x";

/// Single-read capture limit. A longer response is truncated; for a
/// header-limit probe the interesting part is the status line anyway.
pub const RESPONSE_BUFFER_BYTES: usize = 4096;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {addr} refused or failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {addr} timed out")]
    ConnectTimeout { addr: String },
    #[error("transport error mid-probe: {0}")]
    Transport(#[from] std::io::Error),
}

/// Fresh Sec-WebSocket-Key: 16 random bytes, base64-encoded (24 chars).
/// Generated per probe, never reused.
pub fn generate_key() -> String {
    let nonce: [u8; 16] = rand::random();
    STANDARD.encode(nonce)
}

/// Hand-built Upgrade request: the standard WebSocket headers in fixed
/// order, then one oversized junk header to exercise the server's
/// header-parsing limits, then the terminating blank line.
pub fn build_request(host: &str, port: u16, key: &str, junk_bytes: usize) -> String {
    let mut request = String::with_capacity(192 + junk_bytes);
    request.push_str("GET / HTTP/1.1\r\n");
    request.push_str(&format!("Host: {host}:{port}\r\n"));
    request.push_str("Upgrade: websocket\r\n");
    request.push_str("Connection: Upgrade\r\n");
    request.push_str(&format!("Sec-WebSocket-Key: {key}\r\n"));
    request.push_str("Sec-WebSocket-Version: 13\r\n");
    request.push_str(&format!("{JUNK_HEADER_NAME}: "));
    request.push_str(&JUNK_FILLER.repeat(junk_bytes));
    request.push_str("\r\n\r\n");
    request
}

/// One-shot probe: connect, send the whole request in one write, read at
/// most one buffer of response bytes, close. A zero-length result means the
/// peer accepted the connection and closed without answering.
pub async fn probe(cfg: &ProbeConfig) -> Result<Vec<u8>, ProbeError> {
    let addr = format!("{}:{}", cfg.host, cfg.port);
    let key = generate_key();
    info!(%addr, junk_bytes = cfg.junk_bytes, "opening raw probe connection");

    let mut stream = timeout(cfg.connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| ProbeError::ConnectTimeout { addr: addr.clone() })?
        .map_err(|source| ProbeError::Connect {
            addr: addr.clone(),
            source,
        })?;

    let request = build_request(&cfg.host, cfg.port, &key, cfg.junk_bytes);
    println!("Sec-WebSocket-Key: {key}");
    debug!(request_bytes = request.len(), "sending upgrade request");
    stream.write_all(request.as_bytes()).await?;

    let mut buf = vec![0u8; RESPONSE_BUFFER_BYTES];
    let n = stream.read(&mut buf).await?;
    buf.truncate(n);

    let _ = stream.shutdown().await;
    Ok(buf)
}

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::signal;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use resdiag_core::{raw_preview, TelemetryFrame};

use crate::config::WatchConfig;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("websocket connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },
    #[error("transport error mid-stream: {0}")]
    Transport(#[from] WsError),
    #[error("no message received within {0:?}")]
    RecvTimeout(Duration),
}

/// Connect once and stream until the peer closes, the transport fails, or a
/// shutdown signal arrives. No reconnect: this is a diagnostic tool and a
/// dropped connection is itself a finding.
pub async fn run(cfg: &WatchConfig) -> Result<(), WatchError> {
    info!(url = %cfg.url, "connecting");
    // No client-side pings here: the daemon implements no ping/pong, and
    // keep-alives would only manufacture spurious disconnects.
    let (mut ws, response) = connect_async(cfg.url.as_str())
        .await
        .map_err(|source| WatchError::Connect {
            url: cfg.url.clone(),
            source,
        })?;
    info!(status = %response.status(), "websocket established; awaiting telemetry");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        res = stream_frames(&mut ws, cfg.recv_timeout) => return res,
        _ = &mut shutdown => {
            info!("shutdown requested; closing connection");
        }
    }
    let _ = ws.close(None).await;
    Ok(())
}

/// Receive loop. Decode failures are per-message and never end the loop;
/// only transport errors (or an optional receive timeout) do.
async fn stream_frames<S>(ws: &mut S, recv_timeout: Option<Duration>) -> Result<(), WatchError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        match next_message(ws, recv_timeout).await? {
            None => {
                info!("server closed the stream");
                return Ok(());
            }
            Some(Message::Text(text)) => {
                for line in render(&text) {
                    println!("{line}");
                }
            }
            Some(Message::Close(frame)) => {
                info!(close = ?frame, "close frame received");
                return Ok(());
            }
            Some(other) => debug!(frame = ?other, "ignoring non-text frame"),
        }
    }
}

async fn next_message<S>(
    ws: &mut S,
    recv_timeout: Option<Duration>,
) -> Result<Option<Message>, WatchError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    let next = match recv_timeout {
        Some(limit) => timeout(limit, ws.next())
            .await
            .map_err(|_| WatchError::RecvTimeout(limit))?,
        None => ws.next().await,
    };
    next.transpose().map_err(WatchError::Transport)
}

/// Lines to print for one text frame: a summary plus a bounded sample on a
/// clean decode, a truncated raw echo otherwise.
fn render(text: &str) -> Vec<String> {
    match TelemetryFrame::decode(text) {
        Ok(frame) => {
            let summary = frame.summary(text.len());
            let mut lines = vec![summary.to_string()];
            if !summary.sample.is_empty() {
                lines.push(format!("Sample: {}", Value::Array(summary.sample)));
            }
            lines
        }
        Err(e) => {
            warn!(error = %e, "undecodable frame");
            vec![format!("Received (raw): {}...", raw_preview(text))]
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install signal handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tokio_tungstenite::tungstenite::error::ProtocolError;

    #[tokio::test]
    async fn loop_survives_malformed_frames() {
        let messages = vec![
            Ok(Message::Text("not json".to_string())),
            Ok(Message::Text(
                r#"{"Telemetry":{"reservoir_activity":[[1,0.5]],"activations":[0]}}"#.to_string(),
            )),
        ];
        let mut ws = stream::iter(messages);
        // malformed frame must not abort; stream end is a clean close
        assert!(stream_frames(&mut ws, None).await.is_ok());
    }

    #[tokio::test]
    async fn close_frame_ends_loop_cleanly() {
        let messages = vec![
            Ok(Message::Text("{}".to_string())),
            Ok(Message::Close(None)),
        ];
        let mut ws = stream::iter(messages);
        assert!(stream_frames(&mut ws, None).await.is_ok());
    }

    #[tokio::test]
    async fn transport_error_is_fatal() {
        let messages = vec![
            Ok(Message::Text("{}".to_string())),
            Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)),
        ];
        let mut ws = stream::iter(messages);
        let err = stream_frames(&mut ws, None).await.unwrap_err();
        assert!(matches!(err, WatchError::Transport(_)));
    }

    #[tokio::test]
    async fn silent_stream_times_out_when_configured() {
        let mut ws = stream::pending::<Result<Message, WsError>>();
        let err = stream_frames(&mut ws, Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::RecvTimeout(_)));
    }

    #[test]
    fn render_wrapped_and_bare_identically() {
        let wrapped = r#"{"Telemetry":{"reservoir_activity":[[1,0.5]],"activations":[0,1]}}"#;
        let bare = r#"{"reservoir_activity":[[1,0.5]],"activations":[0,1]}"#;
        let a = render(wrapped);
        let b = render(bare);
        // byte lengths differ, counts and sample must not
        assert!(a[0].contains("Reservoir Active: 1 (Sparse)"));
        assert!(a[0].contains("Activations: 2 nodes"));
        assert!(b[0].contains("Reservoir Active: 1 (Sparse)"));
        assert_eq!(a[1], b[1]);
        assert_eq!(a[1], "Sample: [[1,0.5]]");
    }

    #[test]
    fn render_omits_sample_when_no_activity() {
        let lines = render(r#"{"activations":[1,2]}"#);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Reservoir Active: 0 (Sparse)"));
    }

    #[test]
    fn render_marks_raw_on_decode_failure() {
        let long = format!("garbage {}", "y".repeat(300));
        let lines = render(&long);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Received (raw): "));
        assert!(lines[0].ends_with("..."));
        // preview capped at 100 chars plus marker text
        assert!(lines[0].len() <= "Received (raw): ".len() + 100 + 3);
    }
}

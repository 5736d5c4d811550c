use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Envelope discriminator used by the daemon when it tags outbound frames.
pub const ENVELOPE_KEY: &str = "Telemetry";

/// Cap on the number of activity entries echoed per frame, so high-frequency
/// sparse updates don't flood the console.
pub const SAMPLE_LIMIT: usize = 5;

/// Character cap for echoing undecodable messages.
pub const RAW_PREVIEW_CHARS: usize = 100;

/// One decoded telemetry frame. Entry shapes are left opaque; the daemon
/// sends sparse index/value pairs but this tool does not depend on that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryFrame {
    #[serde(default)]
    pub reservoir_activity: Vec<Value>,
    #[serde(default)]
    pub activations: Vec<Value>,
}

impl TelemetryFrame {
    /// Decode a frame from message text. Accepts both the enum-wrapped shape
    /// `{"Telemetry": {...}}` and the bare payload `{...}`; missing fields
    /// decode as empty lists.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_str(text)?;
        let payload = match value.get_mut(ENVELOPE_KEY) {
            Some(inner) => inner.take(),
            None => value,
        };
        serde_json::from_value(payload)
    }

    pub fn summary(&self, message_bytes: usize) -> FrameSummary {
        FrameSummary {
            message_bytes,
            activity_count: self.reservoir_activity.len(),
            activation_count: self.activations.len(),
            sample: self
                .reservoir_activity
                .iter()
                .take(SAMPLE_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

/// Per-frame digest printed by the watch loop.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub message_bytes: usize,
    pub activity_count: usize,
    pub activation_count: usize,
    pub sample: Vec<Value>,
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Update: {} bytes | Reservoir Active: {} (Sparse) | Activations: {} nodes",
            self.message_bytes, self.activity_count, self.activation_count
        )
    }
}

/// Truncate an undecodable message for logging. Char-based, so a multi-byte
/// boundary never panics the slice.
pub fn raw_preview(text: &str) -> &str {
    match text.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

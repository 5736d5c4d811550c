pub mod telemetry;

pub use telemetry::{raw_preview, TelemetryFrame, FrameSummary, ENVELOPE_KEY, SAMPLE_LIMIT};

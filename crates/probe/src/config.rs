use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    /// Length of the junk header value. The experiment's controlled variable.
    pub junk_bytes: usize,
    pub connect_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            junk_bytes: 2000,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Self {
        let mut cfg = ProbeConfig::default();

        if let Ok(v) = env::var("PROBE_HOST") {
            if !v.is_empty() {
                cfg.host = v;
            }
        }
        if let Ok(v) = env::var("PROBE_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                cfg.port = p;
            }
        }
        if let Ok(v) = env::var("PROBE_JUNK_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                cfg.junk_bytes = n;
            }
        }
        if let Ok(v) = env::var("PROBE_CONNECT_TIMEOUT_SECS") {
            if let Ok(s) = v.parse::<u64>() {
                cfg.connect_timeout = Duration::from_secs(s);
            }
        }

        cfg
    }

    /// Positional overrides: `resdiag-probe [host] [port] [junk_bytes]`.
    pub fn apply_args<I: Iterator<Item = String>>(mut self, mut args: I) -> Self {
        if let Some(host) = args.next() {
            self.host = host;
        }
        if let Some(p) = args.next().and_then(|v| v.parse::<u16>().ok()) {
            self.port = p;
        }
        if let Some(n) = args.next().and_then(|v| v.parse::<usize>().ok()) {
            self.junk_bytes = n;
        }
        self
    }
}

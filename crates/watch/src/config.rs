use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub url: String,
    /// No timeout by default: the daemon can legitimately go quiet between
    /// snapshots, and it speaks no ping/pong. Set WATCH_RECV_TIMEOUT_SECS to
    /// bail out of a hung connection instead of waiting forever.
    pub recv_timeout: Option<Duration>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:3030".to_string(),
            recv_timeout: None,
        }
    }
}

impl WatchConfig {
    pub fn from_env() -> Self {
        let mut cfg = WatchConfig::default();

        if let Ok(v) = env::var("WATCH_URL") {
            if !v.is_empty() {
                cfg.url = v;
            }
        }
        if let Ok(v) = env::var("WATCH_RECV_TIMEOUT_SECS") {
            if let Ok(s) = v.parse::<u64>() {
                if s > 0 {
                    cfg.recv_timeout = Some(Duration::from_secs(s));
                }
            }
        }

        cfg
    }

    /// Positional override: `resdiag-watch [url]`.
    pub fn apply_args<I: Iterator<Item = String>>(mut self, mut args: I) -> Self {
        if let Some(url) = args.next() {
            self.url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_overrides_url() {
        let cfg = WatchConfig::default()
            .apply_args(["ws://10.0.0.9:9000".to_string()].into_iter());
        assert_eq!(cfg.url, "ws://10.0.0.9:9000");
    }

    #[test]
    fn defaults_without_args() {
        let cfg = WatchConfig::default().apply_args(std::iter::empty());
        assert_eq!(cfg.url, "ws://localhost:3030");
        assert!(cfg.recv_timeout.is_none());
    }
}

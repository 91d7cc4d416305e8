// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Communicator link state

use std::fmt;
use std::time::Duration;

/// Reporting link state derived from push traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkState {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl LinkState {
    /// Link state for the time since the last report.
    ///
    /// Stale means more than 1.5 keepalive intervals; no report at all is stale.
    pub fn evaluate(since_last: Option<Duration>, keepalive: Duration) -> Self {
        match since_last {
            Some(elapsed) if elapsed <= keepalive * 3 / 2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

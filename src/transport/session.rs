// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Session token and command sequence bookkeeping

use std::time::Duration;

use tokio::time::Instant;

use crate::constants::SEQUENCE_MODULUS;

/// Cached cloud session token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    issued_at: Option<Instant>,
}

impl Session {
    /// Store a freshly issued token.
    pub fn store(&mut self, token: String, now: Instant) {
        self.token = Some(token);
        self.issued_at = Some(now);
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// A token is expired once strictly more than `lifetime` has elapsed
    /// since it was issued. No token counts as expired.
    pub fn is_expired_at(&self, now: Instant, lifetime: Duration) -> bool {
        match (&self.token, self.issued_at) {
            (Some(_), Some(issued)) => now.saturating_duration_since(issued) > lifetime,
            _ => true,
        }
    }

    /// Drop the token so the next call logs in again.
    pub fn invalidate(&mut self) {
        self.token = None;
        self.issued_at = None;
    }
}

/// Per-login command sequence, rendered as three decimal digits.
///
/// State reads reuse the current value; each accepted mutating command
/// advances it, wrapping from 255 back to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter(u16);

impl Default for SequenceCounter {
    fn default() -> Self {
        Self(1)
    }
}

impl SequenceCounter {
    pub fn reset(&mut self) {
        self.0 = 1;
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Current value as sent in request bodies.
    pub fn current(&self) -> String {
        format!("{:03}", self.0)
    }

    pub fn advance(&mut self) {
        self.0 = (self.0 + 1) % SEQUENCE_MODULUS;
    }
}

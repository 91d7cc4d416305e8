// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Error types

use crate::constants::{MSG_COMMAND_IN_PROGRESS, MSG_NO_RESPONSE, MSG_NO_TOKEN, MSG_TOKEN_REJECTED};

/// All errors that can occur in the garnet-bridge library.
#[derive(Debug, thiserror::Error)]
pub enum GarnetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The panel did not answer in time or is running another command.
    #[error("Panel busy: {message}")]
    PanelBusy { message: String },

    /// The cloud rejected the session token.
    #[error("Session token rejected: {message}")]
    TokenRejected { message: String },

    #[error("Permission denied: user may not {action}")]
    PermissionDenied { action: &'static str },

    #[error("System {system_id} is not registered in Garnet Control")]
    SystemNotFound { system_id: String },

    #[error("Partition cannot be armed: open zones (mask {mask:#010x})")]
    OpenZones { mask: u32 },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Invalid response: {details}")]
    InvalidResponse { details: String },

    #[error("Invalid status frame: {details}")]
    InvalidStatus { details: String },

    #[error("CRC mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    CrcMismatch { expected: u16, computed: u16 },

    #[error("Malformed frame: {details}")]
    MalformedFrame { details: String },

    #[error("UDP listener failed to start: {reason}")]
    ListenerStartup { reason: String },

    #[error("Unknown device: {id}")]
    UnknownDevice { id: u32 },

    #[error("Not connected")]
    NotConnected,

    #[error("Command task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GarnetError {
    /// Whether this error is transient and the call may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            GarnetError::PanelBusy { .. } | GarnetError::Io(_) => true,
            GarnetError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the session token must be renewed before retrying.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, GarnetError::TokenRejected { .. })
    }

    /// Classify a `message` returned by the cloud with `success: false`.
    pub fn from_api_message(message: &str) -> Self {
        match message {
            MSG_NO_RESPONSE | MSG_COMMAND_IN_PROGRESS => GarnetError::PanelBusy {
                message: message.to_string(),
            },
            MSG_TOKEN_REJECTED | MSG_NO_TOKEN => GarnetError::TokenRejected {
                message: message.to_string(),
            },
            other => GarnetError::Api {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, GarnetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_messages_are_retryable() {
        let e = GarnetError::from_api_message(MSG_NO_RESPONSE);
        assert!(matches!(e, GarnetError::PanelBusy { .. }));
        assert!(e.is_retryable());

        let e = GarnetError::from_api_message(MSG_COMMAND_IN_PROGRESS);
        assert!(e.is_retryable());
    }

    #[test]
    fn test_token_messages_are_auth_expired() {
        for msg in [MSG_TOKEN_REJECTED, MSG_NO_TOKEN] {
            let e = GarnetError::from_api_message(msg);
            assert!(e.is_auth_expired(), "{msg}");
            assert!(!e.is_retryable(), "{msg}");
        }
    }

    #[test]
    fn test_other_messages_are_fatal() {
        let e = GarnetError::from_api_message("Usuario o contraseña incorrectos");
        assert!(matches!(e, GarnetError::Api { .. }));
        assert!(!e.is_retryable());
        assert!(!e.is_auth_expired());
    }

    #[test]
    fn test_domain_errors_not_retryable() {
        assert!(!GarnetError::PermissionDenied { action: "arm" }.is_retryable());
        assert!(!GarnetError::OpenZones { mask: 1 }.is_retryable());
        assert!(!GarnetError::SystemNotFound { system_id: "x".into() }.is_retryable());
    }
}

//! Shared error type across the janus crates.

use thiserror::Error;

/// Stable error codes used as log fields and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Base envelope could not be parsed.
    MalformedEnvelope,
    /// Discriminator has no registered type.
    UnknownMessageType,
    /// Type was resolved but the body did not match it.
    MalformedPayload,
    /// Second arrival for an already answered transaction.
    UnexpectedLateResponse,
    /// Unsolicited message nobody is listening for.
    OrphanMessage,
    /// Caller gave up waiting.
    Timeout,
    /// Gateway answered with an `error` message.
    Remote,
    /// A plugin answered with its error payload.
    PluginRemote,
    /// Transport went away.
    ConnectionClosed,
    /// Transaction id registered twice.
    DuplicateTransaction,
    /// Transport-level failure.
    Transport,
    /// Outbound payload could not be encoded.
    Encode,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
}

impl ErrorCode {
    /// String representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ErrorCode::UnknownMessageType => "UNKNOWN_MESSAGE_TYPE",
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::UnexpectedLateResponse => "UNEXPECTED_LATE_RESPONSE",
            ErrorCode::OrphanMessage => "ORPHAN_MESSAGE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Remote => "REMOTE",
            ErrorCode::PluginRemote => "PLUGIN_REMOTE",
            ErrorCode::ConnectionClosed => "CONNECTION_CLOSED",
            ErrorCode::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, JanusError>;

/// Unified error type used by core and client.
#[derive(Debug, Clone, Error)]
pub enum JanusError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),
    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: String, reason: String },
    #[error("unexpected late response for transaction {0}")]
    UnexpectedLateResponse(String),
    #[error("orphan message: {0}")]
    OrphanMessage(String),
    #[error("request timed out")]
    Timeout,
    #[error("gateway error {code}: {reason}")]
    Remote { code: i64, reason: String },
    #[error("plugin {plugin} error {code}: {reason}")]
    PluginRemote {
        plugin: String,
        code: i64,
        reason: String,
    },
    #[error("connection closed")]
    ConnectionClosed,
    #[error("transaction already in flight: {0}")]
    DuplicateTransaction(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported version")]
    UnsupportedVersion,
}

impl JanusError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            JanusError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            JanusError::UnknownMessageType(_) => ErrorCode::UnknownMessageType,
            JanusError::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            JanusError::UnexpectedLateResponse(_) => ErrorCode::UnexpectedLateResponse,
            JanusError::OrphanMessage(_) => ErrorCode::OrphanMessage,
            JanusError::Timeout => ErrorCode::Timeout,
            JanusError::Remote { .. } => ErrorCode::Remote,
            JanusError::PluginRemote { .. } => ErrorCode::PluginRemote,
            JanusError::ConnectionClosed => ErrorCode::ConnectionClosed,
            JanusError::DuplicateTransaction(_) => ErrorCode::DuplicateTransaction,
            JanusError::Transport(_) => ErrorCode::Transport,
            JanusError::Encode(_) => ErrorCode::Encode,
            JanusError::BadConfig(_) => ErrorCode::BadConfig,
            JanusError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
        }
    }

    /// Per-frame failures: the reader loop reports them and keeps going.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::MalformedEnvelope
                | ErrorCode::UnknownMessageType
                | ErrorCode::MalformedPayload
                | ErrorCode::UnexpectedLateResponse
                | ErrorCode::OrphanMessage
        )
    }

    pub(crate) fn malformed_payload(kind: impl Into<String>, err: impl std::fmt::Display) -> Self {
        JanusError::MalformedPayload {
            kind: kind.into(),
            reason: err.to_string(),
        }
    }
}

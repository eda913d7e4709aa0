/*
[INPUT]:  Error sources (transport, control/push decode, semantic mapping)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

use crate::types::{AssetClass, ChannelKind};

/// Main error type for the Quantex feed client
#[derive(Error, Debug)]
pub enum QuantexError {
    /// Connection-level failure, fatal to the current connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// No live connection to send on
    #[error("Not connected")]
    NotConnected,

    /// A connection is already established on this client
    #[error("Already connected")]
    AlreadyConnected,

    /// Malformed JSON control frame
    #[error("Control frame decode failed: {0}")]
    ControlDecode(#[from] serde_json::Error),

    /// Malformed binary push frame
    #[error("Push frame decode failed: {0}")]
    PushDecode(#[from] prost::DecodeError),

    /// A wire numeric string failed to parse
    #[error("Invalid numeric field {field}: {value:?}")]
    NumericField { field: &'static str, value: String },

    /// Asset class is not served on this stream
    #[error("Asset class {asset:?} is not supported for channel {channel:?}")]
    UnsupportedAsset {
        asset: AssetClass,
        channel: ChannelKind,
    },

    /// Subscription is missing a required modifier for its channel kind
    #[error("Invalid subscription for channel {channel:?}: {reason}")]
    InvalidSubscription {
        channel: ChannelKind,
        reason: &'static str,
    },

    /// Interval modifier failed validation
    #[error("Invalid interval: {0:?}")]
    InvalidInterval(String),

    /// Topic string does not match any known channel shape
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// Push envelope carried no payload, or one of the wrong kind
    #[error("Push envelope body missing or mismatched for topic {0}")]
    MissingBody(String),

    /// Venue rejected a control request
    #[error("Request {id} rejected with code {code}")]
    AckRejected { id: u64, code: i32 },

    /// Venue never acknowledged a control request within the wait window
    #[error("Request {id} timed out waiting for acknowledgement")]
    AckTimeout { id: u64 },

    /// Client shutdown aborted an in-flight wait
    #[error("Operation cancelled")]
    Cancelled,

    /// Order book store rejected a snapshot or update
    #[error("Book store error: {0}")]
    BookStore(String),

    /// URL building failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl QuantexError {
    /// Check if the error is fatal to the connection and worth a reconnect
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuantexError::Transport(_) | QuantexError::NotConnected
        )
    }

    /// Check if the error degrades to a failed-subscription outcome
    /// rather than aborting a whole batch
    pub fn is_subscription_failure(&self) -> bool {
        matches!(
            self,
            QuantexError::AckRejected { .. } | QuantexError::AckTimeout { .. }
        )
    }
}

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, QuantexError>;

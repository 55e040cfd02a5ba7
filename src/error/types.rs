//! Error type definitions
//!
//! Defines the main error type used throughout the client and the purchase
//! rejection taxonomy produced by the validation pipeline.

use thiserror::Error;

/// Boxed transport/decode cause carried by retryable API errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the lottery client
#[derive(Error, Debug)]
pub enum Error {
    /// RSA key material could not be fetched from either source
    #[error("RSA key acquisition failed: {0}")]
    KeyAcquisition(String),

    /// Login attempt was rejected or produced an unexpected redirect
    #[error("Login failed: {0}")]
    Login(String),

    /// Transient API failure (bad status, malformed envelope, transport error)
    #[error("API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Retry budget exhausted; the caller has to reauthenticate
    #[error("Login required after {attempts} attempts")]
    LoginRequired {
        attempts: u32,
        #[source]
        last_error: Box<Error>,
    },

    /// Purchase rejected by a validation stage or by the server
    #[error(transparent)]
    Rejected(#[from] PurchaseRejection),

    /// No draw record matched the query
    #[error("Round not found: {0}")]
    RoundNotFound(String),

    /// Transaction was sent but its outcome could not be confirmed
    #[error("Purchase outcome unknown for round {round}: {message}")]
    AmbiguousPurchase {
        round: u32,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Credential encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation aborted through a cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a purchase is refused before (or by) the transaction endpoint.
///
/// Each validation stage returns one of these so callers can tell exactly
/// which constraint stopped the purchase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseRejection {
    #[error("Outside sales window: {reason}")]
    OutsideSalesWindow { reason: String },

    #[error("Invalid slot count {count} (allowed 1..={max})")]
    InvalidSlotCount { count: usize, max: usize },

    #[error("Slot {slot}: {count} numbers given, at most 6 allowed")]
    TooManyNumbers { slot: char, count: usize },

    #[error("Slot {slot}: number {number} outside 1..=45")]
    NumberOutOfRange { slot: char, number: u8 },

    #[error("Weekly purchase limit reached ({purchased}/{limit} games)")]
    WeeklyLimitReached { purchased: u32, limit: u32 },

    #[error("Insufficient balance: {required} KRW required, {available} KRW available")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("Purchase rejected by server: {message}")]
    ServerRejected { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a key acquisition error
    pub fn key_acquisition(msg: impl Into<String>) -> Self {
        Self::KeyAcquisition(msg.into())
    }

    /// Create a login error
    pub fn login(msg: impl Into<String>) -> Self {
        Self::Login(msg.into())
    }

    /// Create an API error without an underlying cause
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Create an API error wrapping the transport or decode failure
    pub fn api_with_source(
        status: Option<u16>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a round-not-found error
    pub fn round_not_found(msg: impl Into<String>) -> Self {
        Self::RoundNotFound(msg.into())
    }

    /// Create an ambiguous purchase error
    pub fn ambiguous_purchase(
        round: u32,
        message: impl Into<String>,
        source: Option<Error>,
    ) -> Self {
        Self::AmbiguousPurchase {
            round,
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    /// Create an encryption error
    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the session retry ladder may recover from this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Whether the caller has to log in again before retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::LoginRequired { .. } | Self::Login(_))
    }
}

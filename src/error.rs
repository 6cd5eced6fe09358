use thiserror::Error;

/// Errors that can occur when working with a ZenMat and its application core
#[derive(Error, Debug)]
pub enum ZenMatError {
    /// Mat connection failed
    #[error("Failed to connect to mat: {0}")]
    ConnectionFailed(String),

    /// Mat disconnection failed
    #[error("Failed to disconnect from mat: {0}")]
    DisconnectFailed(String),

    /// Operation requires a connected mat
    #[error("Mat is not connected")]
    NotConnected,

    /// Operation was cancelled before it settled
    #[error("Operation cancelled")]
    Cancelled,

    /// A later connectivity operation replaced this one before it settled
    #[error("Operation superseded by a newer request")]
    Superseded,

    /// The connectivity owner went away before the operation settled
    #[error("Connectivity owner dropped before the operation settled")]
    Detached,

    /// The action belongs to a screen that is not showing
    #[error("Screen not active: {0}")]
    ScreenInactive(&'static str),

    /// Invalid parameters or configuration
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Catalog lookup failed
    #[error("Unknown {kind}: {id}")]
    NotFound {
        /// Kind of catalog entry that was looked up
        kind: &'static str,
        /// Identifier that was not found
        id: String,
    },

    /// Background operation task failed
    #[error("Operation task failed: {0}")]
    TaskFailed(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for ZenMat operations
pub type Result<T> = std::result::Result<T, ZenMatError>;

impl ZenMatError {
    /// Check if this error indicates a connection issue
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::DisconnectFailed(_) | Self::NotConnected
        )
    }

    /// Check if this error is recoverable by simply trying again
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Cancelled | Self::Superseded | Self::NotConnected
        )
    }

    /// Message suitable for showing to the user
    ///
    /// Transport failures carry their own human-readable text, which is returned
    /// as-is. Everything else falls back to the `Display` rendering.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ConnectionFailed(message) | Self::DisconnectFailed(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ZenMatError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}

// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for controller connections

/// Result type alias for link operations
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors raised by a single controller connection.
///
/// All of these stay confined to the owning controller task; none is ever
/// surfaced to other controllers or to the tick loop.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Controller address could not be turned into a websocket URL
    #[error("Invalid controller address '{0}'")]
    InvalidAddress(String),

    /// Failed to establish the websocket connection
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Failed to send a frame on an established connection
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Connect or send exceeded its bounded timeout (hung peer)
    #[error("Operation timed out")]
    Timeout,

    /// Peer closed the connection
    #[error("Connection closed")]
    ConnectionClosed,

    /// Frame serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

//! # Playback Error Types
//!
//! Errors raised inside the playback controller and the tone output. The
//! controller never returns these to its callers; they are logged and turned
//! into `PlaybackEvent::Error` at the boundary.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Output Errors
    // ========================================================================
    /// The host tone output rejected an operation.
    #[error("Tone output error: {0}")]
    Output(#[from] BridgeError),

    /// Frequency cannot be rendered (non-finite or not positive).
    #[error("Invalid frequency: {0} Hz")]
    InvalidFrequency(f64),

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Attempted operation when no track is loaded.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// A newer play or stop superseded this operation.
    #[error("Superseded by a newer playback request")]
    Superseded,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the failed operation is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::Output(BridgeError::NotAvailable(_))
                | PlaybackError::Output(BridgeError::Audio(_))
                | PlaybackError::Superseded
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

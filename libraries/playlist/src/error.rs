//! Error types for playlist operations

use thiserror::Error;

/// Failure raised by a caller-supplied value while it is copied or compared
pub type ValueError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Playlist errors
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Playlist holds no plays
    #[error("Playlist is empty")]
    EmptyContainer,

    /// No registry entry matches the requested track
    #[error("Track is not in the playlist")]
    UnknownTrack,

    /// Cursor is at the end or its play/track has been removed
    #[error("Cursor does not refer to a live play or track")]
    InvalidCursor,

    /// Copying or comparing a caller-supplied value failed
    #[error("Value operation failed: {0}")]
    Propagated(#[from] ValueError),
}

/// Result type for playlist operations
pub type Result<T> = std::result::Result<T, PlaylistError>;

//! Beamcast Core - Playlist handling and playback session management
//!
//! This crate provides the fundamental building blocks for an IPTV-style
//! player: M3U playlist parsing and serialization, the in-memory channel
//! store, saved-list persistence, and the playback session state machine
//! behind an actor-model facade.

pub mod config;
pub mod playback;
pub mod playlist;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::BeamcastConfig;
pub use playback::{PlaybackError, PlaybackFacade, PlaybackFault, SessionState, spawn_playback};
pub use playlist::{ChannelRecord, ChannelStore, ParsedPlaylist, PlaylistError};

use playlist::persistence::StorageError;

/// Core errors that can bubble up from any Beamcast subsystem.
#[derive(Debug, thiserror::Error)]
pub enum BeamcastError {
    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BeamcastError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            BeamcastError::Playlist(PlaylistError::UnsupportedExtension { filename }) => {
                format!("Please select a valid playlist file: {filename}")
            }
            BeamcastError::Playback(PlaybackError::ExportEmpty) => {
                "No favorite channels to export".to_string()
            }
            BeamcastError::Playback(PlaybackError::NoSelection) => {
                "Select a channel first".to_string()
            }
            BeamcastError::Playback(PlaybackError::ChannelNotFound { .. }) => {
                "Channel no longer exists".to_string()
            }
            BeamcastError::Playback(_) => "Playback error occurred".to_string(),
            BeamcastError::Storage(_) => "Storage error occurred".to_string(),
            BeamcastError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BeamcastError::Playlist(PlaylistError::UnsupportedExtension { .. })
                | BeamcastError::Playback(PlaybackError::ExportEmpty)
        )
    }
}

pub type Result<T> = std::result::Result<T, BeamcastError>;

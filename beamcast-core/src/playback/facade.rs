//! Facade for communicating with the playback actor.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::PlaybackError;
use super::commands::{PlaybackCommand, PlaybackStatus};
use crate::playlist::{ChannelGroup, ChannelRecord, PlaylistUpload};

/// The thin boundary the UI layer drives.
///
/// Provides an ergonomic async API for sending commands to the playback
/// actor. Can be cloned and shared across tasks safely; all clones talk to
/// the same single live session.
#[derive(Clone)]
pub struct PlaybackFacade {
    sender: mpsc::Sender<PlaybackCommand>,
}

impl PlaybackFacade {
    /// Creates a new facade with the given command sender.
    pub fn new(sender: mpsc::Sender<PlaybackCommand>) -> Self {
        Self { sender }
    }

    /// Parses uploaded playlist text and replaces the channel collection,
    /// selecting and starting the first channel. Returns the channel count.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::FacadeShutdown` - The actor is no longer running
    pub async fn load_playlist(&self, upload: PlaylistUpload) -> Result<usize, PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::LoadPlaylist { upload, responder }, rx)
            .await
    }

    /// Switches playback to another channel, tearing down the previous
    /// session first.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ChannelNotFound` - Unknown channel id
    pub async fn select_channel(&self, id: Uuid) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::SelectChannel { id, responder }, rx)
            .await?
    }

    /// Clears the channel selection.
    pub async fn clear_selection(&self) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::ClearSelection { responder }, rx)
            .await
    }

    /// Resumes playback from pause.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::NoSelection` - No channel selected
    /// - `PlaybackError::InvalidTransition` - Not paused or playing
    pub async fn play(&self) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::Play { responder }, rx).await?
    }

    /// Pauses playback.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::NoSelection` - No channel selected
    /// - `PlaybackError::InvalidTransition` - Not playing or paused
    pub async fn pause(&self) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::Pause { responder }, rx).await?
    }

    /// Mutes or unmutes the playback surface.
    pub async fn set_muted(&self, muted: bool) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::SetMuted { muted, responder }, rx)
            .await
    }

    /// Retries the current channel after a fault.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::InvalidTransition` - Session is not errored
    pub async fn retry(&self) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::Retry { responder }, rx).await?
    }

    /// Requests fullscreen on the playback surface; no session-state
    /// effect.
    pub async fn request_fullscreen(&self) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::RequestFullscreen { responder }, rx)
            .await
    }

    /// Flips a channel's favorite flag.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ChannelNotFound` - Unknown channel id
    pub async fn toggle_favorite(&self, id: Uuid) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::ToggleFavorite { id, responder }, rx)
            .await?
    }

    /// Deletes a channel, moving playback to the fallback channel when the
    /// selected one is removed.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ChannelNotFound` - Unknown channel id
    pub async fn delete_channel(&self, id: Uuid) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::DeleteChannel { id, responder }, rx)
            .await?
    }

    /// Exports the favorite subset through the download sink. Returns the
    /// number of exported channels.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ExportEmpty` - No favorited channels
    pub async fn export_favorites(&self) -> Result<usize, PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::ExportFavorites { responder }, rx)
            .await?
    }

    /// The full channel collection in source order.
    pub async fn channels(&self) -> Result<Vec<ChannelRecord>, PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::GetChannels { responder }, rx)
            .await
    }

    /// The group partition of the channel collection.
    pub async fn groups(&self) -> Result<Vec<ChannelGroup>, PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::GetGroups { responder }, rx).await
    }

    /// The observable playback status.
    pub async fn status(&self) -> Result<PlaybackStatus, PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::GetStatus { responder }, rx).await
    }

    /// Shuts down the playback actor gracefully. After this call, all
    /// subsequent operations return `PlaybackError::FacadeShutdown`.
    pub async fn shutdown(&self) -> Result<(), PlaybackError> {
        let (responder, rx) = oneshot::channel();
        self.send(PlaybackCommand::Shutdown { responder }, rx).await
    }

    /// Checks if the playback actor is still running.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn send<T>(
        &self,
        command: PlaybackCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, PlaybackError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| PlaybackError::FacadeShutdown)?;
        rx.await.map_err(|_| PlaybackError::FacadeShutdown)
    }
}

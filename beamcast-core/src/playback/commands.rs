//! Command definitions for the playback actor model.

use tokio::sync::oneshot;
use uuid::Uuid;

use super::session::SessionState;
use super::{PlaybackError, PlaybackFault};
use crate::playlist::{ChannelGroup, ChannelRecord, PlaylistUpload};

/// Commands that can be sent to the playback actor.
///
/// Each command encapsulates an operation request along with a response
/// channel for the actor to send back results. This message-passing
/// approach keeps the session state machine single-threaded without locks.
pub enum PlaybackCommand {
    /// Parse uploaded playlist text and replace the channel collection.
    LoadPlaylist {
        upload: PlaylistUpload,
        responder: oneshot::Sender<usize>,
    },
    /// Switch playback to another channel.
    SelectChannel {
        id: Uuid,
        responder: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Clear the selection, cancelling any session in flight.
    ClearSelection { responder: oneshot::Sender<()> },
    /// Resume playback from pause.
    Play {
        responder: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Pause playback.
    Pause {
        responder: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Mute or unmute the playback surface.
    SetMuted {
        muted: bool,
        responder: oneshot::Sender<()>,
    },
    /// Retry the current channel after a fault.
    Retry {
        responder: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Delegate a fullscreen request to the surface.
    RequestFullscreen { responder: oneshot::Sender<()> },
    /// Flip a channel's favorite flag.
    ToggleFavorite {
        id: Uuid,
        responder: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Delete a channel from the collection.
    DeleteChannel {
        id: Uuid,
        responder: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Serialize the favorite subset and hand it to the download sink.
    ExportFavorites {
        responder: oneshot::Sender<Result<usize, PlaybackError>>,
    },
    /// Get the full channel collection in source order.
    GetChannels {
        responder: oneshot::Sender<Vec<ChannelRecord>>,
    },
    /// Get the group partition of the channel collection.
    GetGroups {
        responder: oneshot::Sender<Vec<ChannelGroup>>,
    },
    /// Get the observable playback status.
    GetStatus {
        responder: oneshot::Sender<PlaybackStatus>,
    },
    /// Shutdown the playback actor gracefully.
    Shutdown { responder: oneshot::Sender<()> },
}

/// UI-observable snapshot of the playback session.
#[derive(Debug, Clone)]
pub struct PlaybackStatus {
    /// Current session state
    pub state: SessionState,
    /// The selected channel, if any
    pub channel: Option<ChannelRecord>,
    /// Whether the surface is muted
    pub muted: bool,
    /// The fault that errored the session, when `state` is `Errored`
    pub fault: Option<PlaybackFault>,
}

impl PlaybackStatus {
    /// User-facing fault text, when errored.
    pub fn fault_message(&self) -> Option<String> {
        self.fault.as_ref().map(PlaybackFault::to_string)
    }
}

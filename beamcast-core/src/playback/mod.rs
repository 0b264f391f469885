//! Playback session management.
//!
//! Owns one playback attempt for one channel at a time: transport strategy
//! selection, the adaptive engine lifecycle, fault classification, and the
//! actor-model facade the UI layer drives.

pub mod actor;
pub mod commands;
pub mod engine;
pub mod facade;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks;

#[cfg(test)]
mod integration_tests;

pub use actor::spawn_playback;
pub use commands::{PlaybackCommand, PlaybackStatus};
pub use engine::{
    AdaptiveEngine, DownloadSink, EngineEvent, EngineFactory, MediaSurface, SessionEvent,
    SessionEventKind, SurfaceEvent,
};
pub use facade::PlaybackFacade;
pub use session::{PlaybackSession, SessionState};
pub use transport::TransportKind;
use uuid::Uuid;

/// Fatal session faults, locally terminal until an explicit user retry.
///
/// The variants are distinct so the user-facing message can suggest the
/// right remediation: a rejected play request usually means an autoplay
/// policy, not a broken stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackFault {
    #[error("stream requires adaptive playback support that is not available")]
    CapabilityMismatch,

    #[error("stream error: {detail}")]
    Transport { detail: String },

    #[error("failed to start playback: {detail}")]
    PlaybackStart { detail: String },
}

/// Errors returned by playback facade operations.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("no favorite channels to export")]
    ExportEmpty,

    #[error("no channel selected")]
    NoSelection,

    #[error("channel {id} not found")]
    ChannelNotFound { id: Uuid },

    #[error("{action} is not allowed while {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },

    #[error("playback facade is shut down")]
    FacadeShutdown,
}

//! Seams to the adaptive-streaming engine and the playback surface.
//!
//! Both collaborators deliver their asynchronous callbacks as messages on
//! the session event channel. Every event carries the generation the
//! emitter was created under so the session can discard stale events from
//! a torn-down predecessor.

use tokio::sync::mpsc;

use crate::config::PlaybackConfig;

/// Events emitted by an attached adaptive-streaming engine.
///
/// The engine performs manifest fetch, segment scheduling, and bitrate
/// adaptation internally; the session only observes these events and never
/// second-guesses the engine's scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The manifest is parsed and playback can be requested
    ManifestReady,
    /// An engine fault. Non-fatal faults are retried internally by the
    /// engine and cause no session transition.
    Fault { fatal: bool, detail: String },
}

/// Events emitted by the playback surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// First frame or data arrived; playback is visibly running
    FirstFrame,
    /// Native playback fault (non-adaptive and native-adaptive paths)
    Fault { detail: String },
}

/// A collaborator event tagged with its session generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub generation: u64,
    pub kind: SessionEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    Engine(EngineEvent),
    Surface(SurfaceEvent),
}

impl SessionEvent {
    pub fn engine(generation: u64, event: EngineEvent) -> Self {
        Self {
            generation,
            kind: SessionEventKind::Engine(event),
        }
    }

    pub fn surface(generation: u64, event: SurfaceEvent) -> Self {
        Self {
            generation,
            kind: SessionEventKind::Surface(event),
        }
    }
}

/// An attached segmented/adaptive playback engine instance.
///
/// Instances are single-use: a retry or channel switch destroys the
/// instance outright rather than reusing partially-initialized state.
pub trait AdaptiveEngine: Send {
    /// Starts loading the given manifest URL.
    fn load(&mut self, url: &str);

    /// Synchronously detaches the engine and stops event emission.
    /// Idempotent; called exactly once by the session before the instance
    /// is dropped.
    fn destroy(&mut self);
}

/// Creates adaptive engine instances, or reports that the runtime has none.
pub trait EngineFactory: Send + 'static {
    /// Attempts to create an engine that will emit events tagged with
    /// `generation` on the given channel. Returns `None` when no adaptive
    /// engine is available in this runtime.
    fn create(
        &mut self,
        config: &PlaybackConfig,
        events: mpsc::UnboundedSender<SessionEvent>,
        generation: u64,
    ) -> Option<Box<dyn AdaptiveEngine>>;
}

/// The opaque media sink playback is rendered on.
///
/// The surface is long-lived across sessions; `begin` re-tags its event
/// emission for each new session so stale events are attributable.
pub trait MediaSurface: Send + 'static {
    /// Wires the surface's event emission to the session event channel.
    /// Called once, before any session starts.
    fn connect(&mut self, events: mpsc::UnboundedSender<SessionEvent>);

    /// Marks the start of a new session; subsequent surface events carry
    /// this generation tag.
    fn begin(&mut self, generation: u64);

    /// Hands a URL directly to the surface (direct and native-adaptive
    /// transports).
    fn load_url(&mut self, url: &str);

    /// Requests playback start.
    ///
    /// # Errors
    ///
    /// Returns the rejection detail when the surface refuses to start,
    /// e.g. an autoplay policy.
    fn request_play(&mut self) -> Result<(), String>;

    /// Pauses playback, retaining buffered state.
    fn pause(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Delegated directly from the UI; no session-state effect.
    fn request_fullscreen(&mut self);

    /// Whether the surface natively understands the adaptive format.
    fn supports_native_adaptive(&self) -> bool;

    /// Detaches the current source as part of session teardown.
    fn reset(&mut self);
}

/// Opaque download trigger for exported playlists.
pub trait DownloadSink: Send + 'static {
    fn deliver(&mut self, filename: &str, payload: &str);
}

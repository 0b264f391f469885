//! Streaming-session state machine.
//!
//! Exactly one session is live at any instant. A channel switch, retry, or
//! clear synchronously destroys the attached engine before anything new is
//! constructed, and every collaborator event is checked against the current
//! session generation so events from a destroyed predecessor are discarded
//! rather than misattributed.

use tokio::sync::mpsc;
use uuid::Uuid;

use super::commands::PlaybackStatus;
use super::engine::{
    AdaptiveEngine, DownloadSink, EngineEvent, EngineFactory, MediaSurface, SessionEvent,
    SessionEventKind, SurfaceEvent,
};
use super::transport::{self, TransportKind};
use super::{PlaybackError, PlaybackFault};
use crate::config::BeamcastConfig;
use crate::playlist::{
    ChannelGroup, ChannelRecord, ChannelStore, DeleteOutcome, PlaylistUpload, generate_playlist,
    parse_playlist,
};

/// Observable lifecycle of the current playback attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No channel selected
    Idle,
    /// Transport strategy chosen, engine or surface loading the stream
    Initializing,
    Playing,
    /// User-paused; the engine retains buffered state
    Paused,
    /// Terminal for this attempt, recoverable only by explicit retry
    Errored,
}

/// Core playback state: the channel collection plus the single live
/// session. Driven synchronously by the playback actor.
pub struct PlaybackSession<F, S, D> {
    config: BeamcastConfig,
    store: ChannelStore,
    engine_factory: F,
    surface: S,
    sink: D,
    events: mpsc::UnboundedSender<SessionEvent>,
    engine: Option<Box<dyn AdaptiveEngine>>,
    state: SessionState,
    fault: Option<PlaybackFault>,
    generation: u64,
    muted: bool,
}

impl<F, S, D> PlaybackSession<F, S, D>
where
    F: EngineFactory,
    S: MediaSurface,
    D: DownloadSink,
{
    pub fn new(
        config: BeamcastConfig,
        engine_factory: F,
        mut surface: S,
        sink: D,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        surface.connect(events.clone());
        Self {
            config,
            store: ChannelStore::new(),
            engine_factory,
            surface,
            sink,
            events,
            engine: None,
            state: SessionState::Idle,
            fault: None,
            generation: 0,
            muted: false,
        }
    }

    /// Parses uploaded playlist text and replaces the channel collection
    /// wholesale. The first channel of a non-empty playlist is selected and
    /// its session started. Returns the parsed channel count.
    pub fn load_playlist(&mut self, upload: &PlaylistUpload) -> usize {
        let parsed = parse_playlist(&upload.text, &self.config.playlist);
        let total = parsed.total_channels;

        self.teardown();
        if let Some(first) = self.store.replace_all(parsed.channels) {
            if let Some(record) = self.store.get(first).cloned() {
                self.begin_session(&record);
            }
        }

        tracing::info!(
            playlist = %upload.suggested_name,
            channels = total,
            "loaded playlist"
        );
        total
    }

    /// Switches playback to another channel. The previous session is torn
    /// down before the new one is constructed; sessions never overlap.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ChannelNotFound` - Unknown channel id
    pub fn select_channel(&mut self, id: Uuid) -> Result<(), PlaybackError> {
        let record = self
            .store
            .get(id)
            .cloned()
            .ok_or(PlaybackError::ChannelNotFound { id })?;

        self.teardown();
        self.store.select(id);
        self.begin_session(&record);
        Ok(())
    }

    /// Clears the channel selection, cancelling any session in flight.
    pub fn clear_selection(&mut self) {
        self.teardown();
        self.store.clear_selection();
    }

    /// Resumes playback from `Paused`.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::NoSelection` - No channel selected
    /// - `PlaybackError::InvalidTransition` - Session is `Initializing` or
    ///   `Errored`
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            SessionState::Paused => {
                if let Err(detail) = self.surface.request_play() {
                    self.fail(PlaybackFault::PlaybackStart { detail });
                } else {
                    self.state = SessionState::Playing;
                }
                Ok(())
            }
            SessionState::Playing => Ok(()),
            SessionState::Idle => Err(PlaybackError::NoSelection),
            from => Err(PlaybackError::InvalidTransition {
                from,
                action: "play",
            }),
        }
    }

    /// Pauses playback.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::NoSelection` - No channel selected
    /// - `PlaybackError::InvalidTransition` - Session is `Initializing` or
    ///   `Errored`
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            SessionState::Playing => {
                self.surface.pause();
                self.state = SessionState::Paused;
                Ok(())
            }
            SessionState::Paused => Ok(()),
            SessionState::Idle => Err(PlaybackError::NoSelection),
            from => Err(PlaybackError::InvalidTransition {
                from,
                action: "pause",
            }),
        }
    }

    /// Mutes or unmutes the surface. Allowed in every state.
    pub fn set_muted(&mut self, muted: bool) {
        self.surface.set_muted(muted);
        self.muted = muted;
    }

    /// Delegates a fullscreen request to the surface; no state effect.
    pub fn request_fullscreen(&mut self) {
        self.surface.request_fullscreen();
    }

    /// Retries the current channel after a fault. Operationally identical
    /// to a fresh `Initializing` entry: the engine instance is destroyed,
    /// the fault cleared, and transport strategy selection re-run from
    /// scratch.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::InvalidTransition` - Session is not `Errored`
    /// - `PlaybackError::NoSelection` - Selection vanished underneath the
    ///   fault (defensive; not reachable through the facade)
    pub fn retry(&mut self) -> Result<(), PlaybackError> {
        if self.state != SessionState::Errored {
            return Err(PlaybackError::InvalidTransition {
                from: self.state,
                action: "retry",
            });
        }
        let record = self
            .store
            .selected()
            .cloned()
            .ok_or(PlaybackError::NoSelection)?;

        tracing::info!(channel = %record.name, "retrying stream");
        self.teardown();
        self.begin_session(&record);
        Ok(())
    }

    /// Flips a channel's favorite flag.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ChannelNotFound` - Unknown channel id
    pub fn toggle_favorite(&mut self, id: Uuid) -> Result<(), PlaybackError> {
        if self.store.toggle_favorite(id) {
            Ok(())
        } else {
            Err(PlaybackError::ChannelNotFound { id })
        }
    }

    /// Deletes a channel. When the deleted channel was selected, playback
    /// moves to the store's fallback channel, or goes idle if none remain.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ChannelNotFound` - Unknown channel id
    pub fn delete_channel(&mut self, id: Uuid) -> Result<(), PlaybackError> {
        match self.store.delete(id) {
            DeleteOutcome::NotFound => Err(PlaybackError::ChannelNotFound { id }),
            DeleteOutcome::Removed => Ok(()),
            DeleteOutcome::RemovedSelected { fallback } => {
                self.teardown();
                if let Some(record) = fallback.and_then(|next| self.store.get(next).cloned()) {
                    self.begin_session(&record);
                }
                Ok(())
            }
        }
    }

    /// Serializes the favorite subset and hands it to the download sink.
    /// Returns the number of exported channels.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::ExportEmpty` - No favorited channels; the sink is
    ///   not called
    pub fn export_favorites(&mut self) -> Result<usize, PlaybackError> {
        let favorites = self.store.favorites();
        if favorites.is_empty() {
            return Err(PlaybackError::ExportEmpty);
        }

        let payload = generate_playlist(&favorites);
        self.sink
            .deliver(&self.config.playlist.export_filename, &payload);
        tracing::info!(channels = favorites.len(), "exported favorites");
        Ok(favorites.len())
    }

    pub fn channels(&self) -> Vec<ChannelRecord> {
        self.store.channels().to_vec()
    }

    pub fn groups(&self) -> Vec<ChannelGroup> {
        self.store.groups()
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.state,
            channel: self.store.selected().cloned(),
            muted: self.muted,
            fault: self.fault.clone(),
        }
    }

    /// Applies a collaborator event. Events whose generation does not match
    /// the live session are stale leftovers of a torn-down engine and are
    /// discarded.
    pub fn handle_event(&mut self, event: SessionEvent) {
        if event.generation != self.generation {
            tracing::debug!(
                event_generation = event.generation,
                current_generation = self.generation,
                "discarding stale session event"
            );
            return;
        }

        match event.kind {
            SessionEventKind::Engine(EngineEvent::ManifestReady) => {
                if self.state == SessionState::Initializing {
                    if let Err(detail) = self.surface.request_play() {
                        self.fail(PlaybackFault::PlaybackStart { detail });
                    }
                }
            }
            SessionEventKind::Engine(EngineEvent::Fault { fatal: false, detail }) => {
                // The engine retries internally; nothing user-visible.
                tracing::debug!(detail, "non-fatal engine fault");
            }
            SessionEventKind::Engine(EngineEvent::Fault { fatal: true, detail }) => {
                self.fail(PlaybackFault::Transport { detail });
            }
            SessionEventKind::Surface(SurfaceEvent::FirstFrame) => {
                if self.state == SessionState::Initializing {
                    self.state = SessionState::Playing;
                    tracing::debug!("playback started");
                }
            }
            SessionEventKind::Surface(SurfaceEvent::Fault { detail }) => {
                if self.state != SessionState::Idle {
                    self.fail(PlaybackFault::Transport { detail });
                }
            }
        }
    }

    /// Tears down the live session and drops the engine before the actor
    /// loop stops.
    pub fn shutdown(&mut self) {
        self.teardown();
    }

    /// Enters `Initializing` for a channel and runs transport strategy
    /// selection once.
    fn begin_session(&mut self, record: &ChannelRecord) {
        self.fault = None;
        self.state = SessionState::Initializing;
        self.surface.begin(self.generation);
        self.surface.set_muted(self.muted);

        let adaptive = transport::is_adaptive(&record.url, &self.config.playback.adaptive_marker);
        let mut engine = if adaptive {
            self.engine_factory
                .create(&self.config.playback, self.events.clone(), self.generation)
        } else {
            None
        };

        match transport::select_transport(
            adaptive,
            engine.is_some(),
            self.surface.supports_native_adaptive(),
        ) {
            Some(TransportKind::AdaptiveEngine) => {
                if let Some(engine) = engine.as_mut() {
                    engine.load(&record.url);
                }
                self.engine = engine;
                tracing::info!(channel = %record.name, "attached adaptive engine");
            }
            Some(TransportKind::NativeAdaptive) => {
                self.surface.load_url(&record.url);
                tracing::info!(channel = %record.name, "using native adaptive playback");
            }
            Some(TransportKind::Direct) => {
                self.surface.load_url(&record.url);
                tracing::info!(channel = %record.name, "using direct stream");
            }
            None => {
                self.fail(PlaybackFault::CapabilityMismatch);
            }
        }
    }

    /// Synchronously destroys the attached engine (if any), resets the
    /// surface, and bumps the generation so any in-flight events from the
    /// old session are discarded.
    fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        self.surface.reset();
        self.generation = self.generation.wrapping_add(1);
        self.state = SessionState::Idle;
        self.fault = None;
    }

    fn fail(&mut self, fault: PlaybackFault) {
        tracing::warn!(%fault, "session fault");
        self.state = SessionState::Errored;
        self.fault = Some(fault);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::super::test_mocks::{MockDownloadSink, MockEngineFactory, MockSurface};
    use super::*;

    type TestSession = PlaybackSession<MockEngineFactory, MockSurface, MockDownloadSink>;

    struct Harness {
        session: TestSession,
        factory: MockEngineFactory,
        surface: MockSurface,
        sink: MockDownloadSink,
        events: UnboundedReceiver<SessionEvent>,
    }

    fn harness_with(factory: MockEngineFactory, surface: MockSurface) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = MockDownloadSink::new();
        let session = PlaybackSession::new(
            BeamcastConfig::default(),
            factory.clone(),
            surface.clone(),
            sink.clone(),
            tx,
        );
        Harness {
            session,
            factory,
            surface,
            sink,
            events: rx,
        }
    }

    fn harness() -> Harness {
        harness_with(MockEngineFactory::new(), MockSurface::new(false))
    }

    impl Harness {
        /// Feeds all pending collaborator events into the session.
        fn pump(&mut self) {
            while let Ok(event) = self.events.try_recv() {
                self.session.handle_event(event);
            }
        }

        fn load(&mut self, text: &str) -> usize {
            let upload = PlaylistUpload::new("test.m3u", text, ".m3u").unwrap();
            self.session.load_playlist(&upload)
        }

        fn load_two_channels(&mut self) -> (Uuid, Uuid) {
            self.load(
                "#EXTINF:-1,A\nhttp://e.com/a.m3u8\n#EXTINF:-1,B\nhttp://e.com/b.m3u8\n",
            );
            let channels = self.session.channels();
            (channels[0].id, channels[1].id)
        }
    }

    #[test]
    fn test_load_playlist_selects_first_and_initializes() {
        let mut h = harness();
        let total = h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        assert_eq!(total, 1);
        let status = h.session.status();
        assert_eq!(status.state, SessionState::Initializing);
        assert_eq!(status.channel.unwrap().name, "A");
        assert_eq!(h.factory.live_engines(), 1);
        assert_eq!(h.factory.last_loaded_url().as_deref(), Some("http://e.com/a.m3u8"));
    }

    #[test]
    fn test_empty_playlist_stays_idle() {
        let mut h = harness();
        assert_eq!(h.load("#EXTM3U\n"), 0);
        assert_eq!(h.session.status().state, SessionState::Idle);
        assert_eq!(h.factory.created(), 0);
    }

    #[test]
    fn test_direct_stream_bypasses_engine() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.ts\n");

        assert_eq!(h.factory.created(), 0);
        assert_eq!(h.surface.loaded_url().as_deref(), Some("http://e.com/a.ts"));
        assert_eq!(h.session.status().state, SessionState::Initializing);
    }

    #[test]
    fn test_native_adaptive_fallback() {
        let mut h = harness_with(MockEngineFactory::unavailable(), MockSurface::new(true));
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        assert_eq!(h.factory.created(), 0);
        assert_eq!(h.surface.loaded_url().as_deref(), Some("http://e.com/a.m3u8"));
        assert_eq!(h.session.status().state, SessionState::Initializing);
    }

    #[test]
    fn test_capability_mismatch_is_immediately_errored() {
        let mut h = harness_with(MockEngineFactory::unavailable(), MockSurface::new(false));
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        let status = h.session.status();
        assert_eq!(status.state, SessionState::Errored);
        assert_eq!(status.fault, Some(PlaybackFault::CapabilityMismatch));
        assert_eq!(h.surface.loaded_url(), None);
    }

    #[test]
    fn test_manifest_ready_requests_play_and_first_frame_starts_playback() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        h.factory.emit_manifest_ready();
        h.pump();
        assert_eq!(h.surface.play_requests(), 1);
        assert_eq!(h.session.status().state, SessionState::Initializing);

        h.surface.emit_first_frame();
        h.pump();
        assert_eq!(h.session.status().state, SessionState::Playing);
    }

    #[test]
    fn test_rejected_play_request_is_a_start_fault() {
        let mut h = harness();
        h.surface.reject_play("autoplay blocked");
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        h.factory.emit_manifest_ready();
        h.pump();

        let status = h.session.status();
        assert_eq!(status.state, SessionState::Errored);
        assert_eq!(
            status.fault,
            Some(PlaybackFault::PlaybackStart {
                detail: "autoplay blocked".to_string()
            })
        );
    }

    #[test]
    fn test_fatal_engine_fault_is_a_transport_fault() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        h.factory.emit_fault(true, "manifest load failed");
        h.pump();

        let status = h.session.status();
        assert_eq!(status.state, SessionState::Errored);
        assert_eq!(
            status.fault,
            Some(PlaybackFault::Transport {
                detail: "manifest load failed".to_string()
            })
        );
    }

    #[test]
    fn test_non_fatal_engine_fault_is_ignored() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        h.factory.emit_fault(false, "segment retry");
        h.pump();

        assert_eq!(h.session.status().state, SessionState::Initializing);
        assert_eq!(h.session.status().fault, None);
    }

    #[test]
    fn test_surface_fault_errors_session() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.ts\n");

        h.surface.emit_fault("decode error");
        h.pump();

        assert_eq!(h.session.status().state, SessionState::Errored);
    }

    #[test]
    fn test_pause_resume_toggle() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");
        h.factory.emit_manifest_ready();
        h.surface.emit_first_frame();
        h.pump();

        h.session.pause().unwrap();
        assert_eq!(h.session.status().state, SessionState::Paused);
        assert!(h.surface.is_paused());

        h.session.play().unwrap();
        assert_eq!(h.session.status().state, SessionState::Playing);

        // Idempotent in the current state.
        h.session.play().unwrap();
        h.session.pause().unwrap();
        h.session.pause().unwrap();
        assert_eq!(h.session.status().state, SessionState::Paused);
    }

    #[test]
    fn test_pause_and_play_rejected_outside_their_states() {
        let mut h = harness();
        assert!(matches!(h.session.play(), Err(PlaybackError::NoSelection)));
        assert!(matches!(h.session.pause(), Err(PlaybackError::NoSelection)));

        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");
        assert!(matches!(
            h.session.play(),
            Err(PlaybackError::InvalidTransition { action: "play", .. })
        ));

        h.factory.emit_fault(true, "dead stream");
        h.pump();
        assert!(matches!(
            h.session.pause(),
            Err(PlaybackError::InvalidTransition { action: "pause", .. })
        ));
    }

    #[test]
    fn test_retry_only_from_errored() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");
        assert!(matches!(
            h.session.retry(),
            Err(PlaybackError::InvalidTransition { action: "retry", .. })
        ));
    }

    #[test]
    fn test_retry_rebuilds_engine_from_scratch() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");
        h.factory.emit_fault(true, "transient");
        h.pump();
        assert_eq!(h.session.status().state, SessionState::Errored);

        h.session.retry().unwrap();

        let status = h.session.status();
        assert_eq!(status.state, SessionState::Initializing);
        assert_eq!(status.fault, None);
        assert_eq!(h.factory.created(), 2);
        assert_eq!(h.factory.live_engines(), 1);
    }

    #[test]
    fn test_switching_channels_never_overlaps_engines() {
        let mut h = harness();
        let (_, b) = h.load_two_channels();
        assert_eq!(h.factory.live_engines(), 1);

        h.session.select_channel(b).unwrap();

        assert_eq!(h.factory.live_engines(), 1);
        assert_eq!(h.factory.created(), 2);
        assert_eq!(h.factory.last_loaded_url().as_deref(), Some("http://e.com/b.m3u8"));
        assert_eq!(h.session.status().channel.unwrap().name, "B");
    }

    #[test]
    fn test_stale_events_from_previous_session_are_discarded() {
        let mut h = harness();
        let (_, b) = h.load_two_channels();

        // A fatal fault from channel A's engine, delivered only after the
        // switch to B, must not affect B's session.
        h.factory.emit_fault(true, "stale fault from A");
        h.session.select_channel(b).unwrap();
        h.pump();

        let status = h.session.status();
        assert_eq!(status.state, SessionState::Initializing);
        assert_eq!(status.fault, None);
    }

    #[test]
    fn test_clear_selection_goes_idle_and_destroys_engine() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");
        assert_eq!(h.factory.live_engines(), 1);

        h.session.clear_selection();

        assert_eq!(h.factory.live_engines(), 0);
        let status = h.session.status();
        assert_eq!(status.state, SessionState::Idle);
        assert!(status.channel.is_none());
    }

    #[test]
    fn test_delete_selected_switches_to_fallback() {
        let mut h = harness();
        let (a, _) = h.load_two_channels();

        h.session.delete_channel(a).unwrap();

        assert_eq!(h.session.status().channel.unwrap().name, "B");
        assert_eq!(h.session.status().state, SessionState::Initializing);
        assert_eq!(h.factory.live_engines(), 1);
    }

    #[test]
    fn test_delete_last_channel_goes_idle() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");
        let a = h.session.channels()[0].id;

        h.session.delete_channel(a).unwrap();

        assert_eq!(h.session.status().state, SessionState::Idle);
        assert_eq!(h.factory.live_engines(), 0);
    }

    #[test]
    fn test_export_favorites_through_sink() {
        let mut h = harness();
        let (a, _) = h.load_two_channels();
        h.session.toggle_favorite(a).unwrap();

        let exported = h.session.export_favorites().unwrap();
        assert_eq!(exported, 1);

        let deliveries = h.sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "favorites.m3u");
        assert!(deliveries[0].1.contains(",A\n"));
        assert!(!deliveries[0].1.contains(",B\n"));
    }

    #[test]
    fn test_export_with_no_favorites_never_calls_sink() {
        let mut h = harness();
        h.load_two_channels();

        assert!(matches!(
            h.session.export_favorites(),
            Err(PlaybackError::ExportEmpty)
        ));
        assert!(h.sink.deliveries().is_empty());
    }

    #[test]
    fn test_mute_is_tracked_and_survives_channel_switch() {
        let mut h = harness();
        let (_, b) = h.load_two_channels();

        h.session.set_muted(true);
        assert!(h.session.status().muted);
        assert!(h.surface.is_muted());

        h.session.select_channel(b).unwrap();
        assert!(h.session.status().muted);
        assert!(h.surface.is_muted());
    }

    #[test]
    fn test_fullscreen_has_no_state_effect() {
        let mut h = harness();
        h.load("#EXTINF:-1,A\nhttp://e.com/a.m3u8\n");

        h.session.request_fullscreen();

        assert_eq!(h.surface.fullscreen_requests(), 1);
        assert_eq!(h.session.status().state, SessionState::Initializing);
    }
}

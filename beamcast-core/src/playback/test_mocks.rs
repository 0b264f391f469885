//! Mock engine, surface, and download sink for playback tests.
//!
//! The mocks share handles with the test so collaborator events can be
//! injected after the real objects have been moved into the session.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::engine::{
    AdaptiveEngine, DownloadSink, EngineEvent, EngineFactory, MediaSurface, SessionEvent,
    SurfaceEvent,
};
use crate::config::PlaybackConfig;

#[derive(Debug, Default)]
struct FactoryShared {
    available: bool,
    created: usize,
    live: usize,
    last_url: Option<String>,
    last_events: Option<mpsc::UnboundedSender<SessionEvent>>,
    last_generation: u64,
}

/// Engine factory whose created engines are observable from the test.
///
/// Event emitters target the most recently created engine's channel and
/// generation, mimicking callbacks from that engine instance.
#[derive(Clone)]
pub struct MockEngineFactory {
    shared: Arc<Mutex<FactoryShared>>,
}

impl MockEngineFactory {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(FactoryShared {
                available: true,
                ..FactoryShared::default()
            })),
        }
    }

    /// A factory representing a runtime without an adaptive engine.
    pub fn unavailable() -> Self {
        Self {
            shared: Arc::new(Mutex::new(FactoryShared::default())),
        }
    }

    /// Total engines ever created.
    pub fn created(&self) -> usize {
        self.shared.lock().unwrap().created
    }

    /// Engines currently attached (created and not yet destroyed).
    pub fn live_engines(&self) -> usize {
        self.shared.lock().unwrap().live
    }

    pub fn last_loaded_url(&self) -> Option<String> {
        self.shared.lock().unwrap().last_url.clone()
    }

    pub fn emit_manifest_ready(&self) {
        self.emit(EngineEvent::ManifestReady);
    }

    pub fn emit_fault(&self, fatal: bool, detail: &str) {
        self.emit(EngineEvent::Fault {
            fatal,
            detail: detail.to_string(),
        });
    }

    /// Emits an event under an arbitrary generation tag, regardless of the
    /// current engine's generation.
    pub fn emit_with_generation(&self, generation: u64, event: EngineEvent) {
        let shared = self.shared.lock().unwrap();
        if let Some(events) = &shared.last_events {
            let _ = events.send(SessionEvent::engine(generation, event));
        }
    }

    /// The generation of the most recently created engine.
    pub fn last_generation(&self) -> u64 {
        self.shared.lock().unwrap().last_generation
    }

    fn emit(&self, event: EngineEvent) {
        let shared = self.shared.lock().unwrap();
        if let Some(events) = &shared.last_events {
            let _ = events.send(SessionEvent::engine(shared.last_generation, event));
        }
    }
}

impl Default for MockEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(
        &mut self,
        _config: &PlaybackConfig,
        events: mpsc::UnboundedSender<SessionEvent>,
        generation: u64,
    ) -> Option<Box<dyn AdaptiveEngine>> {
        let mut shared = self.shared.lock().unwrap();
        if !shared.available {
            return None;
        }
        shared.created += 1;
        shared.live += 1;
        shared.last_events = Some(events);
        shared.last_generation = generation;

        Some(Box::new(MockAdaptiveEngine {
            shared: Arc::clone(&self.shared),
            destroyed: false,
        }))
    }
}

struct MockAdaptiveEngine {
    shared: Arc<Mutex<FactoryShared>>,
    destroyed: bool,
}

impl AdaptiveEngine for MockAdaptiveEngine {
    fn load(&mut self, url: &str) {
        self.shared.lock().unwrap().last_url = Some(url.to_string());
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.shared.lock().unwrap().live -= 1;
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceShared {
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    generation: u64,
    native_adaptive: bool,
    loaded_url: Option<String>,
    play_requests: usize,
    play_rejection: Option<String>,
    paused: bool,
    muted: bool,
    fullscreen_requests: usize,
    resets: usize,
}

/// Playback surface whose interactions are observable from the test.
#[derive(Clone)]
pub struct MockSurface {
    shared: Arc<Mutex<SurfaceShared>>,
}

impl MockSurface {
    pub fn new(native_adaptive: bool) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SurfaceShared {
                native_adaptive,
                ..SurfaceShared::default()
            })),
        }
    }

    pub fn loaded_url(&self) -> Option<String> {
        self.shared.lock().unwrap().loaded_url.clone()
    }

    pub fn play_requests(&self) -> usize {
        self.shared.lock().unwrap().play_requests
    }

    /// Makes subsequent play requests fail with the given detail.
    pub fn reject_play(&self, detail: &str) {
        self.shared.lock().unwrap().play_rejection = Some(detail.to_string());
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().unwrap().paused
    }

    pub fn is_muted(&self) -> bool {
        self.shared.lock().unwrap().muted
    }

    pub fn fullscreen_requests(&self) -> usize {
        self.shared.lock().unwrap().fullscreen_requests
    }

    pub fn resets(&self) -> usize {
        self.shared.lock().unwrap().resets
    }

    pub fn emit_first_frame(&self) {
        self.emit(SurfaceEvent::FirstFrame);
    }

    pub fn emit_fault(&self, detail: &str) {
        self.emit(SurfaceEvent::Fault {
            detail: detail.to_string(),
        });
    }

    fn emit(&self, event: SurfaceEvent) {
        let shared = self.shared.lock().unwrap();
        if let Some(events) = &shared.events {
            let _ = events.send(SessionEvent::surface(shared.generation, event));
        }
    }
}

impl MediaSurface for MockSurface {
    fn connect(&mut self, events: mpsc::UnboundedSender<SessionEvent>) {
        self.shared.lock().unwrap().events = Some(events);
    }

    fn begin(&mut self, generation: u64) {
        self.shared.lock().unwrap().generation = generation;
    }

    fn load_url(&mut self, url: &str) {
        self.shared.lock().unwrap().loaded_url = Some(url.to_string());
    }

    fn request_play(&mut self) -> Result<(), String> {
        let mut shared = self.shared.lock().unwrap();
        shared.play_requests += 1;
        match &shared.play_rejection {
            Some(detail) => Err(detail.clone()),
            None => {
                shared.paused = false;
                Ok(())
            }
        }
    }

    fn pause(&mut self) {
        self.shared.lock().unwrap().paused = true;
    }

    fn set_muted(&mut self, muted: bool) {
        self.shared.lock().unwrap().muted = muted;
    }

    fn request_fullscreen(&mut self) {
        self.shared.lock().unwrap().fullscreen_requests += 1;
    }

    fn supports_native_adaptive(&self) -> bool {
        self.shared.lock().unwrap().native_adaptive
    }

    fn reset(&mut self) {
        let mut shared = self.shared.lock().unwrap();
        shared.resets += 1;
        shared.loaded_url = None;
        shared.paused = false;
    }
}

/// Download sink that records every delivery.
#[derive(Clone, Default)]
pub struct MockDownloadSink {
    deliveries: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockDownloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl DownloadSink for MockDownloadSink {
    fn deliver(&mut self, filename: &str, payload: &str) {
        self.deliveries
            .lock()
            .unwrap()
            .push((filename.to_string(), payload.to_string()));
    }
}

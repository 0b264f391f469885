//! CLI command implementations

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use tokio::fs;
use tokio::sync::mpsc;

use beamcast_core::config::BeamcastConfig;
use beamcast_core::playback::{
    AdaptiveEngine, DownloadSink, EngineEvent, EngineFactory, MediaSurface, PlaybackFacade,
    SessionEvent, SessionState, SurfaceEvent, spawn_playback,
};
use beamcast_core::playlist::{
    ChannelRecord, JsonFileListStore, ListStore, PlaylistUpload, parse_playlist,
};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a playlist and print its channels by group
    Inspect {
        /// Path to a .m3u playlist file
        file: PathBuf,
        /// Save the parsed list to the saved-lists store
        #[arg(long)]
        save: bool,
        /// Path of the saved-lists store document
        #[arg(long, default_value = "lists.json")]
        store: PathBuf,
    },
    /// Export all channels of a playlist as a favorites playlist
    Export {
        /// Path to a .m3u playlist file
        file: PathBuf,
        /// Output path (defaults to the configured export filename)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Run a simulated playback session against a playlist
    Play {
        /// Path to a .m3u playlist file
        file: PathBuf,
        /// Channel name to play (defaults to the first channel)
        #[arg(short, long)]
        channel: Option<String>,
    },
    /// Show saved channel lists
    Lists {
        /// Path of the saved-lists store document
        #[arg(long, default_value = "lists.json")]
        store: PathBuf,
    },
}

/// Dispatches a parsed CLI command.
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let config = BeamcastConfig::from_env();
    match command {
        Commands::Inspect { file, save, store } => inspect(&config, &file, save, &store).await,
        Commands::Export { file, out } => export(&config, &file, out).await,
        Commands::Play { file, channel } => play(&config, &file, channel).await,
        Commands::Lists { store } => lists(&store).await,
    }
}

async fn read_upload(config: &BeamcastConfig, file: &Path) -> anyhow::Result<PlaylistUpload> {
    let text = fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let suggested_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(PlaylistUpload::new(
        suggested_name,
        text,
        config.playlist.accepted_extension,
    )?)
}

async fn inspect(
    config: &BeamcastConfig,
    file: &Path,
    save: bool,
    store_path: &Path,
) -> anyhow::Result<()> {
    let upload = read_upload(config, file).await?;
    let parsed = parse_playlist(&upload.text, &config.playlist);

    println!("{}: {} channels", upload.suggested_name, parsed.total_channels);

    let mut by_group: Vec<(&str, Vec<&ChannelRecord>)> = Vec::new();
    for channel in &parsed.channels {
        match by_group.iter_mut().find(|(name, _)| *name == channel.group) {
            Some((_, members)) => members.push(channel),
            None => by_group.push((&channel.group, vec![channel])),
        }
    }

    for (group, members) in &by_group {
        println!("\n{} ({})", group, members.len());
        for channel in members {
            let host = url::Url::parse(&channel.url)
                .ok()
                .and_then(|parsed_url| parsed_url.host_str().map(str::to_string))
                .unwrap_or_else(|| "-".to_string());
            println!("  {} [{}]", channel.name, host);
        }
    }

    if save {
        let mut store = JsonFileListStore::open(store_path).await?;
        let id = store.put(&upload.suggested_name, parsed.channels).await?;
        store.set_current_selection(Some(id)).await?;
        println!("\nSaved as list {id}");
    }

    Ok(())
}

/// Download sink that writes the exported payload to a file.
struct FileDownloadSink {
    directory: PathBuf,
    out: Option<PathBuf>,
}

impl DownloadSink for FileDownloadSink {
    fn deliver(&mut self, filename: &str, payload: &str) {
        let path = self
            .out
            .clone()
            .unwrap_or_else(|| self.directory.join(filename));
        if let Err(error) = std::fs::write(&path, payload) {
            tracing::error!(path = %path.display(), %error, "failed to write export");
        } else {
            println!("Wrote {}", path.display());
        }
    }
}

async fn export(
    config: &BeamcastConfig,
    file: &Path,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let upload = read_upload(config, file).await?;
    let sink = FileDownloadSink {
        directory: PathBuf::from("."),
        out,
    };
    let facade = spawn_playback(config.clone(), SimEngineFactory, SimSurface::new(), sink);

    let total = facade.load_playlist(upload).await?;
    if total == 0 {
        anyhow::bail!("playlist contains no channels");
    }

    // Everything becomes a favorite so the whole list round-trips through
    // the export path.
    for channel in facade.channels().await? {
        facade.toggle_favorite(channel.id).await?;
    }

    let exported = facade.export_favorites().await?;
    println!("Exported {exported} channels");
    facade.shutdown().await?;
    Ok(())
}

async fn play(
    config: &BeamcastConfig,
    file: &Path,
    channel: Option<String>,
) -> anyhow::Result<()> {
    let upload = read_upload(config, file).await?;
    let facade = spawn_playback(
        config.clone(),
        SimEngineFactory,
        SimSurface::new(),
        FileDownloadSink {
            directory: PathBuf::from("."),
            out: None,
        },
    );

    let total = facade.load_playlist(upload).await?;
    if total == 0 {
        anyhow::bail!("playlist contains no channels");
    }

    if let Some(name) = channel {
        let channels = facade.channels().await?;
        let target = channels
            .iter()
            .find(|record| record.name == name)
            .with_context(|| format!("no channel named {name:?}"))?;
        facade.select_channel(target.id).await?;
    }

    watch_session(&facade).await?;
    facade.shutdown().await?;
    Ok(())
}

/// Polls the session until it settles in `Playing` or `Errored`, printing
/// each observed state transition.
async fn watch_session(facade: &PlaybackFacade) -> anyhow::Result<()> {
    let mut last_state = None;
    for _ in 0..100 {
        let status = facade.status().await?;
        if last_state != Some(status.state) {
            match &status.channel {
                Some(channel) => println!("{:?} - {}", status.state, channel.name),
                None => println!("{:?}", status.state),
            }
            last_state = Some(status.state);
        }
        match status.state {
            SessionState::Playing => return Ok(()),
            SessionState::Errored => {
                let detail = status
                    .fault_message()
                    .unwrap_or_else(|| "unknown fault".to_string());
                anyhow::bail!("stream failed: {detail}");
            }
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    anyhow::bail!("stream did not start in time")
}

async fn lists(store_path: &Path) -> anyhow::Result<()> {
    let store = JsonFileListStore::open(store_path).await?;
    let summaries = store.list().await?;
    if summaries.is_empty() {
        println!("No saved lists");
        return Ok(());
    }

    let current = store.current_selection().await?;
    for summary in summaries {
        let marker = if current == Some(summary.id) { "*" } else { " " };
        println!(
            "{} {}  {} channels  updated {}",
            marker,
            summary.name,
            summary.channel_count,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Adaptive engine that reports its manifest ready as soon as it loads.
struct SimEngine {
    events: mpsc::UnboundedSender<SessionEvent>,
    generation: u64,
}

impl AdaptiveEngine for SimEngine {
    fn load(&mut self, url: &str) {
        tracing::debug!(url, "simulated engine loading manifest");
        let _ = self
            .events
            .send(SessionEvent::engine(self.generation, EngineEvent::ManifestReady));
    }

    fn destroy(&mut self) {}
}

struct SimEngineFactory;

impl EngineFactory for SimEngineFactory {
    fn create(
        &mut self,
        _config: &beamcast_core::config::PlaybackConfig,
        events: mpsc::UnboundedSender<SessionEvent>,
        generation: u64,
    ) -> Option<Box<dyn AdaptiveEngine>> {
        Some(Box::new(SimEngine { events, generation }))
    }
}

/// Playback surface that starts rendering the moment it is fed.
struct SimSurface {
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    generation: u64,
}

impl SimSurface {
    fn new() -> Self {
        Self {
            events: None,
            generation: 0,
        }
    }

    fn emit_first_frame(&self) {
        if let Some(events) = &self.events {
            let _ = events.send(SessionEvent::surface(
                self.generation,
                SurfaceEvent::FirstFrame,
            ));
        }
    }
}

impl MediaSurface for SimSurface {
    fn connect(&mut self, events: mpsc::UnboundedSender<SessionEvent>) {
        self.events = Some(events);
    }

    fn begin(&mut self, generation: u64) {
        self.generation = generation;
    }

    fn load_url(&mut self, url: &str) {
        tracing::debug!(url, "simulated surface loading stream");
        self.emit_first_frame();
    }

    fn request_play(&mut self) -> Result<(), String> {
        self.emit_first_frame();
        Ok(())
    }

    fn pause(&mut self) {}

    fn set_muted(&mut self, _muted: bool) {}

    fn request_fullscreen(&mut self) {}

    fn supports_native_adaptive(&self) -> bool {
        false
    }

    fn reset(&mut self) {}
}

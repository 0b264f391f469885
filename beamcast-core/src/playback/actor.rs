//! Actor implementation for the playback session.

use tokio::sync::mpsc;

use super::commands::PlaybackCommand;
use super::engine::{DownloadSink, EngineFactory, MediaSurface, SessionEvent};
use super::facade::PlaybackFacade;
use super::session::PlaybackSession;
use crate::config::BeamcastConfig;

/// Spawns the playback actor and returns its facade.
///
/// Creates a playback session with the provided collaborators, then spawns
/// it as an actor running in a separate task. The actor processes commands
/// and collaborator events sequentially, which makes the state machine
/// reentrant-safe: teardown of an old session always completes before the
/// next command or event is looked at.
pub fn spawn_playback<F, S, D>(
    config: BeamcastConfig,
    engine_factory: F,
    surface: S,
    sink: D,
) -> PlaybackFacade
where
    F: EngineFactory,
    S: MediaSurface,
    D: DownloadSink,
{
    let (sender, receiver) = mpsc::channel(config.playback.command_buffer);
    let (event_sender, event_receiver) = mpsc::unbounded_channel();
    let session = PlaybackSession::new(config, engine_factory, surface, sink, event_sender);

    tokio::spawn(async move {
        run_actor_loop(session, receiver, event_receiver).await;
    });

    PlaybackFacade::new(sender)
}

/// Runs the main actor message processing loop.
///
/// Commands and collaborator events are interleaved on a single task, one
/// at a time. The loop continues until the command channel closes or a
/// shutdown command arrives.
async fn run_actor_loop<F, S, D>(
    mut session: PlaybackSession<F, S, D>,
    mut receiver: mpsc::Receiver<PlaybackCommand>,
    mut event_receiver: mpsc::UnboundedReceiver<SessionEvent>,
) where
    F: EngineFactory,
    S: MediaSurface,
    D: DownloadSink,
{
    tracing::debug!("playback actor started");

    loop {
        tokio::select! {
            Some(command) = receiver.recv() => {
                if !handle_command(&mut session, command) {
                    break;
                }
            }
            Some(event) = event_receiver.recv() => {
                session.handle_event(event);
            }
            else => break,
        }
    }

    session.shutdown();
    tracing::debug!("playback actor stopped");
}

/// Handles a single command for the playback session.
/// Returns true to continue processing, false to shutdown.
fn handle_command<F, S, D>(session: &mut PlaybackSession<F, S, D>, command: PlaybackCommand) -> bool
where
    F: EngineFactory,
    S: MediaSurface,
    D: DownloadSink,
{
    match command {
        PlaybackCommand::LoadPlaylist { upload, responder } => {
            let total = session.load_playlist(&upload);
            let _ = responder.send(total);
        }

        PlaybackCommand::SelectChannel { id, responder } => {
            let _ = responder.send(session.select_channel(id));
        }

        PlaybackCommand::ClearSelection { responder } => {
            session.clear_selection();
            let _ = responder.send(());
        }

        PlaybackCommand::Play { responder } => {
            let _ = responder.send(session.play());
        }

        PlaybackCommand::Pause { responder } => {
            let _ = responder.send(session.pause());
        }

        PlaybackCommand::SetMuted { muted, responder } => {
            session.set_muted(muted);
            let _ = responder.send(());
        }

        PlaybackCommand::Retry { responder } => {
            let _ = responder.send(session.retry());
        }

        PlaybackCommand::RequestFullscreen { responder } => {
            session.request_fullscreen();
            let _ = responder.send(());
        }

        PlaybackCommand::ToggleFavorite { id, responder } => {
            let _ = responder.send(session.toggle_favorite(id));
        }

        PlaybackCommand::DeleteChannel { id, responder } => {
            let _ = responder.send(session.delete_channel(id));
        }

        PlaybackCommand::ExportFavorites { responder } => {
            let _ = responder.send(session.export_favorites());
        }

        PlaybackCommand::GetChannels { responder } => {
            let _ = responder.send(session.channels());
        }

        PlaybackCommand::GetGroups { responder } => {
            let _ = responder.send(session.groups());
        }

        PlaybackCommand::GetStatus { responder } => {
            let _ = responder.send(session.status());
        }

        PlaybackCommand::Shutdown { responder } => {
            tracing::debug!("playback actor shutting down");
            let _ = responder.send(());
            return false;
        }
    }
    true
}

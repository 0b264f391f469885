//! Integration tests driving the playback actor through its facade.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::BeamcastConfig;
    use crate::playback::test_mocks::{MockDownloadSink, MockEngineFactory, MockSurface};
    use crate::playback::{
        EngineEvent, PlaybackError, PlaybackFacade, PlaybackFault, SessionState, spawn_playback,
    };
    use crate::playlist::PlaylistUpload;

    const TWO_CHANNELS: &str =
        "#EXTM3U\n\n#EXTINF:-1,A\nhttp://e.com/a.m3u8\n\n#EXTINF:-1,B\nhttp://e.com/b.m3u8\n";

    fn spawn_with_mocks() -> (PlaybackFacade, MockEngineFactory, MockSurface, MockDownloadSink) {
        let factory = MockEngineFactory::new();
        let surface = MockSurface::new(false);
        let sink = MockDownloadSink::new();
        let facade = spawn_playback(
            BeamcastConfig::default(),
            factory.clone(),
            surface.clone(),
            sink.clone(),
        );
        (facade, factory, surface, sink)
    }

    fn upload(text: &str) -> PlaylistUpload {
        PlaylistUpload::new("test.m3u", text, ".m3u").unwrap()
    }

    /// Polls status until the session reaches the expected state, so tests
    /// stay robust against command/event interleaving in the actor loop.
    async fn wait_for_state(
        facade: &PlaybackFacade,
        state: SessionState,
    ) -> crate::playback::PlaybackStatus {
        for _ in 0..200 {
            let status = facade.status().await.unwrap();
            if status.state == state {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("timed out waiting for {state:?}");
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let (facade, _factory, _surface, _sink) = spawn_with_mocks();
        assert!(facade.is_running());

        let status = facade.status().await.unwrap();
        assert_eq!(status.state, SessionState::Idle);
        assert!(status.channel.is_none());

        facade.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(matches!(
            facade.status().await,
            Err(PlaybackError::FacadeShutdown)
        ));
    }

    #[tokio::test]
    async fn test_load_select_play_pause_cycle() {
        let (facade, factory, surface, _sink) = spawn_with_mocks();

        let total = facade.load_playlist(upload(TWO_CHANNELS)).await.unwrap();
        assert_eq!(total, 2);

        let status = wait_for_state(&facade, SessionState::Initializing).await;
        assert_eq!(status.channel.as_ref().unwrap().name, "A");

        factory.emit_manifest_ready();
        surface.emit_first_frame();
        wait_for_state(&facade, SessionState::Playing).await;

        facade.pause().await.unwrap();
        wait_for_state(&facade, SessionState::Paused).await;

        facade.play().await.unwrap();
        wait_for_state(&facade, SessionState::Playing).await;
    }

    #[tokio::test]
    async fn test_switch_while_initializing_leaves_one_engine_on_new_channel() {
        let (facade, factory, surface, _sink) = spawn_with_mocks();
        facade.load_playlist(upload(TWO_CHANNELS)).await.unwrap();
        wait_for_state(&facade, SessionState::Initializing).await;
        let generation_a = factory.last_generation();

        let b = facade.channels().await.unwrap()[1].id;
        facade.select_channel(b).await.unwrap();

        assert_eq!(factory.live_engines(), 1);
        assert_eq!(factory.created(), 2);
        assert_eq!(
            factory.last_loaded_url().as_deref(),
            Some("http://e.com/b.m3u8")
        );

        // Residual events from A's destroyed engine must not affect B.
        factory.emit_with_generation(
            generation_a,
            EngineEvent::Fault {
                fatal: true,
                detail: "late fault from old engine".to_string(),
            },
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        let status = facade.status().await.unwrap();
        assert_eq!(status.state, SessionState::Initializing);
        assert_eq!(status.fault, None);

        factory.emit_manifest_ready();
        surface.emit_first_frame();
        let status = wait_for_state(&facade, SessionState::Playing).await;
        assert_eq!(status.channel.unwrap().name, "B");
    }

    #[tokio::test]
    async fn test_switch_while_errored_recovers_on_new_channel() {
        let (facade, factory, _surface, _sink) = spawn_with_mocks();
        facade.load_playlist(upload(TWO_CHANNELS)).await.unwrap();
        wait_for_state(&facade, SessionState::Initializing).await;

        factory.emit_fault(true, "broken stream");
        let status = wait_for_state(&facade, SessionState::Errored).await;
        assert_eq!(
            status.fault,
            Some(PlaybackFault::Transport {
                detail: "broken stream".to_string()
            })
        );
        assert_eq!(factory.live_engines(), 1);

        let b = facade.channels().await.unwrap()[1].id;
        facade.select_channel(b).await.unwrap();

        assert_eq!(factory.live_engines(), 1);
        let status = wait_for_state(&facade, SessionState::Initializing).await;
        assert_eq!(status.fault, None);
        assert_eq!(status.channel.unwrap().name, "B");
    }

    #[tokio::test]
    async fn test_retry_after_fault_through_facade() {
        let (facade, factory, surface, _sink) = spawn_with_mocks();
        facade.load_playlist(upload(TWO_CHANNELS)).await.unwrap();
        wait_for_state(&facade, SessionState::Initializing).await;

        factory.emit_fault(true, "transient");
        wait_for_state(&facade, SessionState::Errored).await;

        facade.retry().await.unwrap();
        let status = wait_for_state(&facade, SessionState::Initializing).await;
        assert_eq!(status.fault, None);
        assert_eq!(factory.created(), 2);
        assert_eq!(factory.live_engines(), 1);

        factory.emit_manifest_ready();
        surface.emit_first_frame();
        wait_for_state(&facade, SessionState::Playing).await;
    }

    #[tokio::test]
    async fn test_retry_rejected_when_not_errored() {
        let (facade, _factory, _surface, _sink) = spawn_with_mocks();
        facade.load_playlist(upload(TWO_CHANNELS)).await.unwrap();

        assert!(matches!(
            facade.retry().await,
            Err(PlaybackError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_export_favorites_through_facade() {
        let (facade, _factory, _surface, sink) = spawn_with_mocks();
        facade.load_playlist(upload(TWO_CHANNELS)).await.unwrap();

        assert!(matches!(
            facade.export_favorites().await,
            Err(PlaybackError::ExportEmpty)
        ));
        assert!(sink.deliveries().is_empty());

        let a = facade.channels().await.unwrap()[0].id;
        facade.toggle_favorite(a).await.unwrap();
        let exported = facade.export_favorites().await.unwrap();
        assert_eq!(exported, 1);

        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "favorites.m3u");
        assert!(deliveries[0].1.starts_with("#EXTM3U\n"));
    }

    #[tokio::test]
    async fn test_groups_and_mute_through_facade() {
        let (facade, _factory, surface, _sink) = spawn_with_mocks();
        facade
            .load_playlist(upload(
                "#EXTINF:-1 group-title=\"News\",A\nhttp://e.com/a.ts\n\n#EXTINF:-1 group-title=\"Sports\",B\nhttp://e.com/b.ts\n",
            ))
            .await
            .unwrap();

        let groups = facade.groups().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "News");

        facade.set_muted(true).await.unwrap();
        assert!(facade.status().await.unwrap().muted);
        assert!(surface.is_muted());
    }
}

//! Centralized configuration for Beamcast.
//!
//! All tunable parameters are defined here to avoid hard-coded values
//! scattered throughout the codebase.

/// Central configuration for all Beamcast components.
///
/// Groups related settings into logical sections. Supports environment
/// variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct BeamcastConfig {
    pub playlist: PlaylistConfig,
    pub playback: PlaybackConfig,
}

/// Playlist parsing and export configuration.
#[derive(Debug, Clone)]
pub struct PlaylistConfig {
    /// Group assigned to channels without a `group-title` attribute
    pub default_group: &'static str,
    /// Display name assigned when a metadata line carries no comma
    pub fallback_name: &'static str,
    /// File extension accepted for uploaded playlists
    pub accepted_extension: &'static str,
    /// Filename suggested when exporting favorites
    pub export_filename: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            default_group: "Uncategorized",
            fallback_name: "Unknown Channel",
            accepted_extension: ".m3u",
            export_filename: "favorites.m3u".to_string(),
        }
    }
}

/// Playback session and adaptive engine configuration.
///
/// The engine tuning fields are opaque to the session itself and are handed
/// to the engine factory verbatim.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Token that marks a transport URL as a segmented/adaptive manifest
    pub adaptive_marker: String,
    /// Capacity of the playback actor's command channel
    pub command_buffer: usize,
    /// Whether the adaptive engine should offload demuxing to a worker
    pub enable_worker: bool,
    /// Whether the adaptive engine should run in low-latency mode
    pub low_latency: bool,
    /// Seconds of back buffer the adaptive engine retains
    pub back_buffer_seconds: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            adaptive_marker: "m3u8".to_string(),
            command_buffer: 100,
            enable_worker: true,
            low_latency: true,
            back_buffer_seconds: 90,
        }
    }
}

impl BeamcastConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(filename) = std::env::var("BEAMCAST_EXPORT_FILENAME") {
            if !filename.is_empty() {
                config.playlist.export_filename = filename;
            }
        }

        if let Ok(marker) = std::env::var("BEAMCAST_ADAPTIVE_MARKER") {
            if !marker.is_empty() {
                config.playback.adaptive_marker = marker;
            }
        }

        if let Ok(buffer) = std::env::var("BEAMCAST_COMMAND_BUFFER") {
            if let Ok(capacity) = buffer.parse::<usize>() {
                if capacity > 0 {
                    config.playback.command_buffer = capacity;
                }
            }
        }

        if let Ok(seconds) = std::env::var("BEAMCAST_BACK_BUFFER_SECONDS") {
            if let Ok(value) = seconds.parse::<u32>() {
                config.playback.back_buffer_seconds = value;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BeamcastConfig::default();

        assert_eq!(config.playlist.default_group, "Uncategorized");
        assert_eq!(config.playlist.fallback_name, "Unknown Channel");
        assert_eq!(config.playlist.accepted_extension, ".m3u");
        assert_eq!(config.playlist.export_filename, "favorites.m3u");
        assert_eq!(config.playback.adaptive_marker, "m3u8");
        assert_eq!(config.playback.command_buffer, 100);
        assert!(config.playback.enable_worker);
        assert!(config.playback.low_latency);
        assert_eq!(config.playback.back_buffer_seconds, 90);
    }

    // Process-wide environment is shared across test threads, so all
    // `BEAMCAST_*` manipulation lives in this single test.
    #[test]
    fn test_env_overrides_and_invalid_value_rejection() {
        unsafe {
            std::env::set_var("BEAMCAST_EXPORT_FILENAME", "picks.m3u");
            std::env::set_var("BEAMCAST_ADAPTIVE_MARKER", "mpd");
            std::env::set_var("BEAMCAST_COMMAND_BUFFER", "16");
            std::env::set_var("BEAMCAST_BACK_BUFFER_SECONDS", "30");
        }

        let config = BeamcastConfig::from_env();

        assert_eq!(config.playlist.export_filename, "picks.m3u");
        assert_eq!(config.playback.adaptive_marker, "mpd");
        assert_eq!(config.playback.command_buffer, 16);
        assert_eq!(config.playback.back_buffer_seconds, 30);

        // Invalid values fall back to defaults.
        unsafe {
            std::env::remove_var("BEAMCAST_EXPORT_FILENAME");
            std::env::remove_var("BEAMCAST_BACK_BUFFER_SECONDS");
            std::env::set_var("BEAMCAST_COMMAND_BUFFER", "0");
            std::env::set_var("BEAMCAST_ADAPTIVE_MARKER", "");
        }

        let config = BeamcastConfig::from_env();

        assert_eq!(config.playback.command_buffer, 100);
        assert_eq!(config.playback.adaptive_marker, "m3u8");

        unsafe {
            std::env::remove_var("BEAMCAST_COMMAND_BUFFER");
            std::env::remove_var("BEAMCAST_ADAPTIVE_MARKER");
        }
    }
}

//! Playlist handling: M3U parsing, serialization, the in-memory channel
//! store, and persistence of saved channel lists.

pub mod parser;
pub mod persistence;
pub mod serializer;
pub mod store;
pub mod upload;

pub use parser::parse_playlist;
pub use persistence::{JsonFileListStore, ListStore, ListSummary, MemoryListStore, SavedChannelList};
pub use serializer::generate_playlist;
pub use store::{ChannelGroup, ChannelStore, DeleteOutcome};
pub use upload::PlaylistUpload;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single named media stream parsed out of a playlist.
///
/// `name` and `url` are always present on any record that escapes the
/// parser; incomplete entries are dropped before they are ever emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Stable identity for the record's lifetime, generated at parse time
    pub id: Uuid,
    /// Display name, taken from the metadata line after the final comma
    pub name: String,
    /// Absolute transport URL
    pub url: String,
    /// Group title, defaulting to the configured sentinel when absent
    pub group: String,
    /// Logo URL, absent rather than empty when not provided
    pub logo: Option<String>,
    /// Favorite flag, mutated only through the channel store
    pub is_favorite: bool,
}

impl ChannelRecord {
    /// Compares everything except the identifier.
    ///
    /// Parsing regenerates ids, so round-trip comparisons go through this
    /// rather than `PartialEq`.
    pub fn same_content(&self, other: &ChannelRecord) -> bool {
        self.name == other.name
            && self.url == other.url
            && self.group == other.group
            && self.logo == other.logo
            && self.is_favorite == other.is_favorite
    }
}

/// Ordered parse result: channels in source order plus the derived count.
#[derive(Debug, Clone, Default)]
pub struct ParsedPlaylist {
    pub channels: Vec<ChannelRecord>,
    pub total_channels: usize,
}

/// Errors that occur while acquiring or handling playlists.
///
/// Malformed playlist entries are not errors; the parser silently skips
/// them so a single bad record never invalidates the rest of the file.
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("unsupported playlist file extension: {filename}")]
    UnsupportedExtension { filename: String },
}

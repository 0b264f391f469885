//! Line-oriented M3U playlist parser.
//!
//! Scans metadata/URL line pairs into channel records. The parse never
//! fails: malformed or incomplete entries are skipped and logged, and the
//! rest of the file is processed normally.

use uuid::Uuid;

use super::{ChannelRecord, ParsedPlaylist};
use crate::config::PlaylistConfig;

const METADATA_PREFIX: &str = "#EXTINF:";
const URL_PREFIX: &str = "http";

/// Metadata accumulated for a record whose URL line has not arrived yet.
///
/// At most one is in flight at a time; a new metadata line discards any
/// still-incomplete predecessor.
struct PendingRecord {
    name: String,
    logo: Option<String>,
    group: String,
}

/// Parses M3U playlist text into an ordered sequence of channel records.
///
/// Each completed record receives a freshly generated id. Lines are trimmed
/// and empty lines dropped before scanning; comment lines other than
/// metadata lines (including the `#EXTM3U` marker) are ignored.
pub fn parse_playlist(content: &str, config: &PlaylistConfig) -> ParsedPlaylist {
    let mut channels = Vec::new();
    let mut pending: Option<PendingRecord> = None;

    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(metadata) = line.strip_prefix(METADATA_PREFIX) {
            if pending.is_some() {
                tracing::debug!("discarding metadata entry with no transport URL");
            }
            pending = Some(parse_metadata(metadata, config));
        } else if line.starts_with(URL_PREFIX) {
            // A URL line only completes a named pending record. One without
            // a name (or with no pending record at all) is ignored.
            match pending.take() {
                Some(record) if !record.name.is_empty() => {
                    channels.push(ChannelRecord {
                        id: Uuid::new_v4(),
                        name: record.name,
                        url: line.to_string(),
                        group: record.group,
                        logo: record.logo,
                        is_favorite: false,
                    });
                }
                Some(_) => tracing::debug!("discarding entry with empty display name"),
                None => tracing::debug!("ignoring transport URL with no preceding metadata"),
            }
        }
    }

    if pending.is_some() {
        tracing::debug!("discarding trailing metadata entry with no transport URL");
    }

    let total_channels = channels.len();
    tracing::info!(total_channels, "parsed playlist");

    ParsedPlaylist {
        channels,
        total_channels,
    }
}

/// Splits a metadata line (prefix already stripped) into attributes and the
/// display name.
///
/// The name is everything after the last comma. When no comma exists the
/// whole remainder is treated as the attribute segment and the name falls
/// back to the configured label; real-world playlists exhibit this
/// malformed shape.
fn parse_metadata(metadata: &str, config: &PlaylistConfig) -> PendingRecord {
    let (attributes, name) = match metadata.rfind(',') {
        Some(comma) => (&metadata[..comma], metadata[comma + 1..].trim().to_string()),
        None => (metadata, config.fallback_name.to_string()),
    };

    PendingRecord {
        name,
        logo: scan_attribute(attributes, "tvg-logo").map(str::to_string),
        group: scan_attribute(attributes, "group-title")
            .map_or_else(|| config.default_group.to_string(), str::to_string),
    }
}

/// Finds the first non-empty `key="value"` occurrence in an attribute
/// segment.
///
/// Key matching is case-sensitive and values with escaped quotes are out of
/// scope; the value runs to the next double quote.
fn scan_attribute<'a>(segment: &'a str, key: &str) -> Option<&'a str> {
    let mut search = segment;
    loop {
        let start = search.find(key)?;
        let rest = &search[start + key.len()..];
        if let Some(value) = rest.strip_prefix("=\"") {
            if let Some(end) = value.find('"') {
                if end > 0 {
                    return Some(&value[..end]);
                }
            }
        }
        search = &search[start + 1..];
    }
}

//! M3U playlist serializer.
//!
//! Produces the exact shape the parser reads back: marker line, then one
//! metadata line and one URL line per record with a blank separator line
//! after each pair. A generate/parse cycle yields an equivalent record
//! sequence modulo regenerated ids.

use super::ChannelRecord;

/// Serializes channel records into M3U playlist text.
///
/// The logo attribute is emitted only when present and the group attribute
/// only when non-empty; emission order is fixed as logo, group, then the
/// comma-delimited name taken verbatim.
pub fn generate_playlist(channels: &[ChannelRecord]) -> String {
    let mut content = String::from("#EXTM3U\n\n");

    for channel in channels {
        content.push_str("#EXTINF:-1");
        if let Some(logo) = &channel.logo {
            content.push_str(&format!(" tvg-logo=\"{logo}\""));
        }
        if !channel.group.is_empty() {
            content.push_str(&format!(" group-title=\"{}\"", channel.group));
        }
        content.push_str(&format!(",{}\n", channel.name));
        content.push_str(&format!("{}\n\n", channel.url));
    }

    content
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::config::PlaylistConfig;
    use crate::playlist::parse_playlist;

    fn record(name: &str, url: &str, group: &str, logo: Option<&str>) -> ChannelRecord {
        ChannelRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            url: url.to_string(),
            group: group.to_string(),
            logo: logo.map(str::to_string),
            is_favorite: false,
        }
    }

    #[test]
    fn test_emits_marker_and_pair_with_separator() {
        let channels = vec![record("CNN", "http://e.com/cnn.m3u8", "News", None)];
        let content = generate_playlist(&channels);

        assert_eq!(
            content,
            "#EXTM3U\n\n#EXTINF:-1 group-title=\"News\",CNN\nhttp://e.com/cnn.m3u8\n\n"
        );
    }

    #[test]
    fn test_logo_emitted_before_group() {
        let channels = vec![record("Ch", "http://e.com/s", "G", Some("l.png"))];
        let content = generate_playlist(&channels);

        assert!(content.contains("#EXTINF:-1 tvg-logo=\"l.png\" group-title=\"G\",Ch\n"));
    }

    #[test]
    fn test_empty_group_is_omitted() {
        let channels = vec![record("Ch", "http://e.com/s", "", None)];
        let content = generate_playlist(&channels);

        assert!(content.contains("#EXTINF:-1,Ch\n"));
    }

    #[test]
    fn test_empty_input_yields_marker_only() {
        assert_eq!(generate_playlist(&[]), "#EXTM3U\n\n");
    }

    #[test]
    fn test_round_trip_preserves_record_content() {
        let channels = vec![
            record("CNN", "http://e.com/cnn.m3u8", "News", Some("http://l/cnn.png")),
            record("Unknown Channel", "http://e.com/2", "Uncategorized", None),
            record("Late Films", "http://e.com/3", "Movies, Late Night", None),
        ];

        let reparsed = parse_playlist(&generate_playlist(&channels), &PlaylistConfig::default());

        assert_eq!(reparsed.total_channels, channels.len());
        for (original, round_tripped) in channels.iter().zip(&reparsed.channels) {
            assert!(
                original.same_content(round_tripped),
                "{original:?} != {round_tripped:?}"
            );
            assert_ne!(original.id, round_tripped.id);
        }
    }
}

//! Page payload interpretation.
//!
//! The web entry point only pulls raw strings out of the DOM; every decision
//! about what they mean, and what to fall back to, is made here.

use crate::config::PlayerConfig;
use crate::dot_matrix::{DotFont, DotMatrixArt};
use crate::playlist::Track;

/// Builds a track from one playlist entry's `data-*` attributes.
///
/// `data` looks up a dataset key (`id`, `src`, `title`, `artist`,
/// `artOriginalUrl`, `artDotMatrix`). Entries without `id` or `src` are
/// skipped. A missing title falls back to the id; malformed dotted art is
/// dropped.
pub fn track_from_dataset(index: u32, data: impl Fn(&str) -> Option<String>) -> Option<Track> {
    let (Some(id), Some(source_url)) = (data("id"), data("src")) else {
        log::warn!("Skipping playlist entry {index} without id or src");
        return None;
    };
    let art_dot_matrix = data("artDotMatrix").and_then(|raw| {
        DotMatrixArt::from_json(&raw)
            .inspect_err(|err| log::warn!("Track {id}: {err}"))
            .ok()
    });

    Some(Track {
        title: data("title").unwrap_or_else(|| id.clone()),
        artist: data("artist").unwrap_or_default(),
        art_original_url: data("artOriginalUrl").filter(|url| !url.is_empty()),
        art_dot_matrix,
        id,
        source_url,
    })
}

/// `#player-config` contents, or the defaults when absent or malformed.
pub fn config_or_default(raw: Option<&str>) -> PlayerConfig {
    let Some(raw) = raw else {
        return PlayerConfig::default();
    };
    PlayerConfig::from_json(raw).unwrap_or_else(|err| {
        log::warn!("Ignoring player config: {err}");
        PlayerConfig::default()
    })
}

/// `#dot-font-data` contents, or the builtin font when absent or malformed.
pub fn font_or_builtin(raw: Option<&str>) -> DotFont {
    let Some(raw) = raw else {
        log::debug!("No dot font on the page, using the builtin one");
        return DotFont::builtin();
    };
    DotFont::from_json(raw).unwrap_or_else(|err| {
        log::warn!("Falling back to the builtin dot font: {err}");
        DotFont::builtin()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn dataset(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn full_entry_maps_every_attribute() {
        let track = track_from_dataset(
            0,
            dataset(&[
                ("id", "12"),
                ("src", "/static/music/a.mp3"),
                ("title", "Atmosphere"),
                ("artist", "Joy Division"),
                ("artOriginalUrl", "/static/covers/a.jpg"),
                ("artDotMatrix", r#"{"matrix": [0.2, 0.8], "cols": 2}"#),
            ]),
        )
        .unwrap();
        assert_eq!(track.id, "12");
        assert_eq!(track.source_url, "/static/music/a.mp3");
        assert_eq!(track.title, "Atmosphere");
        assert_eq!(track.artist, "Joy Division");
        assert_eq!(track.art_original_url.as_deref(), Some("/static/covers/a.jpg"));
        assert_eq!(track.art_dot_matrix.map(|art| art.cols), Some(2));
    }

    #[test]
    fn entry_without_id_or_src_is_skipped() {
        assert!(track_from_dataset(0, dataset(&[("src", "/a.mp3")])).is_none());
        assert!(track_from_dataset(1, dataset(&[("id", "1")])).is_none());
    }

    #[test]
    fn optional_attributes_fall_back() {
        let track = track_from_dataset(
            3,
            dataset(&[("id", "7"), ("src", "/b.mp3"), ("artOriginalUrl", "")]),
        )
        .unwrap();
        assert_eq!(track.title, "7");
        assert_eq!(track.artist, "");
        assert_eq!(track.art_original_url, None);
        assert_eq!(track.art_dot_matrix, None);
    }

    #[test]
    fn malformed_dot_matrix_is_dropped() {
        let track = track_from_dataset(
            0,
            dataset(&[("id", "7"), ("src", "/b.mp3"), ("artDotMatrix", "{matrix: oops")]),
        )
        .unwrap();
        assert_eq!(track.art_dot_matrix, None);
        assert_eq!(track.id, "7");
    }

    #[test]
    fn config_falls_back_to_defaults() {
        assert_eq!(config_or_default(None), PlayerConfig::default());
        assert_eq!(config_or_default(Some("{broken")), PlayerConfig::default());
        assert_eq!(config_or_default(Some(r#"{"initial_volume": 30}"#)).initial_volume, 30);
    }

    #[test]
    fn font_falls_back_to_builtin() {
        let builtin = DotFont::builtin();
        assert_eq!(font_or_builtin(None).rows(), builtin.rows());
        assert_eq!(font_or_builtin(Some("[1, 2]")).glyph('8'), builtin.glyph('8'));
        assert_eq!(font_or_builtin(Some(r#"{"10": ["1"]}"#)).glyph('8'), builtin.glyph('8'));

        let page_font = font_or_builtin(Some(r#"{"1": ["1", "1", "1"]}"#));
        assert_eq!(page_font.rows(), 3);
    }
}

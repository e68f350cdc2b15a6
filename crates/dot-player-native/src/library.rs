use std::fs;
use std::path::{Path, PathBuf};

use dot_player::dot_matrix::{DotFont, DotMatrixArt};
use dot_player::playlist::Track;
use dot_player::PlayerError;
use serde::Deserialize;

/// Playlist file for the desktop player:
///
/// ```json
/// { "tracks": [{ "id": "1", "src": "music/a.mp3", "title": "A", "art_original_url": "covers/a.jpg" }],
///   "dot_font": { ... } }
/// ```
///
/// Relative `src` and cover paths are resolved against the file's directory.
/// Tracks with a local cover but no `art_dot_matrix` get one sampled from the
/// cover.
#[derive(Debug, Default)]
pub struct Library {
    pub tracks: Vec<Track>,
    pub dot_font: Option<DotFont>,
}

#[derive(Deserialize)]
struct RawLibrary {
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    dot_font: Option<serde_json::Value>,
}

impl Library {
    /// # Errors
    ///
    /// [`PlayerError::Io`] if the file cannot be read, otherwise see [`Library::parse`].
    pub fn load(path: &Path, art_spacing: u32) -> Result<Self, PlayerError> {
        let raw = fs::read_to_string(path).map_err(|source| PlayerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&raw, base, art_spacing)
    }

    /// # Errors
    ///
    /// [`PlayerError::Format`] for malformed JSON and the dot font errors of
    /// [`DotFont::from_json`]. Covers that fail to decode are logged and skipped.
    pub fn parse(raw: &str, base: &Path, art_spacing: u32) -> Result<Self, PlayerError> {
        let parsed: RawLibrary =
            serde_json::from_str(raw).map_err(|source| PlayerError::Format { what: "library", source })?;

        let dot_font = parsed
            .dot_font
            .map(|font| DotFont::from_json(&font.to_string()))
            .transpose()?;
        let tracks = parsed
            .tracks
            .into_iter()
            .map(|track| resolve_track(track, base, art_spacing))
            .collect();

        Ok(Self { tracks, dot_font })
    }
}

fn resolve_track(mut track: Track, base: &Path, art_spacing: u32) -> Track {
    track.source_url = resolve(base, &track.source_url).to_string_lossy().into_owned();

    let Some(cover) = track.art_original_url.take() else {
        return track;
    };
    if cover.contains("://") {
        track.art_original_url = Some(cover);
        return track;
    }

    let path = resolve(base, &cover);
    if track.art_dot_matrix.is_none() {
        track.art_dot_matrix = DotMatrixArt::from_image_path(&path, art_spacing)
            .inspect_err(|err| log::warn!("No dotted art for '{}': {err}", track.title))
            .ok();
    }
    // The egui file loader expects a URI
    track.art_original_url = Some(format!("file://{}", path.display()));
    track
}

fn resolve(base: &Path, src: &str) -> PathBuf {
    let path = PathBuf::from(src);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

use rand::Rng;
use serde::{Deserialize, Deserializer};

use crate::dot_matrix::DotMatrixArt;

/// Track descriptor as provided by the page (or the native library file).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(alias = "src")]
    pub source_url: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub art_original_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_art")]
    pub art_dot_matrix: Option<DotMatrixArt>,
}

/// Malformed art is dropped rather than failing the whole track.
fn lenient_art<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DotMatrixArt>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value)
        .inspect_err(|err| log::warn!("Ignoring malformed dot-matrix art: {err}"))
        .ok())
}

/// Result of removing an entry from the playlist.
#[derive(Clone, Debug, PartialEq)]
pub struct Removed {
    pub track: Track,
    pub was_active: bool,
}

/// Ordered tracks plus the cursor of the active one.
///
/// The cursor is always a valid index while the list is non-empty.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current_index: usize,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            current_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.tracks.is_empty()).then_some(self.current_index)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    /// Moves the cursor. Out-of-range indices are ignored.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Index that follows the cursor.
    ///
    /// In shuffle mode a uniformly random index different from the cursor is
    /// drawn, unless the list has a single entry.
    pub fn next_index(&self, shuffle: bool, rng: &mut impl Rng) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        if !shuffle {
            return Some((self.current_index + 1) % len);
        }
        if len == 1 {
            return Some(self.current_index);
        }
        loop {
            let candidate = rng.random_range(0..len);
            if candidate != self.current_index {
                return Some(candidate);
            }
        }
    }

    /// Index that precedes the cursor. Shuffle mode stays on the current track.
    pub fn prev_index(&self, shuffle: bool) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        if shuffle {
            Some(self.current_index)
        } else {
            Some((self.current_index + len - 1) % len)
        }
    }

    /// Removes the entry at `index`, keeping the cursor on the same track when
    /// a preceding entry goes and wrapping it when the active entry goes.
    pub fn remove(&mut self, index: usize) -> Option<Removed> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        let was_active = index == self.current_index;

        if self.tracks.is_empty() {
            self.current_index = 0;
        } else if was_active {
            self.current_index %= self.tracks.len();
        } else if index < self.current_index {
            self.current_index -= 1;
        }

        Some(Removed { track, was_active })
    }

    /// `MM:SS`, minutes are not wrapped at the hour.
    pub fn format_time(seconds: f64) -> String {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        let mins = (seconds / 60.0) as u32;
        let secs = (seconds % 60.0) as u32;
        format!("{mins:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn playlist(n: usize) -> Playlist {
        Playlist::new(
            (0..n)
                .map(|i| Track {
                    id: format!("song-{i}"),
                    source_url: format!("/media/{i}.mp3"),
                    title: format!("Track {i}"),
                    ..Track::default()
                })
                .collect(),
        )
    }

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(Playlist::format_time(125.0), "02:05");
        assert_eq!(Playlist::format_time(59.0), "00:59");
        assert_eq!(Playlist::format_time(59.99), "00:59");
        assert_eq!(Playlist::format_time(0.0), "00:00");
        assert_eq!(Playlist::format_time(f64::NAN), "00:00");
        assert_eq!(Playlist::format_time(6000.0), "100:00");
    }

    #[test]
    fn next_cycles_back_after_n_steps() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in 1..6 {
            for start in 0..n {
                let mut list = playlist(n);
                list.set_current(start);
                for _ in 0..n {
                    let next = list.next_index(false, &mut rng).unwrap();
                    list.set_current(next);
                }
                assert_eq!(list.current_index(), Some(start));
            }
        }
    }

    #[test]
    fn prev_wraps_to_last() {
        let list = playlist(4);
        assert_eq!(list.prev_index(false), Some(3));
    }

    #[test]
    fn shuffle_next_never_repeats() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut list = playlist(3);
        for _ in 0..200 {
            let before = list.current_index().unwrap();
            let next = list.next_index(true, &mut rng).unwrap();
            assert_ne!(next, before);
            assert!(next < 3);
            list.set_current(next);
        }
    }

    #[test]
    fn shuffle_with_single_track_stays() {
        let mut rng = StdRng::seed_from_u64(7);
        let list = playlist(1);
        assert_eq!(list.next_index(true, &mut rng), Some(0));
        assert_eq!(list.prev_index(true), Some(0));
    }

    #[test]
    fn shuffle_prev_keeps_index() {
        let mut list = playlist(5);
        list.set_current(2);
        assert_eq!(list.prev_index(true), Some(2));
    }

    #[test]
    fn empty_playlist_has_no_cursor() {
        let mut rng = StdRng::seed_from_u64(7);
        let list = playlist(0);
        assert_eq!(list.current_index(), None);
        assert_eq!(list.next_index(false, &mut rng), None);
        assert_eq!(list.prev_index(false), None);
    }

    #[test]
    fn set_current_rejects_out_of_range() {
        let mut list = playlist(2);
        assert!(!list.set_current(2));
        assert_eq!(list.current_index(), Some(0));
    }

    #[test]
    fn removing_active_wraps_cursor() {
        let mut list = playlist(3);
        list.set_current(2);
        let removed = list.remove(2).unwrap();
        assert!(removed.was_active);
        assert_eq!(removed.track.id, "song-2");
        assert_eq!(list.current_index(), Some(0));
    }

    #[test]
    fn removing_before_active_keeps_same_track() {
        let mut list = playlist(4);
        list.set_current(2);
        let removed = list.remove(0).unwrap();
        assert!(!removed.was_active);
        assert_eq!(list.current_index(), Some(1));
        assert_eq!(list.current_track().unwrap().id, "song-2");
    }

    #[test]
    fn removing_after_active_leaves_cursor() {
        let mut list = playlist(4);
        list.set_current(1);
        list.remove(3).unwrap();
        assert_eq!(list.current_track().unwrap().id, "song-1");
    }

    #[test]
    fn removing_last_entry_empties() {
        let mut list = playlist(1);
        assert!(list.remove(0).unwrap().was_active);
        assert!(list.is_empty());
        assert_eq!(list.current_index(), None);
        assert!(list.remove(0).is_none());
    }

    #[test]
    fn track_accepts_src_alias() {
        let track: Track =
            serde_json::from_str(r#"{"id": "9", "src": "/a.mp3", "title": "A"}"#).unwrap();
        assert_eq!(track.source_url, "/a.mp3");
        assert!(track.art_dot_matrix.is_none());
    }

    #[test]
    fn malformed_art_is_dropped() {
        let track: Track = serde_json::from_str(
            r#"{"id": "9", "src": "/a.mp3", "title": "A", "art_dot_matrix": {"matrix": "oops"}}"#,
        )
        .unwrap();
        assert!(track.art_dot_matrix.is_none());

        let track: Track = serde_json::from_str(
            r#"{"id": "9", "src": "/a.mp3", "title": "A", "art_dot_matrix": {"matrix": [0.5], "cols": 1}}"#,
        )
        .unwrap();
        assert_eq!(track.art_dot_matrix.map(|art| art.cols), Some(1));
    }
}

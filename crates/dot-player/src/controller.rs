use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::PlayerConfig;
use crate::media::MediaElement;
use crate::playlist::{Playlist, Track};
use crate::store::{DeleteOutcome, SongStore};
use crate::waveform::Waveform;

/// Owns the playlist cursor and forwards transport commands to the media
/// element; everything the widget displays is derived here.
///
/// With an empty playlist every transport action is a no-op.
pub struct PlaybackController<M: MediaElement, S: SongStore> {
    media: M,
    store: S,
    playlist: Playlist,

    is_playing: bool,
    is_shuffle: bool,
    dotted_art_visible: bool,
    volume: u8,
    bass: u8,

    // Derived display state
    elapsed_label: String,
    progress: f32,
    waveform: Waveform,
    metadata_ready: bool,

    pending_deletes: HashSet<String>,
    notice: Option<String>,

    waveform_bars: usize,
    waveform_heights: (f32, f32),
    rng: StdRng,
}

impl<M: MediaElement, S: SongStore> PlaybackController<M, S> {
    pub fn new(media: M, store: S, tracks: Vec<Track>, config: &PlayerConfig) -> Self {
        Self::with_rng(media, store, tracks, config, StdRng::from_os_rng())
    }

    /// Like [`PlaybackController::new`] with a caller-provided random source.
    pub fn with_rng(media: M, store: S, tracks: Vec<Track>, config: &PlayerConfig, rng: StdRng) -> Self {
        let mut controller = Self {
            media,
            store,
            playlist: Playlist::new(tracks),
            is_playing: false,
            is_shuffle: false,
            dotted_art_visible: true,
            volume: config.initial_volume.min(100),
            bass: config.initial_bass.min(100),
            elapsed_label: Playlist::format_time(0.0),
            progress: 0.0,
            waveform: Waveform::default(),
            metadata_ready: false,
            pending_deletes: HashSet::new(),
            notice: None,
            waveform_bars: config.waveform_bars,
            waveform_heights: (config.waveform_min_height, config.waveform_max_height),
            rng,
        };

        controller.media.set_volume(f64::from(controller.volume) / 100.0);
        controller.regenerate_waveform();
        if !controller.playlist.is_empty() {
            controller.load_track(0);
        }
        controller
    }

    // ===== Accessors =====

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_shuffle(&self) -> bool {
        self.is_shuffle
    }

    pub fn is_dotted_art_visible(&self) -> bool {
        self.dotted_art_visible
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn bass(&self) -> u8 {
        self.bass
    }

    /// Label of the play/pause button for the current state.
    pub fn play_label(&self) -> &'static str {
        if self.is_playing {
            "PAUSE"
        } else {
            "PLAY"
        }
    }

    pub fn elapsed_label(&self) -> &str {
        &self.elapsed_label
    }

    /// Elapsed fraction of the loaded track, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn is_delete_pending(&self, song_id: &str) -> bool {
        self.pending_deletes.contains(song_id)
    }

    /// Message for the user after a failed delete.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    #[cfg(test)]
    pub(crate) fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ===== Transport =====

    /// Points the media element at the track and resets the display.
    /// Out-of-range indices are ignored.
    pub fn load_track(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index) else {
            return;
        };
        log::debug!("Loading track {index}: {} - {}", track.artist, track.title);
        self.media.set_source(&track.source_url);
        self.playlist.set_current(index);

        self.is_playing = false;
        self.metadata_ready = false;
        self.progress = 0.0;
        self.elapsed_label = Playlist::format_time(0.0);
    }

    pub fn play_pause(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        if self.media.is_paused() {
            self.media.play();
            self.is_playing = true;
        } else {
            self.media.pause();
            self.is_playing = false;
        }
    }

    pub fn next(&mut self) {
        if let Some(index) = self.playlist.next_index(self.is_shuffle, &mut self.rng) {
            self.load_and_play(index);
        }
    }

    /// Previous track; in shuffle mode the current track restarts instead.
    pub fn prev(&mut self) {
        if let Some(index) = self.playlist.prev_index(self.is_shuffle) {
            self.load_and_play(index);
        }
    }

    /// Playlist entry clicked.
    pub fn select_track(&mut self, index: usize) {
        if index < self.playlist.len() {
            self.load_and_play(index);
        }
    }

    fn load_and_play(&mut self, index: usize) {
        self.load_track(index);
        self.media.play();
        self.is_playing = true;
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffle = !self.is_shuffle;
        log::debug!("Shuffle {}", if self.is_shuffle { "on" } else { "off" });
    }

    pub fn toggle_album_art(&mut self) {
        self.dotted_art_visible = !self.dotted_art_visible;
    }

    /// Seeks to the fraction of the track under the pointer. No-op until the
    /// duration is known.
    pub fn seek(&mut self, offset_x: f32, container_width: f32) {
        if self.playlist.is_empty() || container_width <= 0.0 {
            return;
        }
        let Some(duration) = self.media.duration() else {
            return;
        };
        let ratio = f64::from((offset_x / container_width).clamp(0.0, 1.0));
        self.media.set_current_time(ratio * duration);
        self.on_time_update();
    }

    pub fn set_volume(&mut self, value: u8) {
        self.volume = value.min(100);
        self.media.set_volume(f64::from(self.volume) / 100.0);
    }

    /// Stored for the knob only; there is no bass filter behind it yet.
    pub fn set_bass(&mut self, value: u8) {
        self.bass = value.min(100);
        log::debug!("Bass set to {} (no audible effect)", self.bass);
    }

    // ===== Media notifications =====

    /// Recomputes progress and the timer from the media position.
    pub fn on_time_update(&mut self) {
        let Some(duration) = self.media.duration() else {
            return;
        };
        let elapsed = self.media.current_time();
        self.progress = (elapsed / duration).clamp(0.0, 1.0) as f32;
        self.elapsed_label = Playlist::format_time(elapsed);
    }

    pub fn on_ended(&mut self) {
        self.next();
    }

    /// Periodic update, called once per frame.
    pub fn tick(&mut self) {
        for outcome in self.store.drain_finished() {
            self.finish_delete(outcome);
        }
        if self.playlist.is_empty() {
            return;
        }

        self.is_playing = !self.media.is_paused();
        if !self.metadata_ready && self.media.duration().is_some() {
            self.metadata_ready = true;
            self.regenerate_waveform();
        }
        self.on_time_update();

        if self.media.has_ended() {
            self.on_ended();
        }
    }

    fn regenerate_waveform(&mut self) {
        let (min, max) = self.waveform_heights;
        self.waveform = Waveform::generate(self.waveform_bars, min, max, &mut self.rng);
    }

    // ===== Deletion =====

    /// Asks the store to delete a song. The playlist changes only once the
    /// store confirms. Returns `false` for unknown ids and duplicate requests.
    pub fn delete_track(&mut self, song_id: &str) -> bool {
        if self.playlist.position_of(song_id).is_none() || self.pending_deletes.contains(song_id) {
            return false;
        }
        log::info!("Requesting delete of song {song_id}");
        self.pending_deletes.insert(song_id.to_string());
        self.store.delete_song(song_id);
        true
    }

    fn finish_delete(&mut self, outcome: DeleteOutcome) {
        self.pending_deletes.remove(&outcome.song_id);
        match outcome.result {
            Ok(()) => self.remove_track(&outcome.song_id),
            Err(err) => {
                log::warn!("Delete of song {} failed: {err}", outcome.song_id);
                self.notice = Some(format!("Could not delete song: {err}"));
            }
        }
    }

    fn remove_track(&mut self, song_id: &str) {
        let Some(index) = self.playlist.position_of(song_id) else {
            log::debug!("Song {song_id} already gone from the playlist");
            return;
        };
        let Some(removed) = self.playlist.remove(index) else {
            return;
        };
        log::info!("Removed '{}' from the playlist", removed.track.title);

        if self.playlist.is_empty() {
            self.media.pause();
            self.is_playing = false;
            self.progress = 0.0;
            self.elapsed_label = Playlist::format_time(0.0);
            return;
        }
        if removed.was_active {
            if let Some(current) = self.playlist.current_index() {
                self.load_track(current);
            }
        }
    }
}

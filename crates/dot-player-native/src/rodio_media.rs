use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use dot_player::media::MediaElement;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

/// Wall-clock playback position: the offset where the sink last started plus
/// the time it has been running since.
#[derive(Debug, Default, Clone, Copy)]
struct PlayClock {
    offset: f64,
    started_at: Option<Instant>,
}

impl PlayClock {
    fn at(offset: f64) -> Self {
        Self {
            offset,
            started_at: None,
        }
    }

    fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    fn stop(&mut self, now: Instant) {
        if let Some(start) = self.started_at.take() {
            self.offset += now.duration_since(start).as_secs_f64();
        }
    }

    fn position(&self, now: Instant) -> f64 {
        self.offset + self.started_at.map_or(0.0, |start| now.duration_since(start).as_secs_f64())
    }
}

/// Plays local files through the default output device.
pub struct RodioMedia {
    // The stream must outlive every sink created from its handle
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    path: Option<String>,
    duration: Option<f64>,
    volume: f32,
    clock: PlayClock,
    paused: bool,
}

impl RodioMedia {
    pub fn new() -> Self {
        let (stream, handle) = match OutputStream::try_default() {
            Ok((stream, handle)) => (Some(stream), Some(handle)),
            Err(err) => {
                log::error!("No audio output device, playback disabled: {err}");
                (None, None)
            }
        };
        Self {
            _stream: stream,
            handle,
            sink: None,
            path: None,
            duration: None,
            volume: 1.0,
            clock: PlayClock::default(),
            paused: true,
        }
    }

    /// Replaces the sink with a paused one positioned at `offset` seconds.
    fn load_sink(&mut self, offset: f64) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        let (Some(handle), Some(path)) = (&self.handle, &self.path) else {
            return;
        };

        let decoder = match File::open(path).map(BufReader::new) {
            Ok(reader) => match Decoder::new(reader) {
                Ok(decoder) => decoder,
                Err(err) => {
                    log::warn!("Cannot decode '{path}': {err}");
                    return;
                }
            },
            Err(err) => {
                log::warn!("Cannot open '{path}': {err}");
                return;
            }
        };
        if let Some(total) = decoder.total_duration() {
            self.duration = Some(total.as_secs_f64());
        }

        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.pause();
                sink.set_volume(self.volume);
                sink.append(decoder.skip_duration(Duration::from_secs_f64(offset.max(0.0))));
                self.sink = Some(sink);
                self.clock = PlayClock::at(offset);
            }
            Err(err) => log::error!("Failed to create audio sink: {err}"),
        }
    }
}

impl Default for RodioMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for RodioMedia {
    fn set_source(&mut self, url: &str) {
        self.path = Some(url.to_string());
        self.duration = None;
        self.paused = true;
        self.load_sink(0.0);
    }

    fn play(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        sink.play();
        self.clock.start(Instant::now());
        self.paused = false;
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.clock.stop(Instant::now());
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        let position = self.clock.position(Instant::now());
        self.duration.map_or(position, |total| position.min(total))
    }

    /// Rebuilds the sink from the start of the file and skips ahead.
    fn set_current_time(&mut self, seconds: f64) {
        let was_playing = !self.paused;
        self.load_sink(seconds);
        if was_playing {
            self.play();
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_volume(&mut self, fraction: f64) {
        self.volume = fraction.clamp(0.0, 1.0) as f32;
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn has_ended(&self) -> bool {
        !self.paused && self.sink.as_ref().is_some_and(Sink::empty)
    }
}

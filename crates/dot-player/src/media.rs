/// The playback primitive the controller drives.
///
/// On the web this is the page's `<audio>` element, on the desktop a rodio
/// sink. All timing, decoding and buffering happens behind this trait; the
/// controller only reads its state and forwards transport commands.
pub trait MediaElement {
    /// Replaces the source. Playback stops and the position resets.
    fn set_source(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Elapsed seconds.
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Length in seconds, `None` until metadata is available.
    fn duration(&self) -> Option<f64>;
    /// Volume as a fraction in `[0, 1]`.
    fn set_volume(&mut self, fraction: f64);
    fn has_ended(&self) -> bool;
}

/// Normalises a raw duration reading: NaN, infinite and zero mean "unknown".
pub fn known_duration(raw: f64) -> Option<f64> {
    (raw.is_finite() && raw > 0.0).then_some(raw)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_durations_are_filtered() {
        assert_eq!(known_duration(f64::NAN), None);
        assert_eq!(known_duration(f64::INFINITY), None);
        assert_eq!(known_duration(0.0), None);
        assert_eq!(known_duration(183.5), Some(183.5));
    }
}

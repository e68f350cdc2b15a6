use serde::Deserialize;

use crate::error::PlayerError;

/// Player configuration
///
/// Every field has a default, so a page or config file only needs to name
/// the values it changes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    // Initial knob values (0-100)
    pub initial_volume: u8,
    pub initial_bass: u8,

    // Fake waveform
    pub waveform_bars: usize,
    pub waveform_min_height: f32,
    pub waveform_max_height: f32,

    // Jog wheels
    pub ring_dots: usize,
    pub knob_radius: f32,

    // Pixel step when sampling a cover into dots
    pub art_dot_spacing: u32,

    // Song store
    pub delete_endpoint: String,
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 80,
            initial_bass: 50,

            waveform_bars: 70,
            waveform_min_height: 0.15,
            waveform_max_height: 0.75,

            ring_dots: 28,
            knob_radius: 34.0,

            art_dot_spacing: 10,

            delete_endpoint: "/delete_song".to_string(),
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl PlayerConfig {
    /// # Errors
    ///
    /// Returns [`PlayerError::Format`] if `raw` is malformed or a field has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, PlayerError> {
        let mut config: Self = serde_json::from_str(raw).map_err(|source| PlayerError::Format {
            what: "player config",
            source,
        })?;
        config.initial_volume = config.initial_volume.min(100);
        config.initial_bass = config.initial_bass.min(100);
        if config.waveform_min_height > config.waveform_max_height {
            std::mem::swap(&mut config.waveform_min_height, &mut config.waveform_max_height);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = PlayerConfig::from_json("{}").unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.initial_volume, 80);
        assert_eq!(config.initial_bass, 50);
        assert_eq!(config.waveform_bars, 70);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PlayerConfig::from_json(r#"{"initial_volume": 150, "ring_dots": 12}"#).unwrap();
        assert_eq!(config.initial_volume, 100);
        assert_eq!(config.ring_dots, 12);
        assert_eq!(config.delete_endpoint, "/delete_song");
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        let err = PlayerConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, PlayerError::Format { what: "player config", .. }));
    }
}

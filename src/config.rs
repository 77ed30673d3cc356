// Studio configuration - RON file with defaults for every field

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::engine::AudioConfig;
use crate::sequencer::pitch::Octave;
use crate::sequencer::player::ToneShape;
use crate::sequencer::recorder::RepressPolicy;
use crate::sequencer::timeline::DEFAULT_PIXELS_PER_SECOND;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Timeline zoom
    pub pixels_per_second: f64,
    /// Octave of the keyboard at startup (0 - 8)
    pub default_octave: u8,
    /// Playback volume when none is given (0.0 - 1.0)
    pub master_volume: f32,
    pub tone: ToneShape,
    /// Sound a short tone on every key press
    pub preview_enabled: bool,
    /// Seconds
    pub preview_duration: f64,
    pub repress_policy: RepressPolicy,
    pub audio: AudioConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            default_octave: Octave::default().value(),
            master_volume: 0.5,
            tone: ToneShape::default(),
            preview_enabled: true,
            preview_duration: 0.5,
            repress_policy: RepressPolicy::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Reads and validates a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixels_per_second.is_finite() && self.pixels_per_second > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pixels_per_second must be > 0, got {}",
                self.pixels_per_second
            )));
        }
        if self.default_octave > Octave::MAX {
            return Err(ConfigError::Invalid(format!(
                "default_octave must be 0 - {}, got {}",
                Octave::MAX,
                self.default_octave
            )));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::Invalid(format!(
                "master_volume must be 0.0 - 1.0, got {}",
                self.master_volume
            )));
        }
        if !(0.0..=1.0).contains(&self.tone.peak_gain) {
            return Err(ConfigError::Invalid(format!(
                "tone.peak_gain must be 0.0 - 1.0, got {}",
                self.tone.peak_gain
            )));
        }
        if !(self.tone.attack.is_finite() && self.tone.attack >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tone.attack must be >= 0, got {}",
                self.tone.attack
            )));
        }
        if !(self.preview_duration.is_finite() && self.preview_duration > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "preview_duration must be > 0, got {}",
                self.preview_duration
            )));
        }
        if self.audio.command_capacity == 0 {
            return Err(ConfigError::Invalid(
                "audio.command_capacity must be > 0".to_string(),
            ));
        }
        if self.audio.max_voices == 0 {
            return Err(ConfigError::Invalid(
                "audio.max_voices must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn octave(&self) -> Octave {
        Octave::new(self.default_octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.pixels_per_second, 100.0);
        assert_eq!(config.octave(), Octave::new(4));
        assert!(config.preview_enabled);
        assert_eq!(config.repress_policy, RepressPolicy::Ignore);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config =
            StudioConfig::from_ron_str("(master_volume: 0.8, repress_policy: Restart)").unwrap();
        assert_eq!(config.master_volume, 0.8);
        assert_eq!(config.repress_policy, RepressPolicy::Restart);
        assert_eq!(config.preview_duration, 0.5);
        assert_eq!(config.tone, ToneShape::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("studio.ron");

        let mut config = StudioConfig::default();
        config.default_octave = 5;
        config.tone.peak_gain = 0.2;
        config.save(&path).unwrap();

        let loaded = StudioConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            StudioConfig::from_ron_str("(pixels_per_second: 0.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_ron_str("(default_octave: 9)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_ron_str("(master_volume: 1.5)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_ron_str("(tone: (attack: -0.1))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_ron_str("(audio: (max_voices: 0))"),
            Err(ConfigError::Invalid(_))
        ));
        let config = StudioConfig::from_ron_str("(audio: (max_voices: 8))").unwrap();
        assert_eq!(config.audio.max_voices, 8);
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(
            StudioConfig::from_ron_str("(master_volume: "),
            Err(ConfigError::Parse(_))
        ));

        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            StudioConfig::load(temp_dir.path().join("missing.ron")),
            Err(ConfigError::Io(_))
        ));
    }
}

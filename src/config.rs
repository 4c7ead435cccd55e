// Configuration management for Recital

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::conversion::{BasicPitchCommand, FfmpegCommand, InferenceOptions};
use crate::similarity::SegmentationSettings;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Whether reports are printed as indented JSON
    #[serde(default = "default_true")]
    pub pretty_json: bool,

    /// Segment window used when diffing performances
    #[serde(default)]
    pub segmentation: SegmentationSettings,

    /// Output switches and destination for audio-to-MIDI conversion
    #[serde(default)]
    pub inference: InferenceOptions,

    /// Pitch inference executable
    #[serde(default)]
    pub basic_pitch: BasicPitchCommand,

    /// Video-to-audio executable
    #[serde(default)]
    pub ffmpeg: FfmpegCommand,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pretty_json: true,
            segmentation: SegmentationSettings::default(),
            inference: InferenceOptions::default(),
            basic_pitch: BasicPitchCommand::default(),
            ffmpeg: FfmpegCommand::default(),
        }
    }
}

impl Config {
    /// Load config from disk or return default
    pub fn load_or_default(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => {
                        log::warn!("Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read config file: {}", e);
                }
            }
        }

        Self::default()
    }

    /// Save config to disk
    pub fn save(&self, config_path: &Path) -> anyhow::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;

        Ok(())
    }
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recital")
        .join("config.toml")
}

/// Default true value (for serde)
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.segmentation.window_secs, 10);
        assert!(config.inference.save_midi);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "pretty_json = false\n[segmentation]\nwindow_secs = 5\n[inference]\nsave_notes = true\n",
        )
        .unwrap();

        let config = Config::load_or_default(&path);
        assert!(!config.pretty_json);
        assert_eq!(config.segmentation.window_secs, 5);
        assert_eq!(config.segmentation.ticks_per_beat, 480);
        assert!(config.inference.save_notes);
        assert!(config.inference.save_midi);
        assert_eq!(config.basic_pitch, BasicPitchCommand::default());
    }

    #[test]
    fn unparsable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "segmentation = [[[").unwrap();
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.segmentation.window_secs = 4;
        config.inference.output_dir = PathBuf::from("/tmp/midi");

        config.save(&path).unwrap();
        assert_eq!(Config::load_or_default(&path), config);
    }
}

// Conversion services backed by external command-line tools

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use super::{ConversionError, InferenceOptions, MediaExtraction, PitchInference};

/// Runs the `basic-pitch` CLI: `basic-pitch <output-dir> <audio>...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicPitchCommand {
    #[serde(default = "default_basic_pitch")]
    pub program: PathBuf,
}

impl Default for BasicPitchCommand {
    fn default() -> Self {
        Self {
            program: default_basic_pitch(),
        }
    }
}

fn default_basic_pitch() -> PathBuf {
    PathBuf::from("basic-pitch")
}

impl BasicPitchCommand {
    fn build(&self, audio_paths: &[PathBuf], output_dir: &Path, options: &InferenceOptions) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(output_dir);
        cmd.args(audio_paths);
        if options.sonify {
            cmd.arg("--sonify-midi");
        }
        if options.save_model_outputs {
            cmd.arg("--save-model-outputs");
        }
        if options.save_notes {
            cmd.arg("--save-note-events");
        }
        cmd
    }
}

impl PitchInference for BasicPitchCommand {
    fn predict_and_save(
        &self,
        audio_paths: &[PathBuf],
        output_dir: &Path,
        options: &InferenceOptions,
    ) -> Result<(), ConversionError> {
        if !options.save_midi {
            // The CLI always writes MIDI
            log::warn!("save_midi is off, but basic-pitch writes MIDI regardless");
        }
        let mut cmd = self.build(audio_paths, output_dir, options);
        log::debug!("Running {:?}", cmd);
        run(&mut cmd)
    }
}

/// Runs `ffmpeg` to write the video's audio track next to it as MP3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfmpegCommand {
    #[serde(default = "default_ffmpeg")]
    pub program: PathBuf,
}

impl Default for FfmpegCommand {
    fn default() -> Self {
        Self {
            program: default_ffmpeg(),
        }
    }
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl FfmpegCommand {
    /// Audio lands beside the video as `<stem>_audio.mp3`, so it never
    /// names the input itself, even when the input is already an mp3.
    pub fn audio_path_for(video_path: &Path) -> PathBuf {
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_else(|| "audio".into());
        video_path.with_file_name(format!("{}_audio.mp3", stem))
    }

    fn build(&self, video_path: &Path, audio_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-loglevel", "error", "-i"])
            .arg(video_path)
            .args(["-vn", "-acodec", "libmp3lame"])
            .arg(audio_path);
        cmd
    }
}

impl MediaExtraction for FfmpegCommand {
    fn convert_to_audio(&self, video_path: &Path) -> Result<PathBuf, ConversionError> {
        let audio_path = Self::audio_path_for(video_path);
        let mut cmd = self.build(video_path, &audio_path);
        log::debug!("Running {:?}", cmd);
        run(&mut cmd)?;
        Ok(audio_path)
    }
}

fn run(cmd: &mut Command) -> Result<(), ConversionError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = cmd
        .output()
        .map_err(|e| ConversionError::Service(format!("Failed to launch {}: {}", program, e)))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(ConversionError::Service(format!(
        "{} exited with {}: {}",
        program,
        output.status,
        stderr.trim()
    )))
}

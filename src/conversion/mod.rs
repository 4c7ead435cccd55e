// Audio/video to MIDI conversion through external services

pub mod command;

pub use command::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name the uploaded audio buffer is stored under for inference
pub const DEFAULT_AUDIO_NAME: &str = "input.wav";

/// Message returned once a conversion has produced a MIDI file
pub const COMPLETION_MESSAGE: &str = "MIDI conversion completed.";

/// Turns audio files into MIDI files (e.g. Spotify's basic-pitch).
pub trait PitchInference {
    /// Run inference on each audio file and write its outputs into `output_dir`.
    fn predict_and_save(
        &self,
        audio_paths: &[PathBuf],
        output_dir: &Path,
        options: &InferenceOptions,
    ) -> Result<(), ConversionError>;
}

/// Pulls the audio track out of a video file.
pub trait MediaExtraction {
    /// Returns the path of the extracted audio file.
    fn convert_to_audio(&self, video_path: &Path) -> Result<PathBuf, ConversionError>;
}

/// Output switches passed to the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Where the produced MIDI file is kept
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub save_midi: bool,
    #[serde(default)]
    pub sonify: bool,
    #[serde(default)]
    pub save_model_outputs: bool,
    #[serde(default)]
    pub save_notes: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            save_midi: true,
            sonify: false,
            save_model_outputs: false,
            save_notes: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Returned when a conversion finished and its MIDI file is in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSignal {
    pub message: String,
    pub midi_path: PathBuf,
}

impl CompletionSignal {
    fn new(midi_path: PathBuf) -> Self {
        Self {
            message: COMPLETION_MESSAGE.to_string(),
            midi_path,
        }
    }
}

/// Error type for conversion requests
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("{0}")]
    InputMissing(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service error: {0}")]
    Service(String),

    #[error("No MIDI file produced for {0}")]
    NoOutput(String),
}

/// Convert an uploaded audio buffer to MIDI.
///
/// The buffer only lives in a scratch directory for the duration of the call.
pub fn convert(
    audio: &[u8],
    service: &dyn PitchInference,
    options: &InferenceOptions,
) -> Result<CompletionSignal, ConversionError> {
    convert_named(audio, DEFAULT_AUDIO_NAME, service, options)
}

/// Like [`convert`], keeping the upload's file name so the service can pick a
/// decoder from its extension.
pub fn convert_named(
    audio: &[u8],
    file_name: &str,
    service: &dyn PitchInference,
    options: &InferenceOptions,
) -> Result<CompletionSignal, ConversionError> {
    if audio.is_empty() {
        return Err(ConversionError::InputMissing("Audio file is required."));
    }

    let upload_dir = tempfile::Builder::new().prefix("recital-upload").tempdir()?;
    // Only the final component, uploads must not escape the scratch dir
    let file_name = Path::new(file_name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_AUDIO_NAME.into());
    let audio_path = upload_dir.path().join(file_name);
    std::fs::write(&audio_path, audio)?;
    log::debug!("Stored {} byte upload at {}", audio.len(), audio_path.display());

    let midi_path = infer_to_midi(&audio_path, service, options)?;
    log::info!("Converted upload to {}", midi_path.display());

    Ok(CompletionSignal::new(midi_path))
}

/// Extract the audio from a video file, then convert it to MIDI.
pub fn convert_video(
    video_path: &Path,
    extractor: &dyn MediaExtraction,
    service: &dyn PitchInference,
    options: &InferenceOptions,
) -> Result<CompletionSignal, ConversionError> {
    if !video_path.is_file() {
        return Err(ConversionError::InputMissing("Video file is required."));
    }

    let audio_path = extractor.convert_to_audio(video_path)?;
    log::debug!("Extracted audio to {}", audio_path.display());

    let midi_path = infer_to_midi(&audio_path, service, options)?;
    log::info!("Converted {} to {}", video_path.display(), midi_path.display());

    Ok(CompletionSignal::new(midi_path))
}

/// Run inference into a scratch directory, then move the MIDI file into the
/// configured output directory.
fn infer_to_midi(
    audio_path: &Path,
    service: &dyn PitchInference,
    options: &InferenceOptions,
) -> Result<PathBuf, ConversionError> {
    let scratch = tempfile::Builder::new().prefix("recital-infer").tempdir()?;

    service.predict_and_save(&[audio_path.to_path_buf()], scratch.path(), options)?;

    let produced = find_midi_file(scratch.path())?
        .ok_or_else(|| ConversionError::NoOutput(audio_path.display().to_string()))?;

    std::fs::create_dir_all(&options.output_dir)?;
    let file_name = produced
        .file_name()
        .ok_or_else(|| ConversionError::NoOutput(audio_path.display().to_string()))?;
    let destination = options.output_dir.join(file_name);
    // Copy rather than rename, the scratch dir may be on another filesystem
    std::fs::copy(&produced, &destination)?;

    Ok(destination)
}

/// First `.mid`/`.midi` file in `dir`, by name.
fn find_midi_file(dir: &Path) -> Result<Option<PathBuf>, ConversionError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_midi_path(path))
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}

fn is_midi_path(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
            .unwrap_or(false)
}

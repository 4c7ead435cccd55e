// Request handlers: compare and convert with structured error payloads

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::conversion::{self, CompletionSignal, ConversionError};
use crate::similarity::{self, ComparisonError, ComparisonReport, Comparator};

/// Error object returned to callers in place of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl From<ComparisonError> for ErrorPayload {
    fn from(e: ComparisonError) -> Self {
        Self { error: e.to_string() }
    }
}

impl From<ConversionError> for ErrorPayload {
    fn from(e: ConversionError) -> Self {
        Self { error: e.to_string() }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

// ============================================================================
// Comparison Commands
// ============================================================================

/// Compare two uploaded MIDI files.
pub fn compare_midi(
    file1: &[u8],
    file2: &[u8],
    config: &Config,
) -> Result<ComparisonReport, ErrorPayload> {
    warn_on_timing_mismatch("file1", file1);
    warn_on_timing_mismatch("file2", file2);

    let report = Comparator::new(&config.segmentation).compare(file1, file2)?;
    log::info!(
        "Compared performances: distance {} ({}), {} segment(s)",
        report.normalized_manhattan_distance,
        report.manhattan_message,
        report.differences.len()
    );
    Ok(report)
}

/// Compare two MIDI files on disk. A missing file counts as a missing input.
pub fn compare_midi_files(
    path1: &Path,
    path2: &Path,
    config: &Config,
) -> Result<ComparisonReport, ErrorPayload> {
    let file1 = read_input(path1).map_err(ComparisonError::from)?;
    let file2 = read_input(path2).map_err(ComparisonError::from)?;
    compare_midi(&file1, &file2, config)
}

/// Segmentation always assumes 480 tpb at 120 BPM; flag files that say otherwise.
fn warn_on_timing_mismatch(label: &str, data: &[u8]) {
    if data.is_empty() {
        return;
    }
    if let Ok(summary) = similarity::summarize(data) {
        if summary.differs_from_default_timing() {
            log::warn!(
                "{} declares {:?} ticks/beat and tempo {:?}; segments use the fixed 480 ticks/beat at 120 BPM",
                label,
                summary.ticks_per_beat,
                summary.first_tempo
            );
        }
    }
}

// ============================================================================
// Conversion Commands
// ============================================================================

/// Convert an uploaded audio buffer to MIDI with the configured service.
pub fn convert_midi(
    audio: &[u8],
    file_name: Option<&str>,
    config: &Config,
) -> Result<CompletionSignal, ErrorPayload> {
    let signal = conversion::convert_named(
        audio,
        file_name.unwrap_or(conversion::DEFAULT_AUDIO_NAME),
        &config.basic_pitch,
        &config.inference,
    )?;
    Ok(signal)
}

/// Convert an audio file on disk to MIDI.
pub fn convert_audio_file(path: &Path, config: &Config) -> Result<CompletionSignal, ErrorPayload> {
    let audio = read_input(path).map_err(ConversionError::from)?;
    let file_name = path.file_name().and_then(|n| n.to_str());
    convert_midi(&audio, file_name, config)
}

/// Convert a video file on disk to MIDI via its audio track.
pub fn convert_video_file(path: &Path, config: &Config) -> Result<CompletionSignal, ErrorPayload> {
    let signal =
        conversion::convert_video(path, &config.ffmpeg, &config.basic_pitch, &config.inference)?;
    Ok(signal)
}

fn read_input(path: &Path) -> std::io::Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Input not found: {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
